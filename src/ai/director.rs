//! Adaptive difficulty for the NORMAL tier
//!
//! Each tick the match is scored on a set of named factors. Every factor maps
//! to [-1, 1], where positive means the human is doing well and the opponent
//! should push harder. The weighted sum is centred on 0.5 and clamped to
//! [0, 1].

use serde::{Deserialize, Serialize};

use crate::history::MatchHistory;
use crate::sim::progression::RallyState;
use crate::sim::state::{HUMAN_SIDE, OPPONENT_SIDE};
use crate::sim::stats::MatchStats;

/// Opponent streak at which anti-frustration kicks in
pub const ANTI_FRUSTRATION_STREAK: u32 = 3;
/// Reaction time (ticks) treated as average
const NEUTRAL_REACTION_TICKS: f32 = 25.0;
/// Reaction time spread mapped onto the full factor range
const REACTION_SPAN_TICKS: f32 = 15.0;
/// Points played before the current match's win rate is trusted
const MIN_POINTS_FOR_RATE: u32 = 3;

/// Tagged inputs of the difficulty score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Factor {
    GameProgress,
    PlayerDominance,
    StreakMomentum,
    RallyIntensity,
    ScoreDominance,
    ShotConsistency,
    ReactionSpeed,
    Engagement,
    SpeedMastery,
}

impl Factor {
    pub const ALL: [Factor; 9] = [
        Factor::GameProgress,
        Factor::PlayerDominance,
        Factor::StreakMomentum,
        Factor::RallyIntensity,
        Factor::ScoreDominance,
        Factor::ShotConsistency,
        Factor::ReactionSpeed,
        Factor::Engagement,
        Factor::SpeedMastery,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Everything the director looks at, gathered once per tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DirectorInputs {
    pub winning_score: u32,
    pub player_score: u32,
    pub opponent_score: u32,
    pub player_streak: u32,
    pub opponent_streak: u32,
    pub match_win_rate: Option<f32>,
    pub history_win_rate: Option<f32>,
    pub current_rally_hits: u32,
    pub average_rally_hits: Option<f32>,
    pub shot_consistency: Option<f32>,
    pub reaction_ticks: Option<f32>,
    pub engagement: f32,
    pub speed_mastery: Option<f32>,
}

impl DirectorInputs {
    pub fn gather(
        stats: &MatchStats,
        rally: &RallyState,
        history: &MatchHistory,
        winning_score: u32,
        max_ball_speed: f32,
    ) -> Self {
        let match_win_rate = if stats.points_played >= MIN_POINTS_FOR_RATE {
            stats.player_win_rate()
        } else {
            None
        };
        Self {
            winning_score,
            player_score: stats.score(HUMAN_SIDE),
            opponent_score: stats.score(OPPONENT_SIDE),
            player_streak: stats.streak(HUMAN_SIDE),
            opponent_streak: stats.streak(OPPONENT_SIDE),
            match_win_rate,
            history_win_rate: history.player_win_rate(),
            current_rally_hits: rally.hits,
            average_rally_hits: rally.average_hits(),
            shot_consistency: stats.shot_consistency(),
            reaction_ticks: stats.average_reaction_ticks(),
            engagement: stats.engagement,
            speed_mastery: stats.speed_mastery(max_ball_speed),
        }
    }
}

/// Per-factor weights. Tunable; the defaults keep the shape of the fairness
/// curve: escalation with dominance, relief while the opponent is on a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectorWeights(pub [f32; 9]);

impl Default for DirectorWeights {
    fn default() -> Self {
        let mut w = [0.0; 9];
        w[Factor::GameProgress.index()] = 0.10;
        w[Factor::PlayerDominance.index()] = 0.18;
        w[Factor::StreakMomentum.index()] = 0.12;
        w[Factor::RallyIntensity.index()] = 0.08;
        w[Factor::ScoreDominance.index()] = 0.14;
        w[Factor::ShotConsistency.index()] = 0.08;
        w[Factor::ReactionSpeed.index()] = 0.10;
        w[Factor::Engagement.index()] = 0.05;
        w[Factor::SpeedMastery.index()] = 0.10;
        Self(w)
    }
}

impl DirectorWeights {
    #[inline]
    pub fn get(&self, factor: Factor) -> f32 {
        self.0[factor.index()]
    }
}

/// Factor values in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FactorScores(pub [f32; 9]);

impl FactorScores {
    #[inline]
    pub fn get(&self, factor: Factor) -> f32 {
        self.0[factor.index()]
    }
}

/// Clamp into [-1, 1]; anything non-finite is neutral
#[inline]
fn bipolar(value: f32) -> f32 {
    if value.is_finite() { value.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Map a [0, 1] quantity onto [-1, 1]
#[inline]
fn centred(unit: f32) -> f32 {
    bipolar(unit * 2.0 - 1.0)
}

pub fn score_factor(factor: Factor, inputs: &DirectorInputs) -> f32 {
    let target = inputs.winning_score.max(1) as f32;
    match factor {
        Factor::GameProgress => {
            let leader = inputs.player_score.max(inputs.opponent_score) as f32;
            centred(leader / target)
        }
        Factor::PlayerDominance => {
            let rate = match (inputs.match_win_rate, inputs.history_win_rate) {
                (Some(m), Some(h)) => 0.6 * m + 0.4 * h,
                (Some(m), None) => m,
                (None, Some(h)) => h,
                (None, None) => 0.5,
            };
            centred(rate)
        }
        Factor::StreakMomentum => {
            let push = inputs.player_streak.min(5) as f32 / 5.0;
            let relief = if inputs.opponent_streak >= ANTI_FRUSTRATION_STREAK {
                inputs.opponent_streak.min(6) as f32 / 6.0
            } else {
                0.0
            };
            bipolar(push - relief)
        }
        Factor::RallyIntensity => match inputs.average_rally_hits {
            Some(avg) if avg > 0.0 => bipolar(inputs.current_rally_hits as f32 / avg - 1.0),
            _ => 0.0,
        },
        Factor::ScoreDominance => {
            bipolar((inputs.player_score as f32 - inputs.opponent_score as f32) / target)
        }
        Factor::ShotConsistency => inputs.shot_consistency.map_or(0.0, centred),
        Factor::ReactionSpeed => inputs
            .reaction_ticks
            .map_or(0.0, |r| bipolar((NEUTRAL_REACTION_TICKS - r) / REACTION_SPAN_TICKS)),
        Factor::Engagement => centred(inputs.engagement),
        Factor::SpeedMastery => inputs.speed_mastery.map_or(0.0, centred),
    }
}

pub fn score_factors(inputs: &DirectorInputs) -> FactorScores {
    let mut scores = FactorScores::default();
    for factor in Factor::ALL {
        scores.0[factor.index()] = score_factor(factor, inputs);
    }
    scores
}

/// The adaptive difficulty scalar, always in [0, 1]
pub fn adaptive_difficulty(inputs: &DirectorInputs, weights: &DirectorWeights) -> f32 {
    let scores = score_factors(inputs);
    let blend: f32 = Factor::ALL
        .iter()
        .map(|&f| {
            let w = weights.get(f);
            if w.is_finite() { w * scores.get(f) } else { 0.0 }
        })
        .sum();
    let value = 0.5 + blend;
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.5 }
}
