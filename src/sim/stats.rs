//! Match statistics: scores, streaks and the rolling samples the adaptive
//! opponent reads

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::state::{HUMAN_SIDE, Side};
use crate::consts::STAT_WINDOW;

/// Weight of the newest tick in the engagement moving average
const ENGAGEMENT_ALPHA: f32 = 0.01;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    /// Indexed by `Side::index`
    pub scores: [u32; 2],
    /// Consecutive points won, per side
    pub streaks: [u32; 2],
    /// Rallies won per side (a double-point rally counts once)
    pub points_won: [u32; 2],
    pub points_played: u32,
    pub last_point_winner: Option<Side>,
    /// Consecutive points conceded by the human side
    pub consecutive_misses: u32,
    /// Ball speed after each return
    pub speed_history: VecDeque<f32>,
    /// Impact offsets of the human side's returns
    pub player_offsets: VecDeque<f32>,
    /// Ticks between the opponent's return and the human's first paddle move
    pub reaction_samples: VecDeque<u32>,
    /// Moving average of human input activity, 0..1
    pub engagement: f32,
    pub player_returns: u32,
    pub awaiting_reaction_since: Option<u64>,
}

fn push_bounded<T>(queue: &mut VecDeque<T>, value: T) {
    if queue.len() == STAT_WINDOW {
        queue.pop_front();
    }
    queue.push_back(value);
}

impl MatchStats {
    #[inline]
    pub fn score(&self, side: Side) -> u32 {
        self.scores[side.index()]
    }

    #[inline]
    pub fn streak(&self, side: Side) -> u32 {
        self.streaks[side.index()]
    }

    pub fn record_point(&mut self, scorer: Side, points: u32) {
        let i = scorer.index();
        self.scores[i] += points;
        self.points_won[i] += 1;
        self.points_played += 1;
        self.streaks[i] += 1;
        self.streaks[scorer.opponent().index()] = 0;
        self.last_point_winner = Some(scorer);
        if scorer == HUMAN_SIDE {
            self.consecutive_misses = 0;
        } else {
            self.consecutive_misses += 1;
        }
        self.awaiting_reaction_since = None;
    }

    pub fn record_return(&mut self, side: Side, speed: f32, impact_offset: f32, tick: u64) {
        push_bounded(&mut self.speed_history, speed);
        if side == HUMAN_SIDE {
            push_bounded(&mut self.player_offsets, impact_offset);
            self.player_returns += 1;
            self.awaiting_reaction_since = None;
        } else {
            self.awaiting_reaction_since = Some(tick);
        }
    }

    /// Feed one tick of human paddle activity
    pub fn observe_player(&mut self, tick: u64, input_active: bool, paddle_moved: bool) {
        let sample = if input_active { 1.0 } else { 0.0 };
        self.engagement += (sample - self.engagement) * ENGAGEMENT_ALPHA;

        if paddle_moved {
            if let Some(since) = self.awaiting_reaction_since.take() {
                let ticks = tick.saturating_sub(since).min(u64::from(u32::MAX)) as u32;
                push_bounded(&mut self.reaction_samples, ticks);
            }
        }
    }

    /// Share of rallies the human side has won this match
    pub fn player_win_rate(&self) -> Option<f32> {
        if self.points_played == 0 {
            return None;
        }
        Some(self.points_won[HUMAN_SIDE.index()] as f32 / self.points_played as f32)
    }

    /// 1.0 for returns that all strike the same spot, falling toward 0 as
    /// impact offsets scatter
    pub fn shot_consistency(&self) -> Option<f32> {
        if self.player_offsets.len() < 3 {
            return None;
        }
        let n = self.player_offsets.len() as f32;
        let mean = self.player_offsets.iter().sum::<f32>() / n;
        let variance = self.player_offsets.iter().map(|o| (o - mean).powi(2)).sum::<f32>() / n;
        Some(1.0 - (variance.sqrt() / 0.6).min(1.0))
    }

    pub fn average_reaction_ticks(&self) -> Option<f32> {
        if self.reaction_samples.is_empty() {
            return None;
        }
        let total: u32 = self.reaction_samples.iter().sum();
        Some(total as f32 / self.reaction_samples.len() as f32)
    }

    /// Mean return speed as a fraction of `max_speed`
    pub fn speed_mastery(&self, max_speed: f32) -> Option<f32> {
        if self.speed_history.is_empty() || max_speed <= 0.0 {
            return None;
        }
        let mean = self.speed_history.iter().sum::<f32>() / self.speed_history.len() as f32;
        Some((mean / max_speed).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_and_streaks() {
        let mut stats = MatchStats::default();
        stats.record_point(Side::Right, 1);
        stats.record_point(Side::Right, 2);
        assert_eq!(stats.score(Side::Right), 3);
        assert_eq!(stats.streak(Side::Right), 2);
        assert_eq!(stats.consecutive_misses, 2);
        assert_eq!(stats.points_played, 2);

        stats.record_point(Side::Left, 1);
        assert_eq!(stats.streak(Side::Right), 0);
        assert_eq!(stats.streak(Side::Left), 1);
        assert_eq!(stats.consecutive_misses, 0);
        assert_eq!(stats.last_point_winner, Some(Side::Left));
        assert!((stats.player_win_rate().unwrap() - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_reaction_sample_after_opponent_return() {
        let mut stats = MatchStats::default();
        stats.record_return(Side::Right, 6.0, 0.0, 100);
        stats.observe_player(105, true, false);
        stats.observe_player(112, true, true);
        stats.observe_player(113, true, true);
        assert_eq!(stats.reaction_samples, VecDeque::from(vec![12]));
        assert_eq!(stats.average_reaction_ticks(), Some(12.0));
    }

    #[test]
    fn test_consistency() {
        let mut stats = MatchStats::default();
        assert_eq!(stats.shot_consistency(), None);
        for _ in 0..5 {
            stats.record_return(Side::Left, 6.0, 0.2, 0);
        }
        assert!((stats.shot_consistency().unwrap() - 1.0).abs() < 1e-5);

        for offset in [-1.0, 1.0, -1.0, 1.0] {
            stats.record_return(Side::Left, 6.0, offset, 0);
        }
        assert!(stats.shot_consistency().unwrap() < 0.5);
    }

    #[test]
    fn test_windows_are_bounded() {
        let mut stats = MatchStats::default();
        for i in 0..(STAT_WINDOW * 2) {
            stats.record_return(Side::Left, i as f32, 0.0, 0);
        }
        assert_eq!(stats.speed_history.len(), STAT_WINDOW);
        assert_eq!(stats.player_offsets.len(), STAT_WINDOW);
        assert_eq!(stats.player_returns, (STAT_WINDOW * 2) as u32);
    }

    #[test]
    fn test_engagement_tracks_activity() {
        let mut stats = MatchStats::default();
        for t in 0..600 {
            stats.observe_player(t, true, true);
        }
        assert!(stats.engagement > 0.99);
        for t in 600..1200 {
            stats.observe_player(t, false, false);
        }
        assert!(stats.engagement < 0.01);
    }
}
