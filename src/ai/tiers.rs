//! Difficulty tiers and the constants that parameterize them

use serde::{Deserialize, Serialize};

use crate::lerp;

/// Opponent difficulty, chosen by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Tier {
    Easy,
    /// Self-tuning from match history
    #[default]
    Normal,
    Hard,
    Expert,
    Impossible,
}

impl Tier {
    pub const ALL: [Tier; 5] = [Tier::Easy, Tier::Normal, Tier::Hard, Tier::Expert, Tier::Impossible];

    /// Tier for a configuration index; out-of-range values clamp to the nearest tier
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Tier::Easy,
            1 => Tier::Normal,
            2 => Tier::Hard,
            3 => Tier::Expert,
            _ => Tier::Impossible,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Easy => "Easy",
            Tier::Normal => "Normal",
            Tier::Hard => "Hard",
            Tier::Expert => "Expert",
            Tier::Impossible => "Impossible",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Tier::Easy),
            "normal" | "adaptive" => Some(Tier::Normal),
            "hard" => Some(Tier::Hard),
            "expert" => Some(Tier::Expert),
            "impossible" => Some(Tier::Impossible),
            _ => None,
        }
    }

    /// Ball speed multiplier applied to every return in single-player mode
    pub fn speed_factor(&self) -> f32 {
        match self {
            Tier::Easy => 0.8,
            Tier::Normal => 1.0,
            Tier::Hard => 1.1,
            Tier::Expert => 1.18,
            Tier::Impossible => 1.25,
        }
    }

    /// Whether the tier recomputes its own profile every tick
    #[inline]
    pub fn is_adaptive(&self) -> bool {
        *self == Tier::Normal
    }

    /// The top tier never fails on purpose
    #[inline]
    pub fn is_top(&self) -> bool {
        *self == Tier::Impossible
    }
}

/// Behaviour constants for one tier.
///
/// Probabilities are per tick unless noted; distances are in paddle heights or
/// court widths so they survive a court resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierProfile {
    /// Fraction of the court width, from the far side, the ball must cross
    /// before tracking starts
    pub reaction_zone: f32,
    /// Ticks between tracking start and the first move
    pub reaction_delay_ticks: f32,
    /// Wall bounces simulated when predicting the intercept
    pub prediction_bounces: u32,
    /// Aim noise in paddle heights for a ball a full court width away
    pub error_scale: f32,
    /// Ticks between re-plans of the intercept
    pub replan_interval: u32,
    /// Share of the velocity gap closed per tick when speeding up
    pub acceleration: f32,
    /// Share of the velocity gap closed per tick when slowing down
    pub deceleration: f32,
    /// Top speed relative to the human paddle speed
    pub max_speed_fraction: f32,
    pub hesitation_chance: f32,
    /// Chance per re-plan to aim past the intercept
    pub overcorrection_chance: f32,
    /// Chance per approach to deliberately misplay a long reach
    pub strategic_fail_chance: f32,
}

impl TierProfile {
    pub const EASY: TierProfile = TierProfile {
        reaction_zone: 0.7,
        reaction_delay_ticks: 14.0,
        prediction_bounces: 1,
        error_scale: 1.2,
        replan_interval: 20,
        acceleration: 0.06,
        deceleration: 0.10,
        max_speed_fraction: 0.55,
        hesitation_chance: 0.02,
        overcorrection_chance: 0.25,
        strategic_fail_chance: 0.3,
    };

    /// NORMAL at adaptive difficulty 0
    pub const NORMAL_LENIENT: TierProfile = TierProfile {
        reaction_zone: 0.55,
        reaction_delay_ticks: 12.0,
        prediction_bounces: 1,
        error_scale: 0.8,
        replan_interval: 14,
        acceleration: 0.09,
        deceleration: 0.14,
        max_speed_fraction: 0.7,
        hesitation_chance: 0.012,
        overcorrection_chance: 0.15,
        strategic_fail_chance: 0.18,
    };

    /// NORMAL at adaptive difficulty 1
    pub const NORMAL_STRONG: TierProfile = TierProfile {
        reaction_zone: 0.25,
        reaction_delay_ticks: 5.0,
        prediction_bounces: 2,
        error_scale: 0.3,
        replan_interval: 6,
        acceleration: 0.16,
        deceleration: 0.22,
        max_speed_fraction: 0.95,
        hesitation_chance: 0.004,
        overcorrection_chance: 0.05,
        strategic_fail_chance: 0.06,
    };

    pub const HARD: TierProfile = TierProfile {
        reaction_zone: 0.3,
        reaction_delay_ticks: 6.0,
        prediction_bounces: 3,
        error_scale: 0.25,
        replan_interval: 6,
        acceleration: 0.18,
        deceleration: 0.25,
        max_speed_fraction: 0.95,
        hesitation_chance: 0.004,
        overcorrection_chance: 0.04,
        strategic_fail_chance: 0.08,
    };

    pub const EXPERT: TierProfile = TierProfile {
        reaction_zone: 0.15,
        reaction_delay_ticks: 3.0,
        prediction_bounces: 4,
        error_scale: 0.1,
        replan_interval: 3,
        acceleration: 0.28,
        deceleration: 0.35,
        max_speed_fraction: 1.1,
        hesitation_chance: 0.001,
        overcorrection_chance: 0.02,
        strategic_fail_chance: 0.03,
    };

    pub const IMPOSSIBLE: TierProfile = TierProfile {
        reaction_zone: 0.0,
        reaction_delay_ticks: 0.0,
        prediction_bounces: 8,
        error_scale: 0.0,
        replan_interval: 1,
        acceleration: 0.5,
        deceleration: 0.6,
        max_speed_fraction: 1.4,
        hesitation_chance: 0.0,
        overcorrection_chance: 0.0,
        strategic_fail_chance: 0.0,
    };

    /// Interpolate field by field; `t` is clamped to [0, 1]
    pub fn blend(a: &Self, b: &Self, t: f32) -> Self {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
        Self {
            reaction_zone: lerp(a.reaction_zone, b.reaction_zone, t),
            reaction_delay_ticks: lerp(a.reaction_delay_ticks, b.reaction_delay_ticks, t),
            prediction_bounces: lerp(a.prediction_bounces as f32, b.prediction_bounces as f32, t).round() as u32,
            error_scale: lerp(a.error_scale, b.error_scale, t),
            replan_interval: lerp(a.replan_interval as f32, b.replan_interval as f32, t).round().max(1.0) as u32,
            acceleration: lerp(a.acceleration, b.acceleration, t),
            deceleration: lerp(a.deceleration, b.deceleration, t),
            max_speed_fraction: lerp(a.max_speed_fraction, b.max_speed_fraction, t),
            hesitation_chance: lerp(a.hesitation_chance, b.hesitation_chance, t),
            overcorrection_chance: lerp(a.overcorrection_chance, b.overcorrection_chance, t),
            strategic_fail_chance: lerp(a.strategic_fail_chance, b.strategic_fail_chance, t),
        }
    }

    /// Early-rally guarantee: wide reaction window, low error and few mistakes
    pub fn with_guarantee_floor(self) -> Self {
        Self {
            reaction_zone: self.reaction_zone.min(0.3),
            reaction_delay_ticks: self.reaction_delay_ticks.min(6.0),
            prediction_bounces: self.prediction_bounces.max(2),
            error_scale: self.error_scale.min(0.3),
            acceleration: self.acceleration.max(0.14),
            deceleration: self.deceleration.max(0.2),
            max_speed_fraction: self.max_speed_fraction.max(0.9),
            hesitation_chance: self.hesitation_chance.min(0.003),
            overcorrection_chance: self.overcorrection_chance.min(0.04),
            strategic_fail_chance: self.strategic_fail_chance.min(0.02),
            ..self
        }
    }
}
