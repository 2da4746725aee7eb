//! Match configuration
//!
//! An immutable snapshot handed to the tick driver. Values outside their
//! ranges are clamped by [`MatchConfig::sanitized`], never rejected.

use serde::{Deserialize, Serialize};

use crate::ai::Tier;

pub const MIN_BALL_SPEED_SETTING: u32 = 5;
pub const MAX_BALL_SPEED_SETTING: u32 = 100;
/// Serve speed range (units per tick at the reference court) the ball-speed
/// setting maps onto
const BASE_SPEED_RANGE: (f32, f32) = (4.0, 10.0);
const MIN_SPEED_FACTOR: f32 = 0.75;
const MAX_SPEED_FACTOR: f32 = 2.5;
pub const DEFAULT_WINNING_SCORE: u32 = 11;
const MAX_WINNING_SCORE: u32 = 99;

/// Human paddle speed levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaddleSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl PaddleSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaddleSpeed::Slow => "Slow",
            PaddleSpeed::Normal => "Normal",
            PaddleSpeed::Fast => "Fast",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "slow" => Some(PaddleSpeed::Slow),
            "normal" | "med" => Some(PaddleSpeed::Normal),
            "fast" => Some(PaddleSpeed::Fast),
            _ => None,
        }
    }

    /// Level for a configuration index; out-of-range values clamp to Fast
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => PaddleSpeed::Slow,
            1 => PaddleSpeed::Normal,
            _ => PaddleSpeed::Fast,
        }
    }

    /// Paddle travel per tick at the reference court size
    pub fn units_per_tick(&self) -> f32 {
        match self {
            PaddleSpeed::Slow => 5.0,
            PaddleSpeed::Normal => 7.0,
            PaddleSpeed::Fast => 9.0,
        }
    }
}

/// Match configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub paddle_speed: PaddleSpeed,
    /// Opponent tier index, 0 (Easy) to 4 (Impossible)
    pub ai_difficulty: u8,
    /// Ball speed setting, 5 to 100
    pub ball_speed: u32,
    /// Points needed to win
    pub winning_score: u32,
    /// Right paddle driven by the computer
    pub single_player: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            paddle_speed: PaddleSpeed::Normal,
            ai_difficulty: Tier::Normal.index(),
            ball_speed: 50,
            winning_score: DEFAULT_WINNING_SCORE,
            single_player: true,
        }
    }
}

impl MatchConfig {
    /// Copy with every field clamped into range
    pub fn sanitized(&self) -> Self {
        let clean = Self {
            paddle_speed: self.paddle_speed,
            ai_difficulty: self.ai_difficulty.min(Tier::Impossible.index()),
            ball_speed: self.ball_speed.clamp(MIN_BALL_SPEED_SETTING, MAX_BALL_SPEED_SETTING),
            winning_score: self.winning_score.clamp(1, MAX_WINNING_SCORE),
            single_player: self.single_player,
        };
        if clean != *self {
            log::warn!("Match config out of range, clamped: {:?} -> {:?}", self, clean);
        }
        clean
    }

    pub fn tier(&self) -> Tier {
        Tier::from_index(self.ai_difficulty)
    }

    /// Human paddle travel per tick at the reference court size
    pub fn paddle_speed_per_tick(&self) -> f32 {
        self.paddle_speed.units_per_tick()
    }

    /// Serve speed at the reference court size
    pub fn base_ball_speed(&self) -> f32 {
        let setting = self.ball_speed.clamp(MIN_BALL_SPEED_SETTING, MAX_BALL_SPEED_SETTING);
        let t = (setting - MIN_BALL_SPEED_SETTING) as f32
            / (MAX_BALL_SPEED_SETTING - MIN_BALL_SPEED_SETTING) as f32;
        crate::lerp(BASE_SPEED_RANGE.0, BASE_SPEED_RANGE.1, t)
    }

    pub fn min_ball_speed(&self) -> f32 {
        self.base_ball_speed() * MIN_SPEED_FACTOR
    }

    pub fn max_ball_speed(&self) -> f32 {
        self.base_ball_speed() * MAX_SPEED_FACTOR
    }

    pub fn winning_score(&self) -> u32 {
        self.winning_score.max(1)
    }
}
