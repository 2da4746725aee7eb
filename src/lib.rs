//! Fire Pong - a two-paddle arcade duel
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball, paddles, fire bonus, combos, scoring)
//! - `ai`: Computer opponent with five difficulty tiers
//! - `settings`: Match configuration snapshot
//! - `history`: Finished-match records consumed by the adaptive tier
//! - `runner`: Fixed-timestep logic thread publishing per-tick snapshots

pub mod ai;
pub mod history;
pub mod runner;
pub mod settings;
pub mod sim;

pub use ai::{OpponentController, Tier};
pub use history::{MatchHistory, MatchRecord};
pub use runner::LogicThread;
pub use settings::{MatchConfig, PaddleSpeed};
pub use sim::{SimulationState, Snapshot, TickInput, tick};

/// Game configuration constants
pub mod consts {
    /// Logic ticks per second
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;

    /// Reference court size; all per-tick speeds are expressed at this scale
    pub const BASE_COURT_WIDTH: f32 = 800.0;
    pub const BASE_COURT_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 15.0;
    pub const PADDLE_HEIGHT: f32 = 90.0;
    /// Gap between the court edge and the paddle's outer side
    pub const PADDLE_MARGIN: f32 = 30.0;

    /// Ball side length (the ball is a square)
    pub const BALL_SIZE: f32 = 12.0;
    /// Maximum deflection from a paddle edge hit (30 degrees)
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::PI / 6.0;

    /// Ticks the ball rests at centre before a serve
    pub const SERVE_DELAY_TICKS: u32 = TICK_RATE;
    /// Serves aimed at the human side at the start of a single-player match
    pub const SERVE_BIAS_POINTS: u32 = 3;

    /// Finished rallies kept for statistics
    pub const RALLY_HISTORY_LEN: usize = 15;
    /// Rolling window for per-hit statistics (speeds, offsets, reactions)
    pub const STAT_WINDOW: usize = 30;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Convert a tick count to seconds of simulated time
#[inline]
pub fn ticks_to_secs(ticks: u64) -> f32 {
    ticks as f32 * consts::SIM_DT
}
