//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Configuration is read, never written, during a tick
//! - No rendering or platform dependencies

pub mod collision;
pub mod combo;
pub mod fire;
pub mod progression;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod tick;

pub use collision::{PaddleHit, SpeedDecay, ball_hits_paddle, resolve_paddle_collision, resolve_wall_collision};
pub use combo::ComboState;
pub use fire::{FireLevel, FireState};
pub use progression::{RallyState, SpeedScaling};
pub use snapshot::Snapshot;
pub use state::{
    Ball, Court, GameEvent, GamePhase, GameRng, HUMAN_SIDE, OPPONENT_SIDE, Paddle, Side,
    SimulationState,
};
pub use stats::MatchStats;
pub use tick::{PaddleInput, TickInput, tick};
