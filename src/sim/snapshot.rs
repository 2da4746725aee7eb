//! Immutable per-tick view of the simulation for presentation layers

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combo::ComboState;
use super::fire::FireState;
use super::state::{Court, GameEvent, GamePhase, Side, SimulationState};
use crate::ai::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddleView {
    pub side: Side,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

/// Everything a renderer, HUD or audio layer needs, copied out of a
/// committed tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: GamePhase,
    pub court: Court,
    /// Top-left corner of the ball
    pub ball_pos: Vec2,
    pub ball_vel: Vec2,
    pub ball_size: f32,
    pub paddles: [PaddleView; 2],
    pub scores: [u32; 2],
    pub fire: FireState,
    pub combos: [ComboState; 2],
    pub rally_hits: u32,
    /// Hit counts of recent rallies, oldest first
    pub rally_history: Vec<u32>,
    pub opponent_tier: Tier,
    pub adaptive_difficulty: f32,
    pub winner: Option<Side>,
    pub match_complete: bool,
    pub events: Vec<GameEvent>,
}

impl From<&SimulationState> for Snapshot {
    fn from(state: &SimulationState) -> Self {
        let paddle_view = |side: Side| {
            let p = state.paddle(side);
            PaddleView {
                side,
                pos: Vec2::new(p.x, p.y),
                size: Vec2::new(p.width, p.height),
            }
        };
        Self {
            tick: state.tick,
            phase: state.phase,
            court: state.court,
            ball_pos: state.ball.pos,
            ball_vel: state.ball.vel,
            ball_size: state.ball.size,
            paddles: [paddle_view(Side::Left), paddle_view(Side::Right)],
            scores: state.stats.scores,
            fire: state.fire.clone(),
            combos: state.combos.clone(),
            rally_hits: state.rally.hits,
            rally_history: state.rally.hit_counts.iter().copied().collect(),
            opponent_tier: state.opponent.tier,
            adaptive_difficulty: state.opponent.adaptive_difficulty,
            winner: state.winner,
            match_complete: state.phase == GamePhase::MatchOver,
            events: state.events.clone(),
        }
    }
}

impl Snapshot {
    #[inline]
    pub fn score(&self, side: Side) -> u32 {
        self.scores[side.index()]
    }

    #[inline]
    pub fn combo(&self, side: Side) -> &ComboState {
        &self.combos[side.index()]
    }
}
