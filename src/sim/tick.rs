//! Fixed timestep simulation tick
//!
//! Core game loop that advances the match deterministically.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{ball_hits_paddle, resolve_paddle_collision, resolve_wall_collision};
use super::progression::SpeedScaling;
use super::state::{GameEvent, GamePhase, HUMAN_SIDE, OPPONENT_SIDE, Side, SimulationState};
use crate::ai::{DirectorInputs, adaptive_difficulty};
use crate::consts::SIM_DT;
use crate::history::MatchRecord;
use crate::settings::MatchConfig;
use crate::ticks_to_secs;

/// Key state for one paddle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddleInput {
    pub up: bool,
    pub down: bool,
}

impl PaddleInput {
    /// -1 up, +1 down, 0 for none or both
    #[inline]
    pub fn axis(&self) -> f32 {
        (self.down as i8 - self.up as i8) as f32
    }

    #[inline]
    pub fn active(&self) -> bool {
        self.up || self.down
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: PaddleInput,
    /// Ignored while the computer drives the right paddle
    pub right: PaddleInput,
    /// Pause toggle
    pub pause: bool,
    /// Start a fresh match
    pub restart: bool,
    /// Idle/demo mode - the autopilot plays the left paddle
    pub idle_mode: bool,
    /// Current court dimensions; a change rescales the match
    pub court_size: Option<Vec2>,
}

/// Advance the match by one fixed timestep
pub fn tick(state: &mut SimulationState, config: &MatchConfig, input: &TickInput) {
    state.events.clear();

    if let Some(size) = input.court_size {
        if size != Vec2::new(state.court.width, state.court.height) {
            state.resize(size.x, size.y);
        }
    }

    if input.restart {
        state.restart(config);
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing | GamePhase::Serve => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                // A resting ball means we paused during the serve delay
                state.phase = if state.ball.vel == Vec2::ZERO {
                    GamePhase::Serve
                } else {
                    GamePhase::Playing
                };
                state.events.push(GameEvent::Resumed);
            }
            GamePhase::MatchOver => {}
        }
    }

    // Don't tick if paused or the match is decided
    match state.phase {
        GamePhase::Paused | GamePhase::MatchOver => return,
        _ => {}
    }

    state.tick += 1;
    sync_config(state, config);
    move_paddles(state, config, input);
    update_director(state, config);

    for combo in &mut state.combos {
        combo.tick();
    }
    state.fire.update(SIM_DT);

    match state.phase {
        GamePhase::Serve => {
            state.serve_ticks = state.serve_ticks.saturating_sub(1);
            if state.serve_ticks == 0 {
                let speed = config.base_ball_speed() * state.court.scale();
                state.launch_ball(speed);
                state.rally.restart_clock(state.tick);
            }
        }
        GamePhase::Playing => step_ball(state, config),
        GamePhase::Paused | GamePhase::MatchOver => {}
    }
}

/// Speed bounds and opponent tier follow the live configuration
fn sync_config(state: &mut SimulationState, config: &MatchConfig) {
    let scale = state.court.scale();
    let min_speed = config.min_ball_speed() * scale;
    let max_speed = config.max_ball_speed() * scale;
    if min_speed != state.ball.min_speed || max_speed != state.ball.max_speed {
        state.ball.min_speed = min_speed;
        state.ball.max_speed = max_speed;
        if state.ball.vel != Vec2::ZERO {
            state.ball.clamp_speed(state.fire.unlimited_speed);
        }
    }
    state.opponent.set_tier(config.tier());
}

fn move_paddles(state: &mut SimulationState, config: &MatchConfig, input: &TickInput) {
    for paddle in &mut state.paddles {
        paddle.begin_tick();
    }

    let playing = state.phase == GamePhase::Playing;
    let human_speed = config.paddle_speed_per_tick();
    let step = human_speed * state.court.scale();

    // Left paddle: the human, or the autopilot in demo mode
    let left = HUMAN_SIDE.index();
    if input.idle_mode {
        state.autopilot_played = true;
        if playing {
            state.autopilot.update(
                &mut state.paddles[left],
                &state.ball,
                &state.court,
                state.rally.hits,
                human_speed,
                &mut state.rng,
            );
        }
    } else {
        state.paddles[left].move_by(input.left.axis() * step, &state.court);
        let moved = state.paddles[left].velocity() != 0.0;
        state.stats.observe_player(state.tick, input.left.active(), moved);
    }

    // Right paddle: the computer, or a second human
    let right = OPPONENT_SIDE.index();
    if config.single_player || input.idle_mode {
        if playing {
            state.opponent.update(
                &mut state.paddles[right],
                &state.ball,
                &state.court,
                state.rally.hits,
                human_speed,
                &mut state.rng,
            );
        }
    } else {
        state.paddles[right].move_by(input.right.axis() * step, &state.court);
    }
}

/// Recompute NORMAL's adaptive difficulty from the match so far
fn update_director(state: &mut SimulationState, config: &MatchConfig) {
    if !state.opponent.tier.is_adaptive() {
        return;
    }
    let inputs = DirectorInputs::gather(
        &state.stats,
        &state.rally,
        &state.history,
        config.winning_score(),
        state.ball.max_speed,
    );
    let value = adaptive_difficulty(&inputs, &state.director_weights);
    state.opponent.set_adaptive_difficulty(value);
}

fn step_ball(state: &mut SimulationState, config: &MatchConfig) {
    let prev_pos = state.ball.pos;
    state.ball.pos += state.ball.vel;

    if resolve_wall_collision(&mut state.ball, &state.court) {
        state.fire.break_streak();
        // Speed gained under unlimited speed must fall back inside the bounds
        state.ball.clamp_speed(state.fire.unlimited_speed);
        state.events.push(GameEvent::WallBounce);
    }

    for side in Side::BOTH {
        if ball_hits_paddle(&state.ball, prev_pos, state.paddle(side)) {
            return_ball(state, config, side);
            break;
        }
    }

    let ball = &state.ball;
    if ball.pos.x + ball.size < 0.0 {
        award_point(state, config, Side::Right);
    } else if ball.pos.x > state.court.width {
        award_point(state, config, Side::Left);
    }
}

fn return_ball(state: &mut SimulationState, config: &MatchConfig, side: Side) {
    let hits = state.rally.register_hit();
    let scaling = SpeedScaling::new(
        config.tier(),
        config.single_player,
        state.rally.duration_secs(state.tick),
        hits,
    );
    let hit = resolve_paddle_collision(
        &mut state.ball,
        &state.paddles[side.index()],
        &state.court,
        &scaling,
        state.fire.unlimited_speed,
    );
    state.events.push(GameEvent::PaddleHit {
        side,
        impact_offset: hit.impact_offset,
        speed: hit.speed,
    });

    let level = state.fire.register_return();
    state.push_fire_event(level);

    if let Some(count) = state.combos[side.index()].register_hit() {
        state.events.push(GameEvent::ComboMilestone { side, count });
    }
    state.stats.record_return(side, hit.speed, hit.impact_offset, state.tick);
}

fn award_point(state: &mut SimulationState, config: &MatchConfig, scorer: Side) {
    let points = state.fire.point_value();
    state.stats.record_point(scorer, points);
    let (secs, hits) = state.rally.finish(state.tick);
    state.fire.reset();
    state.combos[scorer.opponent().index()].reset();
    state.events.push(GameEvent::PointScored { scorer, points });
    log::debug!(
        "Point to {} (+{}) after {} hits in {:.1}s: {}-{}",
        scorer.as_str(),
        points,
        hits,
        secs,
        state.score(Side::Left),
        state.score(Side::Right)
    );

    if state.score(scorer) >= config.winning_score() {
        finish_match(state, config, scorer);
        return;
    }

    let toward = state.next_serve_side(config);
    state.prepare_serve(toward);
}

fn finish_match(state: &mut SimulationState, config: &MatchConfig, winner: Side) {
    state.winner = Some(winner);
    state.phase = GamePhase::MatchOver;
    state.ball.recenter(&state.court);
    state.ball.vel = Vec2::ZERO;
    state.events.push(GameEvent::MatchComplete { winner });

    // Demo matches are not the human's results
    if config.single_player && !state.autopilot_played {
        state.history.record(MatchRecord {
            player_score: state.score(HUMAN_SIDE),
            opponent_score: state.score(OPPONENT_SIDE),
            player_won: winner == HUMAN_SIDE,
            tier: config.tier(),
            duration_secs: ticks_to_secs(state.tick.saturating_sub(state.match_start_tick)),
            longest_rally: state.rally.longest(),
        });
    }
    log::info!(
        "Match over: {} wins {}-{}",
        winner.as_str(),
        state.score(Side::Left),
        state.score(Side::Right)
    );
}
