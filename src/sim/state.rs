//! Game state and core simulation types
//!
//! All state that must be persisted for determinism lives here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combo::ComboState;
use super::fire::{FireLevel, FireState};
use super::progression::RallyState;
use super::snapshot::Snapshot;
use super::stats::MatchStats;
use crate::ai::{AUTOPILOT_TIER, DirectorWeights, OpponentController};
use crate::consts::*;
use crate::history::MatchHistory;
use crate::settings::MatchConfig;

/// Hard ceiling applied while unlimited speed is active, as a multiple of max speed
pub const UNLIMITED_SPEED_CEILING: f32 = 4.0;

/// Which end of the court a paddle defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// The human always plays the left paddle
pub const HUMAN_SIDE: Side = Side::Left;
/// The computer opponent plays the right paddle in single-player mode
pub const OPPONENT_SIDE: Side = Side::Right;

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Sign of horizontal velocity for a ball travelling toward this side
    #[inline]
    pub fn direction(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball resting at centre, waiting for the serve delay to run out
    Serve,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// A side reached the winning score
    MatchOver,
}

/// Court dimensions in court units (pixels at the reference scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub width: f32,
    pub height: f32,
}

impl Default for Court {
    fn default() -> Self {
        Self {
            width: BASE_COURT_WIDTH,
            height: BASE_COURT_HEIGHT,
        }
    }
}

impl Court {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size multiplier relative to the reference court (height based)
    #[inline]
    pub fn scale(&self) -> f32 {
        self.height / BASE_COURT_HEIGHT
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// The ball. Position is the top-left corner of its bounding square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Court units per tick
    pub vel: Vec2,
    pub size: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl Ball {
    pub fn new(court: &Court, min_speed: f32, max_speed: f32) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: BALL_SIZE * court.scale(),
            min_speed,
            max_speed,
        };
        ball.recenter(court);
        ball
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Place the ball in the middle of the court
    pub fn recenter(&mut self, court: &Court) {
        self.pos = court.center() - Vec2::splat(self.size / 2.0);
    }

    /// Keep speed within [min, max]; with `unlimited` only the floor and the
    /// safety ceiling apply
    pub fn clamp_speed(&mut self, unlimited: bool) {
        let speed = self.vel.length();
        let dir = self.vel.try_normalize().unwrap_or(Vec2::X);
        let ceiling = if unlimited {
            self.max_speed * UNLIMITED_SPEED_CEILING
        } else {
            self.max_speed
        };

        if !speed.is_finite() || speed < self.min_speed {
            self.vel = dir * self.min_speed;
        } else if speed > ceiling {
            self.vel = dir * ceiling;
        }
    }
}

/// A paddle. Position is the top-left corner of its rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Y at the start of the current tick (for momentum transfer)
    pub prev_y: f32,
}

impl Paddle {
    pub fn new(side: Side, court: &Court) -> Self {
        let scale = court.scale();
        let mut paddle = Self {
            side,
            x: 0.0,
            y: 0.0,
            width: PADDLE_WIDTH * scale,
            height: PADDLE_HEIGHT * scale,
            prev_y: 0.0,
        };
        paddle.x = paddle.home_x(court);
        paddle.y = (court.height - paddle.height) / 2.0;
        paddle.prev_y = paddle.y;
        paddle
    }

    /// X the paddle sits at for its side of the court
    pub fn home_x(&self, court: &Court) -> f32 {
        let margin = PADDLE_MARGIN * court.scale();
        match self.side {
            Side::Left => margin,
            Side::Right => court.width - margin - self.width,
        }
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// X of the face that returns the ball
    #[inline]
    pub fn face_x(&self) -> f32 {
        match self.side {
            Side::Left => self.x + self.width,
            Side::Right => self.x,
        }
    }

    /// Displacement since the start of the tick
    #[inline]
    pub fn velocity(&self) -> f32 {
        self.y - self.prev_y
    }

    #[inline]
    pub fn max_y(&self, court: &Court) -> f32 {
        (court.height - self.height).max(0.0)
    }

    pub fn begin_tick(&mut self) {
        self.prev_y = self.y;
    }

    /// Move vertically, clamped to the court. Returns true if the move was clipped.
    pub fn move_by(&mut self, dy: f32, court: &Court) -> bool {
        let wanted = self.y + dy;
        self.y = wanted.clamp(0.0, self.max_y(court));
        self.y != wanted
    }

    pub fn clamp_to(&mut self, court: &Court) {
        self.y = self.y.clamp(0.0, self.max_y(court));
    }
}

/// Events emitted during a tick, for effects, audio and HUD collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PaddleHit {
        side: Side,
        impact_offset: f32,
        speed: f32,
    },
    WallBounce,
    FireLevelReached(FireLevel),
    ComboMilestone {
        side: Side,
        count: u32,
    },
    PointScored {
        scorer: Side,
        points: u32,
    },
    Served {
        toward: Side,
    },
    MatchComplete {
        winner: Side,
    },
    Paused,
    Resumed,
}

/// Serializable RNG position: the seed plus the number of values drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub draws: u64,
}

/// Seeded PCG stream that can be saved and restored mid-match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RngState", into = "RngState")]
pub struct GameRng {
    seed: u64,
    draws: u64,
    rng: Pcg32,
}

impl From<RngState> for GameRng {
    fn from(state: RngState) -> Self {
        let mut rng = Pcg32::seed_from_u64(state.seed);
        rng.advance(state.draws);
        Self {
            seed: state.seed,
            draws: state.draws,
            rng,
        }
    }
}

impl From<GameRng> for RngState {
    fn from(rng: GameRng) -> Self {
        rng.state()
    }
}

impl PartialEq for GameRng {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed && self.draws == other.draws
    }
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        RngState { seed, draws: 0 }.into()
    }

    pub fn state(&self) -> RngState {
        RngState {
            seed: self.seed,
            draws: self.draws,
        }
    }

    /// Uniform in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.draws += 1;
        self.rng.random::<f32>()
    }

    /// Uniform in [-1, 1)
    pub fn signed(&mut self) -> f32 {
        self.next_f32() * 2.0 - 1.0
    }

    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    pub fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }
}

/// Complete simulation state (deterministic, serializable), owned by the tick driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    /// Match seed for reproducibility
    pub seed: u64,
    pub rng: GameRng,
    /// Simulation tick counter
    pub tick: u64,
    /// Tick the current match started on
    pub match_start_tick: u64,
    pub phase: GamePhase,
    /// Ticks left before the resting ball is launched
    pub serve_ticks: u32,
    /// Side the next serve travels toward
    pub serve_toward: Side,
    pub court: Court,
    pub ball: Ball,
    /// Indexed by `Side::index`
    pub paddles: [Paddle; 2],
    pub rally: RallyState,
    pub fire: FireState,
    /// Indexed by `Side::index`
    pub combos: [ComboState; 2],
    pub stats: MatchStats,
    /// Computer opponent on the right paddle
    pub opponent: OpponentController,
    /// Demo-mode driver for the left paddle
    pub autopilot: OpponentController,
    /// Set once the autopilot has driven the left paddle in this match
    #[serde(default)]
    pub autopilot_played: bool,
    /// Factor weights of the adaptive tier
    #[serde(default)]
    pub director_weights: DirectorWeights,
    pub winner: Option<Side>,
    /// Finished matches, fed to the adaptive tier
    pub history: MatchHistory,
    /// Events produced by the most recent tick
    #[serde(default)]
    pub events: Vec<GameEvent>,
}

impl SimulationState {
    /// Create a new match with the given seed
    pub fn new(config: &MatchConfig, seed: u64) -> Self {
        Self::with_history(config, seed, MatchHistory::new())
    }

    /// Create a new match carrying over earlier match records
    pub fn with_history(config: &MatchConfig, seed: u64, history: MatchHistory) -> Self {
        let court = Court::default();
        let scale = court.scale();
        let mut state = Self {
            seed,
            rng: GameRng::new(seed),
            tick: 0,
            match_start_tick: 0,
            phase: GamePhase::Serve,
            serve_ticks: SERVE_DELAY_TICKS,
            serve_toward: Side::Left,
            court,
            ball: Ball::new(
                &court,
                config.min_ball_speed() * scale,
                config.max_ball_speed() * scale,
            ),
            paddles: [Paddle::new(Side::Left, &court), Paddle::new(Side::Right, &court)],
            rally: RallyState::new(0),
            fire: FireState::default(),
            combos: [ComboState::default(), ComboState::default()],
            stats: MatchStats::default(),
            opponent: OpponentController::new(OPPONENT_SIDE, config.tier()),
            autopilot: OpponentController::new(HUMAN_SIDE, AUTOPILOT_TIER),
            autopilot_played: false,
            director_weights: DirectorWeights::default(),
            winner: None,
            history,
            events: Vec::new(),
        };

        let toward = state.next_serve_side(config);
        state.prepare_serve(toward);
        log::info!(
            "Match started: seed {}, tier {}, first to {}",
            seed,
            config.tier().as_str(),
            config.winning_score()
        );
        state
    }

    /// Start a fresh match in place, keeping court, RNG stream and history
    pub fn restart(&mut self, config: &MatchConfig) {
        let court = self.court;
        let scale = court.scale();
        self.match_start_tick = self.tick;
        self.ball = Ball::new(
            &court,
            config.min_ball_speed() * scale,
            config.max_ball_speed() * scale,
        );
        self.paddles = [Paddle::new(Side::Left, &court), Paddle::new(Side::Right, &court)];
        self.rally = RallyState::new(self.tick);
        self.fire = FireState::default();
        self.combos = [ComboState::default(), ComboState::default()];
        self.stats = MatchStats::default();
        self.opponent = OpponentController::new(OPPONENT_SIDE, config.tier());
        self.autopilot = OpponentController::new(HUMAN_SIDE, AUTOPILOT_TIER);
        self.autopilot_played = false;
        self.winner = None;

        let toward = self.next_serve_side(config);
        self.prepare_serve(toward);
        log::info!("Match restarted at tick {}", self.tick);
    }

    #[inline]
    pub fn paddle(&self, side: Side) -> &Paddle {
        &self.paddles[side.index()]
    }

    #[inline]
    pub fn combo(&self, side: Side) -> &ComboState {
        &self.combos[side.index()]
    }

    #[inline]
    pub fn score(&self, side: Side) -> u32 {
        self.stats.score(side)
    }

    /// Direction of the next serve: toward the human for the first few points
    /// of a single-player match, random afterwards
    pub fn next_serve_side(&mut self, config: &MatchConfig) -> Side {
        if config.single_player && self.stats.points_played < SERVE_BIAS_POINTS {
            HUMAN_SIDE
        } else if self.rng.chance(0.5) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Centre the ball and hold it for the serve delay
    pub fn prepare_serve(&mut self, toward: Side) {
        self.ball.recenter(&self.court);
        self.ball.vel = Vec2::ZERO;
        self.opponent.reset_approach();
        self.autopilot.reset_approach();
        self.serve_toward = toward;
        self.serve_ticks = SERVE_DELAY_TICKS;
        self.phase = GamePhase::Serve;
    }

    /// Launch the resting ball at `speed` toward `serve_toward`
    pub fn launch_ball(&mut self, speed: f32) {
        let angle = self.rng.signed() * MAX_BOUNCE_ANGLE * 0.75;
        let dir = self.serve_toward.direction();
        self.ball.vel = Vec2::new(angle.cos() * dir, angle.sin()) * speed;
        self.ball.clamp_speed(false);
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Served {
            toward: self.serve_toward,
        });
    }

    /// Adopt new court dimensions: sizes, speeds and positions scale
    /// proportionally, then everything is re-clamped into the court
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            log::warn!("Ignoring invalid court size {}x{}", width, height);
            return;
        }
        let old = self.court;
        let sx = width / old.width;
        let sy = height / old.height;
        self.court = Court::new(width, height);
        let court = self.court;

        let ball = &mut self.ball;
        ball.pos *= Vec2::new(sx, sy);
        ball.vel *= Vec2::new(sx, sy);
        ball.size *= sy;
        ball.min_speed *= sy;
        ball.max_speed *= sy;
        ball.pos.y = ball.pos.y.clamp(0.0, (court.height - ball.size).max(0.0));
        ball.pos.x = ball.pos.x.clamp(-ball.size, court.width);
        if ball.vel != Vec2::ZERO {
            ball.clamp_speed(self.fire.unlimited_speed);
        }

        for paddle in &mut self.paddles {
            paddle.width *= sy;
            paddle.height *= sy;
            paddle.y *= sy;
            paddle.prev_y *= sy;
            paddle.x = paddle.home_x(&court);
            paddle.clamp_to(&court);
            paddle.prev_y = paddle.prev_y.clamp(0.0, paddle.max_y(&court));
        }
        self.opponent.rescale(sy);
        self.autopilot.rescale(sy);

        log::debug!(
            "Court resized {}x{} -> {}x{}",
            old.width,
            old.height,
            width,
            height
        );
    }

    /// Immutable view of the committed state for presentation
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(self)
    }

    pub(crate) fn push_fire_event(&mut self, level: Option<FireLevel>) {
        if let Some(level) = level {
            self.events.push(GameEvent::FireLevelReached(level));
        }
    }
}
