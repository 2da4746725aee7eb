//! Computer opponent
//!
//! One controller type drives a paddle for any of the five tiers. Tier
//! behaviour comes from a [`Strategy`]: four tiers use fixed constants, NORMAL
//! blends between a lenient and a strong profile using the director's
//! adaptive difficulty.

pub mod director;
pub mod predict;
pub mod tiers;

pub use director::{DirectorInputs, DirectorWeights, Factor, adaptive_difficulty};
pub use predict::{Prediction, predict_intercept};
pub use tiers::{Tier, TierProfile};

use serde::{Deserialize, Serialize};

use crate::sim::state::{Ball, Court, GameRng, Paddle, Side};

/// Tier used for the human paddle in demo (idle) mode
pub const AUTOPILOT_TIER: Tier = Tier::Hard;

/// Rally hits below which NORMAL keeps its guarantee floor
pub const GUARANTEE_RALLY_HITS: u32 = 10;
/// Travel, in paddle heights, past which a reach counts as long
const LONG_REACH_HEIGHTS: f32 = 2.5;
const LONG_REACH_FAIL_MULTIPLIER: f32 = 2.5;
const LONG_REACH_ERROR_MULTIPLIER: f32 = 2.0;
/// Aim offset of a failed approach, in paddle heights (plus one ball size)
const FAIL_OFFSET_HEIGHTS: f32 = 0.75;
/// Overshoot of an overcorrection, in paddle heights
const OVERSHOOT_HEIGHTS: f32 = 0.35;
/// Share of the remaining distance the paddle wants to cover per tick
const TRACKING_GAIN: f32 = 0.25;
/// Distance (reference scale) inside which the paddle stops chasing
const DEAD_ZONE: f32 = 2.0;
const DRIFT_SPEED_FRACTION: f32 = 0.5;
const HESITATION_TICKS: (f32, f32) = (4.0, 12.0);

/// Read-only view of the world handed to a strategy
#[derive(Debug, Clone, Copy)]
pub struct AiContext<'a> {
    pub ball: &'a Ball,
    pub paddle: &'a Paddle,
    pub court: &'a Court,
    pub rally_hits: u32,
    /// Director output, only read by NORMAL
    pub adaptive: f32,
    pub human_paddle_speed: f32,
}

impl AiContext<'_> {
    /// Whether the ball is travelling toward this paddle
    #[inline]
    pub fn ball_incoming(&self) -> bool {
        self.ball.vel.x * self.paddle.side.direction() > 0.0
    }

    /// Share of the court width the ball has covered, measured from the far side
    pub fn ball_progress(&self) -> f32 {
        let x = self.ball.center().x / self.court.width;
        match self.paddle.side {
            Side::Right => x,
            Side::Left => 1.0 - x,
        }
    }

    /// Ball-centre x at which the ball meets this paddle's face
    #[inline]
    pub fn intercept_x(&self) -> f32 {
        self.paddle.face_x() - self.paddle.side.direction() * self.ball.size / 2.0
    }
}

/// Mistake parameters for one approach
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorProfile {
    /// Aim noise in paddle heights for a full court width of travel
    pub scale: f32,
    pub overcorrection_chance: f32,
    pub strategic_fail_chance: f32,
}

/// Tier behaviour. Implementations are stateless; per-approach state lives in
/// [`OpponentController`].
pub trait Strategy: Sync {
    fn tier(&self) -> Tier;

    fn profile(&self, ctx: &AiContext) -> TierProfile;

    /// Intercept the paddle should aim for
    fn predict(&self, ctx: &AiContext, profile: &TierProfile) -> Option<Prediction> {
        predict_intercept(
            ctx.ball.center(),
            ctx.ball.vel,
            ctx.intercept_x(),
            ctx.court.height,
            ctx.ball.size / 2.0,
            profile.prediction_bounces,
        )
    }

    /// Mistakes for an approach needing `reach` paddle heights of travel
    fn error_profile(&self, profile: &TierProfile, reach: f32) -> ErrorProfile {
        let mut errors = ErrorProfile {
            scale: profile.error_scale,
            overcorrection_chance: profile.overcorrection_chance,
            strategic_fail_chance: profile.strategic_fail_chance,
        };
        if reach > LONG_REACH_HEIGHTS && !self.tier().is_top() {
            errors.strategic_fail_chance = (errors.strategic_fail_chance * LONG_REACH_FAIL_MULTIPLIER).min(1.0);
            errors.scale *= LONG_REACH_ERROR_MULTIPLIER;
        }
        errors
    }

    /// Whether the paddle should be tracking the ball at all
    fn react(&self, ctx: &AiContext, profile: &TierProfile) -> bool {
        ctx.ball_incoming() && ctx.ball_progress() >= profile.reaction_zone
    }
}

/// EASY, HARD, EXPERT and IMPOSSIBLE
#[derive(Debug)]
pub struct FixedTier {
    pub tier: Tier,
    pub profile: TierProfile,
}

impl Strategy for FixedTier {
    fn tier(&self) -> Tier {
        self.tier
    }

    fn profile(&self, _ctx: &AiContext) -> TierProfile {
        self.profile
    }
}

/// NORMAL: interpolates between two profiles by the adaptive difficulty
#[derive(Debug)]
pub struct AdaptiveTier {
    pub lenient: TierProfile,
    pub strong: TierProfile,
}

impl Strategy for AdaptiveTier {
    fn tier(&self) -> Tier {
        Tier::Normal
    }

    fn profile(&self, ctx: &AiContext) -> TierProfile {
        let profile = TierProfile::blend(&self.lenient, &self.strong, ctx.adaptive);
        if ctx.rally_hits < GUARANTEE_RALLY_HITS {
            profile.with_guarantee_floor()
        } else {
            profile
        }
    }
}

static EASY: FixedTier = FixedTier {
    tier: Tier::Easy,
    profile: TierProfile::EASY,
};
static NORMAL: AdaptiveTier = AdaptiveTier {
    lenient: TierProfile::NORMAL_LENIENT,
    strong: TierProfile::NORMAL_STRONG,
};
static HARD: FixedTier = FixedTier {
    tier: Tier::Hard,
    profile: TierProfile::HARD,
};
static EXPERT: FixedTier = FixedTier {
    tier: Tier::Expert,
    profile: TierProfile::EXPERT,
};
static IMPOSSIBLE: FixedTier = FixedTier {
    tier: Tier::Impossible,
    profile: TierProfile::IMPOSSIBLE,
};

pub fn strategy_for(tier: Tier) -> &'static dyn Strategy {
    match tier {
        Tier::Easy => &EASY,
        Tier::Normal => &NORMAL,
        Tier::Hard => &HARD,
        Tier::Expert => &EXPERT,
        Tier::Impossible => &IMPOSSIBLE,
    }
}

/// Per-paddle opponent state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentController {
    pub side: Side,
    pub tier: Tier,
    /// Smoothed paddle velocity, court units per tick
    pub velocity: f32,
    /// Ticks waited so far in the current approach
    pub reaction_delay: f32,
    pub hesitation_ticks: u32,
    /// Paddle-centre y being chased
    pub target_y: f32,
    /// True from the moment the ball enters the reaction zone
    pub tracking: bool,
    pub replan_countdown: u32,
    /// Strategic failure decision for the current approach
    pub approach_fails: bool,
    /// Direction (+1 down, -1 up) a failed approach aims off the ball
    pub fail_direction: f32,
    /// Director output for NORMAL, in [0, 1]
    pub adaptive_difficulty: f32,
}

impl OpponentController {
    pub fn new(side: Side, tier: Tier) -> Self {
        Self {
            side,
            tier,
            velocity: 0.0,
            reaction_delay: 0.0,
            hesitation_ticks: 0,
            target_y: 0.0,
            tracking: false,
            replan_countdown: 0,
            approach_fails: false,
            fail_direction: 1.0,
            adaptive_difficulty: 0.5,
        }
    }

    pub fn set_tier(&mut self, tier: Tier) {
        if tier != self.tier {
            log::debug!("{} opponent tier {} -> {}", self.side.as_str(), self.tier.as_str(), tier.as_str());
            self.tier = tier;
            self.end_approach();
        }
    }

    /// Store the director's value; non-finite input keeps the neutral midpoint
    pub fn set_adaptive_difficulty(&mut self, value: f32) {
        self.adaptive_difficulty = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.5 };
    }

    /// Court rescale by the height ratio
    pub fn rescale(&mut self, s: f32) {
        self.velocity *= s;
        self.target_y *= s;
    }

    fn end_approach(&mut self) {
        self.tracking = false;
        self.reaction_delay = 0.0;
        self.replan_countdown = 0;
        self.approach_fails = false;
    }

    /// Forget the current approach and come to rest. Called when the ball is
    /// taken out of play so the next rally starts clean.
    pub fn reset_approach(&mut self) {
        self.end_approach();
        self.velocity = 0.0;
        self.hesitation_ticks = 0;
    }

    /// Drive `paddle` for one tick
    pub fn update(
        &mut self,
        paddle: &mut Paddle,
        ball: &Ball,
        court: &Court,
        rally_hits: u32,
        human_paddle_speed: f32,
        rng: &mut GameRng,
    ) {
        let strategy = strategy_for(self.tier);
        self.drive(strategy, paddle, ball, court, rally_hits, human_paddle_speed, rng);
    }

    #[allow(clippy::too_many_arguments)]
    fn drive(
        &mut self,
        strategy: &dyn Strategy,
        paddle: &mut Paddle,
        ball: &Ball,
        court: &Court,
        rally_hits: u32,
        human_paddle_speed: f32,
        rng: &mut GameRng,
    ) {
        let ctx = AiContext {
            ball,
            paddle: &*paddle,
            court,
            rally_hits,
            adaptive: self.adaptive_difficulty,
            human_paddle_speed,
        };
        let profile = strategy.profile(&ctx);
        let max_speed = profile.max_speed_fraction * human_paddle_speed * court.scale();
        let mut speed_cap = max_speed;

        if self.hesitation_ticks > 0 {
            self.hesitation_ticks -= 1;
            self.velocity -= self.velocity * profile.deceleration;
            self.apply(paddle, court);
            return;
        }

        if !strategy.react(&ctx, &profile) {
            if self.tracking {
                self.end_approach();
            }
            self.target_y = court.height / 2.0;
            speed_cap *= DRIFT_SPEED_FRACTION;
        } else {
            if !self.tracking {
                self.begin_approach(strategy, &ctx, &profile, rng);
            }
            if self.reaction_delay < profile.reaction_delay_ticks {
                self.reaction_delay += 1.0;
                self.velocity -= self.velocity * profile.deceleration;
                self.apply(paddle, court);
                return;
            }
            if self.replan_countdown == 0 {
                self.plan(strategy, &ctx, &profile, rng);
                self.replan_countdown = profile.replan_interval.max(1);
            }
            self.replan_countdown -= 1;

            if rng.chance(profile.hesitation_chance) {
                self.hesitation_ticks = rng.range(HESITATION_TICKS.0, HESITATION_TICKS.1) as u32;
                log::trace!("{} opponent hesitates for {} ticks", self.side.as_str(), self.hesitation_ticks);
            }
        }

        let diff = self.target_y - paddle.center_y();
        let desired = if diff.abs() < DEAD_ZONE * court.scale() {
            0.0
        } else {
            (diff * TRACKING_GAIN).clamp(-speed_cap, speed_cap)
        };
        let rate = if desired.abs() > self.velocity.abs() {
            profile.acceleration
        } else {
            profile.deceleration
        };
        self.velocity += (desired - self.velocity) * rate;
        self.apply(paddle, court);
    }

    /// Decide once per approach whether this one is thrown
    fn begin_approach(&mut self, strategy: &dyn Strategy, ctx: &AiContext, profile: &TierProfile, rng: &mut GameRng) {
        self.tracking = true;
        self.reaction_delay = 0.0;
        self.replan_countdown = 0;

        let predicted = strategy.predict(ctx, profile).map_or(ctx.court.height / 2.0, |p| p.y);
        let reach = (predicted - ctx.paddle.center_y()).abs() / ctx.paddle.height.max(f32::EPSILON);
        let errors = strategy.error_profile(profile, reach);
        self.approach_fails = rng.chance(errors.strategic_fail_chance);
        // Aim into the larger gap so the miss stays inside the court
        self.fail_direction = if predicted < ctx.court.height / 2.0 { 1.0 } else { -1.0 };
        if self.approach_fails {
            log::debug!(
                "{} opponent throws this approach (reach {:.1} paddle heights)",
                self.side.as_str(),
                reach
            );
        }
    }

    fn plan(&mut self, strategy: &dyn Strategy, ctx: &AiContext, profile: &TierProfile, rng: &mut GameRng) {
        let ph = ctx.paddle.height;
        let Some(prediction) = strategy.predict(ctx, profile) else {
            self.target_y = ctx.court.height / 2.0;
            return;
        };
        let reach = (prediction.y - ctx.paddle.center_y()).abs() / ph.max(f32::EPSILON);
        let errors = strategy.error_profile(profile, reach);
        let travel = (ctx.intercept_x() - ctx.ball.center().x).abs() / ctx.court.width;
        let noise = rng.signed() * errors.scale * ph * travel;

        let mut target = if self.approach_fails {
            prediction.y + self.fail_direction * (FAIL_OFFSET_HEIGHTS * ph + ctx.ball.size + noise.abs())
        } else {
            prediction.y + noise
        };
        if rng.chance(errors.overcorrection_chance) {
            let dir = (target - ctx.paddle.center_y()).signum();
            target += dir * OVERSHOOT_HEIGHTS * ph;
        }

        let half = ph / 2.0;
        self.target_y = target.clamp(half, (ctx.court.height - half).max(half));
        log::trace!(
            "{} opponent plans y {:.1} (predicted {:.1}, {} bounces, {:.0} ticks)",
            self.side.as_str(),
            self.target_y,
            prediction.y,
            prediction.bounces,
            prediction.ticks
        );
    }

    fn apply(&mut self, paddle: &mut Paddle, court: &Court) {
        if !self.velocity.is_finite() {
            self.velocity = 0.0;
        }
        if paddle.move_by(self.velocity, court) {
            self.velocity = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::resolve_wall_collision;
    use glam::Vec2;

    const HUMAN_SPEED: f32 = 7.0;

    /// Serve the ball from the far side toward `paddle` and run the opponent
    /// until the ball reaches its face. Returns true on a miss.
    fn run_approach(tier: Tier, seed: u64) -> bool {
        let court = Court::default();
        let mut rng = GameRng::new(seed);
        let mut paddle = Paddle::new(Side::Right, &court);
        let mut controller = OpponentController::new(Side::Right, tier);
        let mut ball = Ball::new(&court, 4.0, 20.0);
        ball.pos.x = 60.0;
        ball.pos.y = rng.range(20.0, court.height - 40.0);
        let angle = rng.signed() * 0.9;
        ball.vel = Vec2::new(angle.cos(), angle.sin()) * 8.0;

        for _ in 0..1_000 {
            paddle.begin_tick();
            controller.update(&mut paddle, &ball, &court, 0, HUMAN_SPEED, &mut rng);
            ball.pos += ball.vel;
            resolve_wall_collision(&mut ball, &court);
            if ball.pos.x + ball.size >= paddle.face_x() {
                let top = ball.pos.y;
                let bottom = ball.pos.y + ball.size;
                return bottom < paddle.y || top > paddle.y + paddle.height;
            }
        }
        true
    }

    #[test]
    fn test_easy_misses_more_than_impossible() {
        let rallies = 200;
        let misses = |tier| (0..rallies).filter(|seed| run_approach(tier, *seed)).count();
        let easy = misses(Tier::Easy);
        let impossible = misses(Tier::Impossible);
        assert!(easy > impossible, "easy {} vs impossible {}", easy, impossible);
    }

    #[test]
    fn test_drifts_to_centre_when_ball_leaves() {
        let court = Court::default();
        let mut rng = GameRng::new(1);
        let mut paddle = Paddle::new(Side::Right, &court);
        paddle.y = 0.0;
        let mut controller = OpponentController::new(Side::Right, Tier::Hard);
        let mut ball = Ball::new(&court, 4.0, 20.0);
        ball.vel = Vec2::new(-6.0, 0.0);

        for _ in 0..600 {
            paddle.begin_tick();
            controller.update(&mut paddle, &ball, &court, 0, HUMAN_SPEED, &mut rng);
        }
        assert!((paddle.center_y() - court.height / 2.0).abs() < 8.0);
        assert!(!controller.tracking);
    }

    #[test]
    fn test_reaction_zone_gates_tracking() {
        let court = Court::default();
        let paddle = Paddle::new(Side::Right, &court);
        let mut ball = Ball::new(&court, 4.0, 20.0);
        ball.vel = Vec2::new(6.0, 0.0);
        ball.pos.x = 100.0;
        let ctx = AiContext {
            ball: &ball,
            paddle: &paddle,
            court: &court,
            rally_hits: 0,
            adaptive: 0.5,
            human_paddle_speed: HUMAN_SPEED,
        };
        let easy = strategy_for(Tier::Easy);
        let impossible = strategy_for(Tier::Impossible);
        assert!(!easy.react(&ctx, &easy.profile(&ctx)));
        assert!(impossible.react(&ctx, &impossible.profile(&ctx)));
    }

    #[test]
    fn test_long_reach_raises_mistakes() {
        let hard = strategy_for(Tier::Hard);
        let profile = TierProfile::HARD;
        let short = hard.error_profile(&profile, 1.0);
        let long = hard.error_profile(&profile, 3.0);
        assert!((long.strategic_fail_chance - short.strategic_fail_chance * 2.5).abs() < 1e-6);
        assert!((long.scale - short.scale * 2.0).abs() < 1e-6);

        let top = strategy_for(Tier::Impossible).error_profile(&TierProfile::IMPOSSIBLE, 3.0);
        assert_eq!(top.strategic_fail_chance, 0.0);
    }

    #[test]
    fn test_adaptive_profile_follows_difficulty() {
        let court = Court::default();
        let paddle = Paddle::new(Side::Right, &court);
        let ball = Ball::new(&court, 4.0, 20.0);
        let ctx = |adaptive, rally_hits| AiContext {
            ball: &ball,
            paddle: &paddle,
            court: &court,
            rally_hits,
            adaptive,
            human_paddle_speed: HUMAN_SPEED,
        };
        let normal = strategy_for(Tier::Normal);
        assert_eq!(normal.profile(&ctx(0.0, 20)), TierProfile::NORMAL_LENIENT);
        assert_eq!(normal.profile(&ctx(1.0, 20)), TierProfile::NORMAL_STRONG);
        let early = normal.profile(&ctx(0.0, 3));
        assert!(early.reaction_zone <= 0.3);
        assert!(early.strategic_fail_chance <= 0.02);
    }

    #[test]
    fn test_failed_approach_aims_off_the_ball() {
        let court = Court::default();
        let mut rng = GameRng::new(9);
        let paddle = Paddle::new(Side::Right, &court);
        let mut ball = Ball::new(&court, 4.0, 20.0);
        ball.vel = Vec2::new(6.0, 0.0);
        let ctx = AiContext {
            ball: &ball,
            paddle: &paddle,
            court: &court,
            rally_hits: 0,
            adaptive: 0.5,
            human_paddle_speed: HUMAN_SPEED,
        };
        let strategy = strategy_for(Tier::Hard);
        let mut controller = OpponentController::new(Side::Right, Tier::Hard);
        controller.tracking = true;
        controller.approach_fails = true;
        controller.plan(strategy, &ctx, &TierProfile::HARD, &mut rng);
        let predicted = strategy.predict(&ctx, &TierProfile::HARD).unwrap().y;
        assert!((controller.target_y - predicted).abs() >= paddle.height / 2.0);
    }

    /// IMPOSSIBLE with one behaviour switched on, for isolating a mechanic
    fn isolated(profile: TierProfile) -> FixedTier {
        FixedTier {
            tier: Tier::Impossible,
            profile,
        }
    }

    /// Ball heading right, far above the centred right paddle
    fn high_incoming_ball(court: &Court) -> Ball {
        let mut ball = Ball::new(court, 4.0, 20.0);
        ball.pos = Vec2::new(400.0, 80.0);
        ball.vel = Vec2::new(6.0, 0.0);
        ball
    }

    #[test]
    fn test_hesitation_holds_and_decelerates() {
        let court = Court::default();
        let mut rng = GameRng::new(3);
        let mut paddle = Paddle::new(Side::Right, &court);
        let ball = high_incoming_ball(&court);
        let strategy = isolated(TierProfile {
            hesitation_chance: 1.0,
            ..TierProfile::IMPOSSIBLE
        });
        let mut controller = OpponentController::new(Side::Right, Tier::Impossible);

        paddle.begin_tick();
        controller.drive(&strategy, &mut paddle, &ball, &court, 0, HUMAN_SPEED, &mut rng);
        let frozen = controller.hesitation_ticks;
        assert!((4..12).contains(&frozen), "hesitated {} ticks", frozen);
        assert!(controller.velocity < 0.0);

        let target = controller.target_y;
        for _ in 0..frozen {
            let before = controller.velocity.abs();
            paddle.begin_tick();
            controller.drive(&strategy, &mut paddle, &ball, &court, 0, HUMAN_SPEED, &mut rng);
            assert!(controller.velocity.abs() <= before);
            assert_eq!(controller.target_y, target);
        }
        assert_eq!(controller.hesitation_ticks, 0);
    }

    #[test]
    fn test_reaction_delay_holds_paddle() {
        let court = Court::default();
        let mut rng = GameRng::new(4);
        let mut paddle = Paddle::new(Side::Right, &court);
        let ball = high_incoming_ball(&court);
        let strategy = isolated(TierProfile {
            reaction_delay_ticks: 5.0,
            ..TierProfile::IMPOSSIBLE
        });
        let mut controller = OpponentController::new(Side::Right, Tier::Impossible);
        let start = paddle.y;

        for waited in 1..=5 {
            paddle.begin_tick();
            controller.drive(&strategy, &mut paddle, &ball, &court, 0, HUMAN_SPEED, &mut rng);
            assert!(controller.tracking);
            assert_eq!(controller.reaction_delay, waited as f32);
            assert_eq!(paddle.y, start);
        }
        paddle.begin_tick();
        controller.drive(&strategy, &mut paddle, &ball, &court, 0, HUMAN_SPEED, &mut rng);
        assert!(paddle.y < start);
    }

    #[test]
    fn test_overcorrection_overshoots_prediction() {
        let court = Court::default();
        let mut rng = GameRng::new(8);
        let paddle = Paddle::new(Side::Right, &court);
        let mut ball = Ball::new(&court, 4.0, 20.0);
        ball.pos = Vec2::new(400.0, 194.0);
        ball.vel = Vec2::new(6.0, 0.0);
        let ctx = AiContext {
            ball: &ball,
            paddle: &paddle,
            court: &court,
            rally_hits: 0,
            adaptive: 0.5,
            human_paddle_speed: HUMAN_SPEED,
        };
        let mut controller = OpponentController::new(Side::Right, Tier::Impossible);

        let exact = isolated(TierProfile::IMPOSSIBLE);
        controller.plan(&exact, &ctx, &exact.profile, &mut rng);
        let predicted = exact.predict(&ctx, &exact.profile).unwrap().y;
        assert!((controller.target_y - predicted).abs() < 1e-3);

        let overshooting = isolated(TierProfile {
            overcorrection_chance: 1.0,
            ..TierProfile::IMPOSSIBLE
        });
        controller.plan(&overshooting, &ctx, &overshooting.profile, &mut rng);
        // Prediction sits above the paddle, so the overshoot goes further up
        let expected = predicted - OVERSHOOT_HEIGHTS * paddle.height;
        assert!(
            (controller.target_y - expected).abs() < 1e-3,
            "target {} expected {}",
            controller.target_y,
            expected
        );
    }

    #[test]
    fn test_paddle_stays_in_court() {
        let court = Court::default();
        let mut rng = GameRng::new(5);
        let mut paddle = Paddle::new(Side::Right, &court);
        let mut controller = OpponentController::new(Side::Right, Tier::Impossible);
        let mut ball = Ball::new(&court, 4.0, 20.0);
        ball.pos = Vec2::new(600.0, 0.0);
        ball.vel = Vec2::new(2.0, -0.5);
        for _ in 0..120 {
            paddle.begin_tick();
            controller.update(&mut paddle, &ball, &court, 0, HUMAN_SPEED, &mut rng);
            assert!(paddle.y >= 0.0 && paddle.y <= paddle.max_y(&court));
        }
    }
}
