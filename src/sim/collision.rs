//! Collision detection and response
//!
//! Walls reflect. Paddles are where the game happens: the outgoing angle
//! depends on where the ball struck the paddle, the paddle's own motion is
//! transferred into the ball, and speed is decayed then rescaled by rally
//! progression.

use glam::Vec2;

use super::progression::SpeedScaling;
use super::state::{Ball, Court, Paddle, Side};
use crate::consts::MAX_BOUNCE_ANGLE;

/// Impact offset beyond which a hit counts as an edge hit
pub const EDGE_HIT_OFFSET: f32 = 0.7;
/// Impact offset beyond which a hit counts as an extreme edge hit
pub const EXTREME_EDGE_OFFSET: f32 = 0.8;
/// Impact offset below which a hit counts as a centre hit
pub const CENTER_HIT_OFFSET: f32 = 0.1;
/// Fraction of max speed above which the ball counts as very fast
pub const FAST_BALL_FRACTION: f32 = 0.8;
/// Share of paddle velocity carried into the ball on every hit
pub const PADDLE_SPIN_TRANSFER: f32 = 0.3;
/// Paddle velocity (units per tick at reference scale) counted as a fast swing
pub const FAST_SWING_THRESHOLD: f32 = 3.0;
/// Extra spin transferred by a fast swing
pub const FAST_SWING_TRANSFER: f32 = 0.5;
pub const CENTER_HIT_BOOST: f32 = 1.1;
pub const EXTREME_EDGE_LIFT: f32 = 1.5;

/// Speed decay rule; exactly one applies to each return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedDecay {
    /// Paddle moving against the ball's vertical travel
    Defensive,
    Edge,
    Fast,
    Normal,
}

impl SpeedDecay {
    /// Pick the rule by priority: defensive, edge, fast, normal
    pub fn classify(paddle_velocity: f32, ball_vy: f32, impact_offset: f32, speed: f32, max_speed: f32) -> Self {
        let defensive = paddle_velocity != 0.0 && ball_vy != 0.0 && paddle_velocity.signum() != ball_vy.signum();
        if defensive {
            SpeedDecay::Defensive
        } else if impact_offset.abs() > EDGE_HIT_OFFSET {
            SpeedDecay::Edge
        } else if speed > max_speed * FAST_BALL_FRACTION {
            SpeedDecay::Fast
        } else {
            SpeedDecay::Normal
        }
    }

    pub fn factor(self) -> f32 {
        match self {
            SpeedDecay::Defensive => 0.85,
            SpeedDecay::Edge => 0.90,
            SpeedDecay::Fast => 0.95,
            SpeedDecay::Normal => 0.98,
        }
    }
}

/// Outcome of a resolved paddle return
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleHit {
    pub side: Side,
    pub impact_offset: f32,
    pub paddle_velocity: f32,
    pub decay: SpeedDecay,
    /// Ball speed after resolution
    pub speed: f32,
}

/// Bounce off the top and bottom walls. Returns true on contact.
pub fn resolve_wall_collision(ball: &mut Ball, court: &Court) -> bool {
    let bottom = (court.height - ball.size).max(0.0);
    if ball.pos.y < 0.0 {
        ball.pos.y = 0.0;
        ball.vel.y = ball.vel.y.abs();
        true
    } else if ball.pos.y > bottom {
        ball.pos.y = bottom;
        ball.vel.y = -ball.vel.y.abs();
        true
    } else {
        false
    }
}

#[inline]
fn vertical_overlap(ball_y: f32, ball_size: f32, paddle: &Paddle) -> bool {
    ball_y < paddle.y + paddle.height && ball_y + ball_size > paddle.y
}

/// Whether the ball strikes `paddle` this tick.
///
/// The ball must be travelling toward the paddle. A plain bounding-box overlap
/// counts as long as the ball's centre is not behind the paddle; a swept test
/// against the paddle face catches balls fast enough to skip over it in one tick.
pub fn ball_hits_paddle(ball: &Ball, prev_pos: Vec2, paddle: &Paddle) -> bool {
    if ball.vel.x * paddle.side.direction() <= 0.0 {
        return false;
    }

    let center_x = ball.pos.x + ball.size / 2.0;
    let in_front = match paddle.side {
        Side::Left => center_x >= paddle.x,
        Side::Right => center_x <= paddle.x + paddle.width,
    };
    let overlaps = ball.pos.x < paddle.x + paddle.width
        && ball.pos.x + ball.size > paddle.x
        && vertical_overlap(ball.pos.y, ball.size, paddle);
    if overlaps && in_front {
        return true;
    }

    // Leading edge before and after the move
    let face = paddle.face_x();
    let (prev_lead, lead) = match paddle.side {
        Side::Left => (prev_pos.x, ball.pos.x),
        Side::Right => (prev_pos.x + ball.size, ball.pos.x + ball.size),
    };
    let crossed = match paddle.side {
        Side::Left => prev_lead >= face && lead < face,
        Side::Right => prev_lead <= face && lead > face,
    };
    if !crossed {
        return false;
    }
    let t = ((face - prev_lead) / (lead - prev_lead)).clamp(0.0, 1.0);
    let y_at_face = prev_pos.y + (ball.pos.y - prev_pos.y) * t;
    vertical_overlap(y_at_face, ball.size, paddle)
}

/// Where on the paddle the ball struck: -1 top edge, 0 centre, +1 bottom edge
#[inline]
pub fn impact_offset(ball: &Ball, paddle: &Paddle) -> f32 {
    let half = paddle.height / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    ((ball.center().y - paddle.center_y()) / half).clamp(-1.0, 1.0)
}

/// Send the ball back off `paddle`.
///
/// The caller has already counted the hit into the rally; `scaling` carries
/// the difficulty, rally-length and progressive multipliers for it.
pub fn resolve_paddle_collision(
    ball: &mut Ball,
    paddle: &Paddle,
    court: &Court,
    scaling: &SpeedScaling,
    unlimited_speed: bool,
) -> PaddleHit {
    let offset = impact_offset(ball, paddle);
    let paddle_velocity = paddle.velocity();
    // Outgoing horizontal sign: away from the paddle
    let outgoing = -paddle.side.direction();

    let mut speed = ball.vel.length();
    if speed.is_nan() || speed < ball.min_speed {
        speed = ball.min_speed;
    }

    let decay = SpeedDecay::classify(paddle_velocity, ball.vel.y, offset, speed, ball.max_speed);
    speed = (speed * decay.factor() * scaling.product()).max(ball.min_speed);

    let angle = offset * MAX_BOUNCE_ANGLE;
    let vy = angle.sin() * speed + paddle_velocity * PADDLE_SPIN_TRANSFER;
    let vx = (angle.cos() * speed).max(ball.min_speed) * outgoing;
    let mut vel = Vec2::new(vx, vy);

    if offset.abs() < CENTER_HIT_OFFSET {
        vel *= CENTER_HIT_BOOST;
    }
    if offset.abs() > EXTREME_EDGE_OFFSET {
        vel.y *= EXTREME_EDGE_LIFT;
    }
    if paddle_velocity.abs() > FAST_SWING_THRESHOLD * court.scale() {
        vel.y += paddle_velocity * FAST_SWING_TRANSFER;
    }

    ball.vel = vel;
    ball.clamp_speed(unlimited_speed);

    // Just outside the face so the same tick can't hit again
    ball.pos.x = match paddle.side {
        Side::Left => paddle.face_x(),
        Side::Right => paddle.face_x() - ball.size,
    };

    PaddleHit {
        side: paddle.side,
        impact_offset: offset,
        paddle_velocity,
        decay,
        speed: ball.speed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn setup(side: Side) -> (Court, Ball, Paddle) {
        let court = Court::default();
        let ball = Ball::new(&court, 4.0, 16.0);
        let paddle = Paddle::new(side, &court);
        (court, ball, paddle)
    }

    /// Put the ball against the right paddle's face at a given impact offset
    fn place_at_offset(ball: &mut Ball, paddle: &Paddle, offset: f32) {
        let center_y = paddle.center_y() + offset * paddle.height / 2.0;
        ball.pos = Vec2::new(paddle.face_x() - ball.size + 2.0, center_y - ball.size / 2.0);
    }

    #[test]
    fn test_ball_bounces_off_top_wall() {
        let (court, mut ball, _) = setup(Side::Left);
        ball.pos.y = -3.0;
        ball.vel = Vec2::new(5.0, -4.0);
        assert!(resolve_wall_collision(&mut ball, &court));
        assert_eq!(ball.pos.y, 0.0);
        assert_eq!(ball.vel, Vec2::new(5.0, 4.0));
    }

    #[test]
    fn test_ball_bounces_off_bottom_wall() {
        let (court, mut ball, _) = setup(Side::Left);
        ball.pos.y = court.height;
        ball.vel = Vec2::new(5.0, 4.0);
        assert!(resolve_wall_collision(&mut ball, &court));
        assert_eq!(ball.pos.y, court.height - ball.size);
        assert_eq!(ball.vel, Vec2::new(5.0, -4.0));
    }

    #[test]
    fn test_no_wall_contact_mid_court() {
        let (court, mut ball, _) = setup(Side::Left);
        ball.vel = Vec2::new(5.0, 4.0);
        assert!(!resolve_wall_collision(&mut ball, &court));
    }

    #[test]
    fn test_hit_requires_approach() {
        let (_, mut ball, paddle) = setup(Side::Right);
        place_at_offset(&mut ball, &paddle, 0.0);
        ball.vel = Vec2::new(6.0, 0.0);
        assert!(ball_hits_paddle(&ball, ball.pos - ball.vel, &paddle));
        ball.vel = Vec2::new(-6.0, 0.0);
        assert!(!ball_hits_paddle(&ball, ball.pos - ball.vel, &paddle));
    }

    #[test]
    fn test_swept_hit_catches_tunneling() {
        let (_, mut ball, paddle) = setup(Side::Left);
        // Ball jumps from in front of the face to fully behind the paddle
        let prev = Vec2::new(paddle.face_x() + 5.0, paddle.center_y());
        ball.pos = Vec2::new(paddle.x - ball.size - 10.0, paddle.center_y());
        ball.vel = ball.pos - prev;
        assert!(ball_hits_paddle(&ball, prev, &paddle));
    }

    #[test]
    fn test_miss_above_paddle() {
        let (_, mut ball, paddle) = setup(Side::Left);
        let prev = Vec2::new(paddle.face_x() + 5.0, paddle.y - ball.size - 20.0);
        ball.pos = Vec2::new(paddle.face_x() - 3.0, prev.y);
        ball.vel = ball.pos - prev;
        assert!(!ball_hits_paddle(&ball, prev, &paddle));
    }

    #[test]
    fn test_return_reverses_and_repositions() {
        let (court, mut ball, paddle) = setup(Side::Right);
        place_at_offset(&mut ball, &paddle, 0.5);
        ball.vel = Vec2::new(7.0, 1.0);
        let hit = resolve_paddle_collision(&mut ball, &paddle, &court, &SpeedScaling::default(), false);
        assert!(ball.vel.x < 0.0);
        assert!(ball.vel.y > 0.0, "lower half sends the ball down");
        assert_eq!(ball.pos.x + ball.size, paddle.face_x());
        assert_eq!(hit.decay, SpeedDecay::Normal);
        assert!(!ball_hits_paddle(&ball, ball.pos, &paddle));
    }

    #[test]
    fn test_decay_priority() {
        // Defensive beats edge
        assert_eq!(SpeedDecay::classify(-2.0, 3.0, 0.9, 5.0, 16.0), SpeedDecay::Defensive);
        assert_eq!(SpeedDecay::classify(2.0, 3.0, 0.9, 5.0, 16.0), SpeedDecay::Edge);
        assert_eq!(SpeedDecay::classify(0.0, 3.0, 0.2, 14.0, 16.0), SpeedDecay::Fast);
        assert_eq!(SpeedDecay::classify(0.0, 0.0, 0.2, 5.0, 16.0), SpeedDecay::Normal);
    }

    #[test]
    fn test_center_hit_faster_than_edge_hit() {
        let (court, mut center_ball, paddle) = setup(Side::Right);
        let mut edge_ball = center_ball.clone();
        place_at_offset(&mut center_ball, &paddle, 0.0);
        place_at_offset(&mut edge_ball, &paddle, 0.95);
        center_ball.vel = Vec2::new(6.0, 0.0);
        edge_ball.vel = Vec2::new(6.0, 0.0);

        let scaling = SpeedScaling::default();
        let center = resolve_paddle_collision(&mut center_ball, &paddle, &court, &scaling, false);
        let edge = resolve_paddle_collision(&mut edge_ball, &paddle, &court, &scaling, false);
        assert!(center.speed > edge.speed, "{} <= {}", center.speed, edge.speed);
    }

    #[test]
    fn test_horizontal_and_zero_velocity_are_safe() {
        let (court, mut ball, paddle) = setup(Side::Left);
        ball.pos = Vec2::new(paddle.face_x() - 2.0, paddle.center_y() - ball.size / 2.0);

        ball.vel = Vec2::new(-5.0, 0.0);
        resolve_paddle_collision(&mut ball, &paddle, &court, &SpeedScaling::default(), false);
        assert!(ball.vel.is_finite());
        assert!(ball.vel.x > 0.0);

        ball.vel = Vec2::ZERO;
        resolve_paddle_collision(&mut ball, &paddle, &court, &SpeedScaling::default(), false);
        assert!(ball.vel.is_finite());
        assert!(ball.speed() >= ball.min_speed - 1e-4);
    }

    #[test]
    fn test_paddle_motion_adds_spin() {
        let (court, mut still_ball, mut paddle) = setup(Side::Right);
        let mut moving_ball = still_ball.clone();
        place_at_offset(&mut still_ball, &paddle, 0.3);
        place_at_offset(&mut moving_ball, &paddle, 0.3);
        still_ball.vel = Vec2::new(6.0, 0.0);
        moving_ball.vel = Vec2::new(6.0, 0.0);

        let still = resolve_paddle_collision(&mut still_ball, &paddle, &court, &SpeedScaling::default(), false);
        paddle.prev_y = paddle.y - 5.0;
        let moving = resolve_paddle_collision(&mut moving_ball, &paddle, &court, &SpeedScaling::default(), false);
        assert_eq!(moving.paddle_velocity, 5.0);
        assert!(moving_ball.vel.y > still_ball.vel.y);
        assert_eq!(still.paddle_velocity, 0.0);
    }

    proptest! {
        #[test]
        fn prop_return_speed_within_bounds(
            offset in -1.2f32..1.2,
            vx in 0.0f32..40.0,
            vy in -40.0f32..40.0,
            paddle_motion in -12.0f32..12.0,
            hits in 0u32..200,
            rally_secs in 0.0f32..120.0,
        ) {
            let (court, mut ball, mut paddle) = setup(Side::Right);
            place_at_offset(&mut ball, &paddle, offset);
            ball.vel = Vec2::new(vx, vy);
            paddle.prev_y = paddle.y - paddle_motion;
            let scaling = SpeedScaling::new(crate::ai::Tier::Impossible, true, rally_secs, hits);

            let hit = resolve_paddle_collision(&mut ball, &paddle, &court, &scaling, false);
            prop_assert!(ball.vel.is_finite());
            prop_assert!(hit.speed >= ball.min_speed - 1e-3);
            prop_assert!(hit.speed <= ball.max_speed + 1e-3);
            prop_assert!(ball.vel.x < 0.0);
        }

        #[test]
        fn prop_unlimited_speed_only_floors(vx in 0.0f32..40.0, hits in 0u32..200) {
            let (court, mut ball, paddle) = setup(Side::Right);
            place_at_offset(&mut ball, &paddle, 0.0);
            ball.vel = Vec2::new(vx, 0.0);
            let scaling = SpeedScaling::new(crate::ai::Tier::Impossible, true, 60.0, hits);
            let hit = resolve_paddle_collision(&mut ball, &paddle, &court, &scaling, true);
            prop_assert!(hit.speed >= ball.min_speed - 1e-3);
            prop_assert!(ball.vel.is_finite());
        }
    }
}
