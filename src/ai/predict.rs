//! Ball trajectory prediction with a bounded number of wall bounces

use glam::Vec2;

/// Upper bound on simulated segments, whatever the tier asks for
const MAX_SEGMENTS: u32 = 32;

/// Where the ball is expected to cross the intercept line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Ball centre y at the intercept
    pub y: f32,
    /// Ticks until the intercept
    pub ticks: f32,
    /// Wall bounces simulated on the way
    pub bounces: u32,
}

/// Follow the ball centre from `center` with velocity `vel` (per tick) to the
/// vertical line `target_x`.
///
/// Walls sit at `half_size` and `court_height - half_size` for the centre. At
/// most `max_bounces` reflections are simulated; past that the path is
/// extrapolated straight and clamped into the court, which is where weaker
/// tiers go wrong on steep shots. Returns `None` if the ball is not heading
/// for `target_x`.
pub fn predict_intercept(
    center: Vec2,
    vel: Vec2,
    target_x: f32,
    court_height: f32,
    half_size: f32,
    max_bounces: u32,
) -> Option<Prediction> {
    let dx = target_x - center.x;
    if vel.x == 0.0 || !vel.is_finite() || dx * vel.x < 0.0 {
        return None;
    }

    let total_ticks = dx / vel.x;
    let top = half_size;
    let bottom = (court_height - half_size).max(top);

    let mut y = center.y.clamp(top, bottom);
    let mut vy = vel.y;
    let mut remaining = total_ticks;
    let mut bounces = 0;

    for _ in 0..MAX_SEGMENTS {
        let to_wall = if vy < 0.0 {
            (y - top) / -vy
        } else if vy > 0.0 {
            (bottom - y) / vy
        } else {
            f32::INFINITY
        };

        if to_wall < remaining && bounces < max_bounces {
            y = if vy < 0.0 { top } else { bottom };
            vy = -vy;
            remaining -= to_wall;
            bounces += 1;
        } else {
            y += vy * remaining;
            break;
        }
    }

    Some(Prediction {
        y: y.clamp(top, bottom),
        ticks: total_ticks,
        bounces,
    })
}
