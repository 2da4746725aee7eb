//! Fire bonus: momentum built from unbroken paddle returns
//!
//! Every return without touching a wall raises the streak. Thresholds latch
//! flags that change scoring and speed limits; a wall bounce or a point wipes
//! everything.

use serde::{Deserialize, Serialize};

/// Returns needed for the fire effect
pub const FIRE_THRESHOLD: u32 = 5;
/// Returns needed for double points
pub const DOUBLE_POINTS_THRESHOLD: u32 = 15;
/// Returns needed to lift the max-speed clamp
pub const UNLIMITED_SPEED_THRESHOLD: u32 = 20;

/// Displayed intensity rise rate (units per second)
pub const INTENSITY_RISE_RATE: f32 = 2.0;
/// Displayed intensity decay rate (units per second)
pub const INTENSITY_DECAY_RATE: f32 = 0.8;

/// Bonus levels latched by the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireLevel {
    Fire,
    DoublePoints,
    UnlimitedSpeed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FireState {
    pub consecutive_bounces: u32,
    /// Smoothed value for effects, always in [0, 1]
    pub intensity: f32,
    pub target_intensity: f32,
    pub fire_active: bool,
    pub double_points: bool,
    pub unlimited_speed: bool,
}

/// Target intensity for a streak length
pub fn target_intensity(bounces: u32) -> f32 {
    match bounces {
        0 => 0.0,
        b if b < FIRE_THRESHOLD => (b - 1) as f32 / (FIRE_THRESHOLD - 1) as f32 * 0.4,
        b if b < DOUBLE_POINTS_THRESHOLD => 0.6,
        b if b < UNLIMITED_SPEED_THRESHOLD => 0.8,
        _ => 1.0,
    }
}

impl FireState {
    /// Count a successful return. Returns the level latched by this return, if any.
    pub fn register_return(&mut self) -> Option<FireLevel> {
        self.consecutive_bounces += 1;
        self.target_intensity = target_intensity(self.consecutive_bounces);

        let bounces = self.consecutive_bounces;
        if bounces >= UNLIMITED_SPEED_THRESHOLD && !self.unlimited_speed {
            self.unlimited_speed = true;
            log::debug!("Fire: unlimited speed after {} returns", bounces);
            return Some(FireLevel::UnlimitedSpeed);
        }
        if bounces >= DOUBLE_POINTS_THRESHOLD && !self.double_points {
            self.double_points = true;
            log::debug!("Fire: double points after {} returns", bounces);
            return Some(FireLevel::DoublePoints);
        }
        if bounces >= FIRE_THRESHOLD && !self.fire_active {
            self.fire_active = true;
            log::debug!("Fire: active after {} returns", bounces);
            return Some(FireLevel::Fire);
        }
        None
    }

    /// Wall contact breaks the chain; the displayed glow fades out
    pub fn break_streak(&mut self) {
        self.consecutive_bounces = 0;
        self.target_intensity = 0.0;
        self.fire_active = false;
        self.double_points = false;
        self.unlimited_speed = false;
    }

    /// Full reset after a point is credited
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Points awarded for the rally currently in play
    #[inline]
    pub fn point_value(&self) -> u32 {
        if self.double_points { 2 } else { 1 }
    }

    /// Ease the displayed intensity toward the target
    pub fn update(&mut self, dt: f32) {
        let delta = self.target_intensity - self.intensity;
        let step = if delta > 0.0 {
            (INTENSITY_RISE_RATE * dt).min(delta)
        } else {
            (-INTENSITY_DECAY_RATE * dt).max(delta)
        };
        self.intensity = (self.intensity + step).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_target_curve() {
        assert_eq!(target_intensity(0), 0.0);
        assert_eq!(target_intensity(1), 0.0);
        assert!((target_intensity(3) - 0.2).abs() < 1e-6);
        assert!((target_intensity(4) - 0.3).abs() < 1e-6);
        assert_eq!(target_intensity(5), 0.6);
        assert_eq!(target_intensity(14), 0.6);
        assert_eq!(target_intensity(15), 0.8);
        assert_eq!(target_intensity(20), 1.0);
        assert_eq!(target_intensity(99), 1.0);
    }

    #[test]
    fn test_flags_latch_once() {
        let mut fire = FireState::default();
        let mut latched = Vec::new();
        for _ in 0..25 {
            if let Some(level) = fire.register_return() {
                latched.push((fire.consecutive_bounces, level));
            }
        }
        assert_eq!(
            latched,
            vec![
                (5, FireLevel::Fire),
                (15, FireLevel::DoublePoints),
                (20, FireLevel::UnlimitedSpeed)
            ]
        );
        assert_eq!(fire.point_value(), 2);
    }

    #[test]
    fn test_break_streak_clears_flags() {
        let mut fire = FireState::default();
        for _ in 0..16 {
            fire.register_return();
        }
        fire.update(1.0);
        fire.break_streak();
        assert_eq!(fire.consecutive_bounces, 0);
        assert!(!fire.fire_active && !fire.double_points && !fire.unlimited_speed);
        assert_eq!(fire.target_intensity, 0.0);
        // Glow fades rather than snapping off
        assert!(fire.intensity > 0.0);
        assert_eq!(fire.point_value(), 1);
    }

    #[test]
    fn test_intensity_eases_asymmetrically() {
        let mut fire = FireState::default();
        for _ in 0..20 {
            fire.register_return();
        }
        // 0 -> 1 at 2.0/s takes half a second
        for _ in 0..30 {
            fire.update(SIM_DT);
        }
        assert!((fire.intensity - 1.0).abs() < 1e-4);

        fire.break_streak();
        for _ in 0..30 {
            fire.update(SIM_DT);
        }
        // 0.8/s decay over half a second
        assert!((fire.intensity - 0.6).abs() < 1e-3);
        for _ in 0..120 {
            fire.update(SIM_DT);
        }
        assert_eq!(fire.intensity, 0.0);
    }
}
