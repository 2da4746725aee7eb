//! Rally tracking and the speed scaling applied on every paddle return

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::ai::Tier;
use crate::consts::RALLY_HISTORY_LEN;
use crate::ticks_to_secs;

/// Rally-length bonus per second of rally
pub const RALLY_LENGTH_RATE: f32 = 0.02;
/// Rally-length bonus cap (+20%)
pub const RALLY_LENGTH_CAP: f32 = 0.2;
/// Progressive bonus per hit (+1%)
pub const PROGRESSIVE_HIT_RATE: f32 = 0.01;
/// Progressive bonus cap (+80%)
pub const PROGRESSIVE_HIT_CAP: f32 = 0.8;

/// The rally in play plus a bounded record of finished ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RallyState {
    pub hits: u32,
    pub start_tick: u64,
    /// Durations of finished rallies in seconds (oldest first)
    pub durations: VecDeque<f32>,
    /// Hit counts of finished rallies (oldest first)
    pub hit_counts: VecDeque<u32>,
}

impl RallyState {
    pub fn new(start_tick: u64) -> Self {
        Self {
            hits: 0,
            start_tick,
            durations: VecDeque::with_capacity(RALLY_HISTORY_LEN),
            hit_counts: VecDeque::with_capacity(RALLY_HISTORY_LEN),
        }
    }

    /// Count a paddle return, returning the new hit count
    pub fn register_hit(&mut self) -> u32 {
        self.hits += 1;
        self.hits
    }

    pub fn duration_secs(&self, now_tick: u64) -> f32 {
        ticks_to_secs(now_tick.saturating_sub(self.start_tick))
    }

    /// Close the rally, archive it and start the next one at `now_tick`
    pub fn finish(&mut self, now_tick: u64) -> (f32, u32) {
        let finished = (self.duration_secs(now_tick), self.hits);
        if self.durations.len() == RALLY_HISTORY_LEN {
            self.durations.pop_front();
            self.hit_counts.pop_front();
        }
        self.durations.push_back(finished.0);
        self.hit_counts.push_back(finished.1);
        self.hits = 0;
        self.start_tick = now_tick;
        finished
    }

    /// Restart the clock without archiving (serve delay is not rally time)
    pub fn restart_clock(&mut self, now_tick: u64) {
        self.start_tick = now_tick;
    }

    /// Mean hits over archived rallies
    pub fn average_hits(&self) -> Option<f32> {
        if self.hit_counts.is_empty() {
            return None;
        }
        let total: u32 = self.hit_counts.iter().sum();
        Some(total as f32 / self.hit_counts.len() as f32)
    }

    pub fn longest(&self) -> u32 {
        self.hit_counts.iter().copied().max().unwrap_or(0).max(self.hits)
    }
}

/// Multipliers stacked onto the decayed speed of a return
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedScaling {
    pub difficulty: f32,
    pub rally_length: f32,
    pub progressive: f32,
}

impl Default for SpeedScaling {
    fn default() -> Self {
        Self {
            difficulty: 1.0,
            rally_length: 1.0,
            progressive: 1.0,
        }
    }
}

impl SpeedScaling {
    pub fn new(tier: Tier, single_player: bool, rally_secs: f32, hits: u32) -> Self {
        Self {
            difficulty: difficulty_factor(tier, single_player),
            rally_length: rally_length_factor(rally_secs),
            progressive: progressive_hit_factor(hits),
        }
    }

    #[inline]
    pub fn product(&self) -> f32 {
        self.difficulty * self.rally_length * self.progressive
    }
}

/// Speed factor for the opponent tier; two-player matches are unscaled
pub fn difficulty_factor(tier: Tier, single_player: bool) -> f32 {
    if single_player { tier.speed_factor() } else { 1.0 }
}

pub fn rally_length_factor(rally_secs: f32) -> f32 {
    1.0 + (rally_secs.max(0.0) * RALLY_LENGTH_RATE).min(RALLY_LENGTH_CAP)
}

pub fn progressive_hit_factor(hits: u32) -> f32 {
    1.0 + (hits as f32 * PROGRESSIVE_HIT_RATE).min(PROGRESSIVE_HIT_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut rally = RallyState::new(0);
        for i in 0..(RALLY_HISTORY_LEN as u32 + 5) {
            for _ in 0..i {
                rally.register_hit();
            }
            rally.finish(u64::from(i) * 60);
        }
        assert_eq!(rally.hit_counts.len(), RALLY_HISTORY_LEN);
        assert_eq!(rally.durations.len(), RALLY_HISTORY_LEN);
        // Oldest five were dropped
        assert_eq!(rally.hit_counts.front(), Some(&5));
        assert_eq!(rally.hits, 0);
    }

    #[test]
    fn test_finish_reports_duration() {
        let mut rally = RallyState::new(120);
        rally.register_hit();
        rally.register_hit();
        let (secs, hits) = rally.finish(300);
        assert!((secs - 3.0).abs() < 1e-4);
        assert_eq!(hits, 2);
        assert_eq!(rally.average_hits(), Some(2.0));
    }

    #[test]
    fn test_factor_caps() {
        assert_eq!(rally_length_factor(0.0), 1.0);
        assert!((rally_length_factor(5.0) - 1.1).abs() < 1e-6);
        assert!((rally_length_factor(600.0) - 1.2).abs() < 1e-6);
        assert!((progressive_hit_factor(10) - 1.1).abs() < 1e-6);
        assert!((progressive_hit_factor(500) - 1.8).abs() < 1e-6);
    }

    #[test]
    fn test_difficulty_factor_range() {
        for tier in Tier::ALL {
            let f = difficulty_factor(tier, true);
            assert!((0.8..=1.25).contains(&f));
        }
        assert_eq!(difficulty_factor(Tier::Impossible, false), 1.0);
        assert_eq!(difficulty_factor(Tier::Easy, true), 0.8);
        assert_eq!(difficulty_factor(Tier::Impossible, true), 1.25);
    }
}
