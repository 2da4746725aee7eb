//! Per-side combo counter

use serde::{Deserialize, Serialize};

use crate::consts::TICK_RATE;

/// A milestone fires every this many consecutive returns
pub const COMBO_MILESTONE_INTERVAL: u32 = 10;
/// How long the milestone flag stays raised (2 seconds)
pub const COMBO_MILESTONE_TICKS: u32 = 2 * TICK_RATE;

/// Consecutive successful returns by one side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub count: u32,
    pub max_combo: u32,
    /// Raised when a milestone fires, lowered when the timer runs out
    pub milestone: bool,
    pub milestone_ticks: u32,
}

impl ComboState {
    /// Count a return by this side. Returns the combo count if it hit a milestone.
    pub fn register_hit(&mut self) -> Option<u32> {
        self.count += 1;
        self.max_combo = self.max_combo.max(self.count);
        if self.count % COMBO_MILESTONE_INTERVAL == 0 {
            self.milestone = true;
            self.milestone_ticks = COMBO_MILESTONE_TICKS;
            Some(self.count)
        } else {
            None
        }
    }

    /// This side conceded a point
    pub fn reset(&mut self) {
        self.count = 0;
        self.milestone = false;
        self.milestone_ticks = 0;
    }

    /// Run down the milestone timer
    pub fn tick(&mut self) {
        if self.milestone_ticks > 0 {
            self.milestone_ticks -= 1;
            if self.milestone_ticks == 0 {
                self.milestone = false;
            }
        }
    }
}
