//! Finished-match records
//!
//! Newest first, capped at ten entries. Persisting the history is left to the
//! embedding application; everything here is serde-serializable.

use serde::{Deserialize, Serialize};

use crate::ai::Tier;

/// Maximum number of matches to keep
pub const MAX_MATCH_RECORDS: usize = 10;

/// Outcome of one finished match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub player_score: u32,
    pub opponent_score: u32,
    pub player_won: bool,
    /// Opponent tier the match was played against
    pub tier: Tier,
    /// Simulated match length in seconds
    pub duration_secs: f32,
    /// Most paddle hits in a single rally
    pub longest_rally: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MatchHistory {
    pub records: Vec<MatchRecord>,
}

impl MatchHistory {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Add a finished match, dropping the oldest past the cap
    pub fn record(&mut self, record: MatchRecord) {
        log::info!(
            "Match recorded: {}-{} vs {} ({})",
            record.player_score,
            record.opponent_score,
            record.tier.as_str(),
            if record.player_won { "won" } else { "lost" }
        );
        self.records.insert(0, record);
        self.records.truncate(MAX_MATCH_RECORDS);
    }

    /// Share of recorded matches the human won
    pub fn player_win_rate(&self) -> Option<f32> {
        if self.records.is_empty() {
            return None;
        }
        let wins = self.records.iter().filter(|r| r.player_won).count();
        Some(wins as f32 / self.records.len() as f32)
    }

    pub fn latest(&self) -> Option<&MatchRecord> {
        self.records.first()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
