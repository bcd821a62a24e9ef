//! Leaderboard shown at game over
//!
//! There is no shared score backend, so the board is a fixed set of rival
//! runs with the player's run slotted in by score.

use serde::{Deserialize, Serialize};

/// Label used for the player's own row
pub const PLAYER_NAME: &str = "YOU";

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
    /// Total run time in seconds
    pub time_secs: u64,
}

impl LeaderboardEntry {
    fn new(name: &str, score: u64, time_secs: u64) -> Self {
        Self {
            name: name.to_string(),
            score,
            time_secs,
        }
    }

    pub fn is_player(&self) -> bool {
        self.name == PLAYER_NAME
    }
}

/// Ranked leaderboard, highest score first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Board for a finished run of `score` points over `time_secs`
    ///
    /// Ties keep the player behind rivals listed above them and ahead of
    /// those listed below.
    pub fn for_run(score: u64, time_secs: u64) -> Self {
        let mut entries = vec![
            LeaderboardEntry::new("Whale_0x1", 50_000, 120),
            LeaderboardEntry::new("Satoshi", 25_000, 145),
            LeaderboardEntry::new("Vitalik", 18_000, 160),
            LeaderboardEntry::new(PLAYER_NAME, score, time_secs),
            LeaderboardEntry::new("PaperHands", 5_000, 300),
        ];
        // Stable sort, so ties keep listing order
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Self { entries }
    }

    /// 1-indexed rank of the player's row
    pub fn player_rank(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.is_player()).map(|i| i + 1)
    }
}
