//! Level-clear reward: brick points plus a bonus for beating par

use serde::{Deserialize, Serialize};

use crate::consts::TIME_BONUS_PER_SECOND;

/// Score breakdown for a cleared level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelReward {
    /// Points from destroyed bricks
    pub base: u64,
    /// Points for seconds saved under par
    pub bonus: u64,
    pub total: u64,
}

/// Bonus for finishing `elapsed_secs` into a level with the given par
///
/// Negative inputs (malformed oracle data) are treated as zero. Zero once
/// elapsed reaches par.
pub fn time_bonus(par_secs: i64, elapsed_secs: i64) -> u64 {
    let par = par_secs.max(0) as u64;
    let elapsed = elapsed_secs.max(0) as u64;
    par.saturating_sub(elapsed)
        .saturating_mul(TIME_BONUS_PER_SECOND)
}

/// Full breakdown for a cleared level
pub fn level_reward(par_secs: i64, elapsed_secs: i64, base: u64) -> LevelReward {
    let bonus = time_bonus(par_secs, elapsed_secs);
    LevelReward {
        base,
        bonus,
        total: base.saturating_add(bonus),
    }
}
