//! Configuration bundle for the season solver.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::SlotOrder;

/// Errors for contradictory or unusable constraint configurations.
///
/// These are raised before any search begins; they are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("min_doubleheader_days ({min}) exceeds max_doubleheader_days ({max})")]
    DoubleheaderBoundsInverted { min: u32, max: u32 },
    #[error("weekly_game_limit must be at least 1 when max_games is nonzero")]
    ZeroWeeklyLimit,
    #[error("max_retries must be at least 1")]
    ZeroRetries,
    #[error(
        "home/away split unreachable: 2 x home_away_balance ({balance}) < max_games ({max_games})"
    )]
    UnreachableHomeAwaySplit { balance: u32, max_games: u32 },
}

/// All tunable constraint values for one solve.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Season game total every team must reach exactly.
    pub max_games: u32,
    /// Home-game target per team; no team may host more than this.
    pub home_away_balance: u32,
    /// Maximum games per team within one ISO calendar week.
    pub weekly_game_limit: u32,
    /// Minimum days between a team's games on distinct dates.
    pub min_gap_days: u32,
    /// Fewest doubleheader days each team must end the season with.
    pub min_doubleheader_days: u32,
    /// Most doubleheader days any team may accumulate.
    pub max_doubleheader_days: u32,
    /// Full-attempt restart budget before the solver reports exhaustion.
    pub max_retries: u32,
    /// Seed for the deterministic reordering applied between attempts.
    pub seed: u64,
    /// Slot iteration policy (Sunday preference handling).
    pub slot_order: SlotOrder,
    /// Logging verbosity (0 = silent).
    pub verbosity: u8,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_games: 22,
            home_away_balance: 11,
            weekly_game_limit: 2,
            min_gap_days: 2,
            min_doubleheader_days: 7,
            max_doubleheader_days: 9,
            max_retries: 20_000,
            seed: 42,
            slot_order: SlotOrder::default(),
            verbosity: 0,
        }
    }
}

impl SolverConfig {
    /// Rejects contradictory constraint values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_doubleheader_days > self.max_doubleheader_days {
            return Err(ConfigError::DoubleheaderBoundsInverted {
                min: self.min_doubleheader_days,
                max: self.max_doubleheader_days,
            });
        }
        if self.max_games > 0 && self.weekly_game_limit == 0 {
            return Err(ConfigError::ZeroWeeklyLimit);
        }
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        if 2 * self.home_away_balance < self.max_games {
            return Err(ConfigError::UnreachableHomeAwaySplit {
                balance: self.home_away_balance,
                max_games: self.max_games,
            });
        }
        Ok(())
    }
}
