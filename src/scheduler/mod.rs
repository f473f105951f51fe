//! Backtracking season scheduler.
//!
//! `core` drives the search, `pool` tracks unplaced matchups, and `state`
//! holds the per-attempt ledger every commit and undo runs through.

pub mod core;
pub mod pool;
pub mod state;

pub use self::core::{ExhaustionReport, SchedulerError, SeasonSolver, SolveOutcome};
pub use self::pool::MatchupPool;
pub use self::state::{Ledger, TeamBook};
