//! Season scheduling for recreational leagues.
//!
//! Assigns a roster of required matchups to dated field slots under
//! availability, blackout, balance, and spacing constraints. The search
//! is a bounded backtracking solver: slots are visited in a deterministic
//! order, each takes a legal matchup or stays open, dead ends undo one
//! commitment at a time, and spent attempts restart with a reshuffled
//! candidate order until the retry budget runs out.
//!
//! Inputs and outputs are in-memory structures; loading rosters and
//! persisting schedules belong to the caller.
//!
//! ```
//! use chrono::{NaiveDate, NaiveTime, Weekday};
//! use slowpitch::{Matchup, SeasonSolver, Slot, SolveOutcome, SolverConfig, Team};
//!
//! let teams = vec![
//!     Team::new("Hawks", [Weekday::Sun]),
//!     Team::new("Owls", [Weekday::Sun]),
//! ];
//! let slots = vec![
//!     Slot::new(
//!         NaiveDate::from_ymd_opt(2025, 5, 4).unwrap(),
//!         NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
//!         "Diamond 1",
//!     ),
//!     Slot::new(
//!         NaiveDate::from_ymd_opt(2025, 5, 11).unwrap(),
//!         NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
//!         "Diamond 1",
//!     ),
//! ];
//! let matchups = vec![Matchup::new("Hawks", "Owls").with_required(2)];
//! let config = SolverConfig {
//!     max_games: 2,
//!     home_away_balance: 1,
//!     weekly_game_limit: 1,
//!     min_gap_days: 2,
//!     min_doubleheader_days: 0,
//!     max_doubleheader_days: 0,
//!     max_retries: 10,
//!     ..SolverConfig::default()
//! };
//!
//! let mut solver = SeasonSolver::new(teams, slots, matchups, config).unwrap();
//! let SolveOutcome::Solved(schedule) = solver.solve() else {
//!     panic!("two Sundays fit two games");
//! };
//! assert_eq!(schedule.len(), 2);
//! ```

pub mod calendar;
pub mod config;
pub mod constraints;
pub mod league;
pub mod logging;
pub mod matchups;
pub mod models;
pub mod report;
pub mod scheduler;
pub mod verify;

pub use calendar::{SlotCalendar, SlotOrder};
pub use config::{ConfigError, SolverConfig};
pub use league::{schedule_league, Division, LeagueOutcome};
pub use models::{Game, Matchup, Schedule, Slot, Team};
pub use scheduler::{ExhaustionReport, SchedulerError, SeasonSolver, SolveOutcome};
pub use verify::{verify_schedule, ScheduleViolation};
