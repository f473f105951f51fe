//! Division orchestration.
//!
//! Divisions schedule independently: each gets its own roster, slot
//! partition, and matchup pool, and the solver runs once per division.
//! A matchup whose team belongs to another division's roster is a
//! configuration error caught here, before any solve starts.

use rustc_hash::FxHashMap;

use crate::config::SolverConfig;
use crate::models::{Matchup, Schedule, Slot, Team};
use crate::scheduler::{ExhaustionReport, SchedulerError, SeasonSolver, SolveOutcome};
use crate::{log_changes, log_checks};

/// One independently scheduled bracket of the league.
#[derive(Clone, Debug)]
pub struct Division {
    pub name: String,
    pub teams: Vec<Team>,
    pub slots: Vec<Slot>,
    pub matchups: Vec<Matchup>,
}

/// Terminal result of scheduling a whole league.
#[derive(Clone, Debug, PartialEq)]
pub enum LeagueOutcome {
    /// Every division solved; games merged and sorted.
    Solved(Schedule),
    /// A division ran out of retry budget. Earlier divisions' results are
    /// discarded so a re-run with relaxed constraints starts clean.
    Exhausted {
        division: String,
        report: ExhaustionReport,
    },
}

/// Validates rosters and schedules each division in turn.
///
/// Fails fast on a team registered in two divisions or a matchup whose
/// teams live in different divisions; per-division input problems surface
/// through each division's own solver construction.
pub fn schedule_league(
    divisions: Vec<Division>,
    config: &SolverConfig,
) -> Result<LeagueOutcome, SchedulerError> {
    let mut home_division: FxHashMap<String, String> = FxHashMap::default();
    for division in &divisions {
        for team in &division.teams {
            if home_division
                .insert(team.id.clone(), division.name.clone())
                .is_some()
            {
                return Err(SchedulerError::DuplicateTeam(team.id.clone()));
            }
        }
    }
    for division in &divisions {
        for matchup in &division.matchups {
            for side in [&matchup.first, &matchup.second] {
                match home_division.get(side) {
                    Some(home) if *home == division.name => {}
                    Some(_) => {
                        return Err(SchedulerError::CrossDivisionMatchup(
                            matchup.first.clone(),
                            matchup.second.clone(),
                        ))
                    }
                    // Fully unknown teams are caught by the solver below.
                    None => {}
                }
            }
        }
    }

    let verbosity = config.verbosity;
    let mut games = Vec::new();
    for division in divisions {
        log_changes!(verbosity, "Scheduling division {}", division.name);
        let mut solver = SeasonSolver::new(
            division.teams,
            division.slots,
            division.matchups,
            config.clone(),
        )?;
        match solver.solve() {
            SolveOutcome::Solved(schedule) => {
                log_changes!(
                    verbosity,
                    "Division {} solved with {} games",
                    division.name,
                    schedule.len()
                );
                games.extend(schedule.games);
            }
            SolveOutcome::Exhausted(report) => {
                log_checks!(
                    verbosity,
                    "Division {} exhausted after {} attempts",
                    division.name,
                    report.attempts
                );
                return Ok(LeagueOutcome::Exhausted {
                    division: division.name,
                    report,
                });
            }
        }
    }

    let mut schedule = Schedule::new(games);
    schedule.sort();
    Ok(LeagueOutcome::Solved(schedule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::SlotOrder;
    use chrono::{NaiveDate, NaiveTime, Weekday};

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn t(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    fn config() -> SolverConfig {
        SolverConfig {
            max_games: 2,
            home_away_balance: 1,
            weekly_game_limit: 1,
            min_gap_days: 2,
            min_doubleheader_days: 0,
            max_doubleheader_days: 0,
            max_retries: 10,
            seed: 5,
            slot_order: SlotOrder::SundayFirstWeekly,
            verbosity: 0,
        }
    }

    fn division(name: &str, a: &str, b: &str, field: &str) -> Division {
        Division {
            name: name.to_string(),
            teams: vec![
                Team::new(a, [Weekday::Sun]),
                Team::new(b, [Weekday::Sun]),
            ],
            slots: vec![
                Slot::new(d(2025, 5, 4), t(10, 0), field),
                Slot::new(d(2025, 5, 11), t(10, 0), field),
            ],
            matchups: vec![Matchup::new(a, b).with_required(2)],
        }
    }

    #[test]
    fn test_two_divisions_merge_sorted() {
        let divisions = vec![
            division("A", "A1", "A2", "Field 1"),
            division("B", "B1", "B2", "Field 2"),
        ];
        let outcome = schedule_league(divisions, &config()).unwrap();
        let LeagueOutcome::Solved(schedule) = outcome else {
            panic!("expected a solved league");
        };
        assert_eq!(schedule.len(), 4);
        // Merged output is globally sorted by date, time, field.
        let sorted: Vec<_> = schedule
            .games
            .iter()
            .map(|g| (g.date, g.time, g.field.clone()))
            .collect();
        let mut expected = sorted.clone();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_cross_division_matchup_rejected() {
        let mut divisions = vec![
            division("A", "A1", "A2", "Field 1"),
            division("B", "B1", "B2", "Field 2"),
        ];
        divisions[0].matchups.push(Matchup::new("A1", "B1"));
        let result = schedule_league(divisions, &config());
        assert!(matches!(
            result,
            Err(SchedulerError::CrossDivisionMatchup(..))
        ));
    }

    #[test]
    fn test_team_in_two_divisions_rejected() {
        let divisions = vec![
            division("A", "A1", "A2", "Field 1"),
            division("B", "A1", "B2", "Field 2"),
        ];
        let result = schedule_league(divisions, &config());
        assert!(matches!(
            result,
            Err(SchedulerError::DuplicateTeam(team)) if team == "A1"
        ));
    }

    #[test]
    fn test_exhausted_division_is_reported() {
        let mut hopeless = division("B", "B1", "B2", "Field 2");
        hopeless.teams[0] = Team::new("B1", [Weekday::Sun])
            .with_blackouts([d(2025, 5, 4), d(2025, 5, 11)]);
        let divisions = vec![division("A", "A1", "A2", "Field 1"), hopeless];
        let outcome = schedule_league(divisions, &config()).unwrap();
        assert!(matches!(
            outcome,
            LeagueOutcome::Exhausted { division, .. } if division == "B"
        ));
    }
}
