//! Whole-schedule verification.
//!
//! Re-derives every season invariant from a finished schedule, independent
//! of the solver's incremental bookkeeping. The solver runs this over each
//! schedule it returns; tests and callers can run it over anything.

use chrono::{Datelike, NaiveDate, NaiveTime};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::calendar::SlotCalendar;
use crate::config::SolverConfig;
use crate::models::{Schedule, Team};
use crate::scheduler::state::week_of;

/// A season invariant broken by a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleViolation {
    UnknownTeam {
        team: String,
    },
    SlotDoubleBooked {
        date: NaiveDate,
        time: NaiveTime,
        field: String,
    },
    TeamDoubleBooked {
        team: String,
        date: NaiveDate,
        time: NaiveTime,
    },
    UnavailableDay {
        team: String,
        date: NaiveDate,
    },
    BlackoutViolated {
        team: String,
        date: NaiveDate,
    },
    WeeklyLimitExceeded {
        team: String,
        year: i32,
        week: u32,
        count: u32,
    },
    WrongTotal {
        team: String,
        count: u32,
    },
    HomeAwayImbalance {
        team: String,
        home: u32,
        away: u32,
    },
    GapTooSmall {
        team: String,
        first: NaiveDate,
        second: NaiveDate,
    },
    TooManyGamesOnDate {
        team: String,
        date: NaiveDate,
        count: u32,
    },
    NonAdjacentDoubleheader {
        team: String,
        date: NaiveDate,
    },
    RepeatOpponentDoubleheader {
        team: String,
        date: NaiveDate,
    },
    DoubleheaderCountOutOfRange {
        team: String,
        days: u32,
    },
}

impl std::fmt::Display for ScheduleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTeam { team } => write!(f, "unknown team {team} in schedule"),
            Self::SlotDoubleBooked { date, time, field } => {
                write!(f, "slot {date} {time} {field} booked twice")
            }
            Self::TeamDoubleBooked { team, date, time } => {
                write!(f, "{team} booked twice at {date} {time}")
            }
            Self::UnavailableDay { team, date } => {
                write!(f, "{team} scheduled on unavailable weekday {date}")
            }
            Self::BlackoutViolated { team, date } => {
                write!(f, "{team} scheduled on blackout date {date}")
            }
            Self::WeeklyLimitExceeded {
                team,
                year,
                week,
                count,
            } => write!(f, "{team} has {count} games in week {year}-W{week}"),
            Self::WrongTotal { team, count } => {
                write!(f, "{team} finished with {count} games")
            }
            Self::HomeAwayImbalance { team, home, away } => {
                write!(f, "{team} split {home} home / {away} away")
            }
            Self::GapTooSmall {
                team,
                first,
                second,
            } => write!(f, "{team} plays {first} and {second}, too close"),
            Self::TooManyGamesOnDate { team, date, count } => {
                write!(f, "{team} has {count} games on {date}")
            }
            Self::NonAdjacentDoubleheader { team, date } => {
                write!(f, "{team} doubleheader on {date} not in adjacent timeslots")
            }
            Self::RepeatOpponentDoubleheader { team, date } => {
                write!(f, "{team} doubleheader on {date} repeats an opponent")
            }
            Self::DoubleheaderCountOutOfRange { team, days } => {
                write!(f, "{team} has {days} doubleheader days")
            }
        }
    }
}

/// Checks every whole-schedule invariant, returning all violations found.
///
/// An empty result means the schedule is valid for the given teams,
/// calendar, and configuration.
pub fn verify_schedule(
    schedule: &Schedule,
    teams: &[Team],
    calendar: &SlotCalendar,
    config: &SolverConfig,
) -> Vec<ScheduleViolation> {
    let mut violations = Vec::new();
    let registry: FxHashMap<&str, &Team> = teams.iter().map(|t| (t.id.as_str(), t)).collect();

    // Slot occupancy across the whole schedule.
    let mut used: FxHashSet<(NaiveDate, NaiveTime, &str)> = FxHashSet::default();
    for game in &schedule.games {
        if !used.insert((game.date, game.time, game.field.as_str())) {
            violations.push(ScheduleViolation::SlotDoubleBooked {
                date: game.date,
                time: game.time,
                field: game.field.clone(),
            });
        }
    }

    // Per-team bookings: (date, time, opponent, is_home), in date order.
    let mut bookings: FxHashMap<&str, Vec<(NaiveDate, NaiveTime, &str, bool)>> =
        FxHashMap::default();
    for game in &schedule.games {
        for (team, opponent, is_home) in [
            (game.home.as_str(), game.away.as_str(), true),
            (game.away.as_str(), game.home.as_str(), false),
        ] {
            if !registry.contains_key(team) {
                violations.push(ScheduleViolation::UnknownTeam {
                    team: team.to_string(),
                });
                continue;
            }
            bookings.entry(team).or_default().push((
                game.date,
                game.time,
                opponent,
                is_home,
            ));
        }
    }

    for team in teams {
        let mut games = bookings.remove(team.id.as_str()).unwrap_or_default();
        games.sort();

        let total = games.len() as u32;
        if total != config.max_games {
            violations.push(ScheduleViolation::WrongTotal {
                team: team.id.clone(),
                count: total,
            });
        }

        let home = games.iter().filter(|(_, _, _, is_home)| *is_home).count() as u32;
        let away = total - home;
        if home > config.home_away_balance || away > config.home_away_balance {
            violations.push(ScheduleViolation::HomeAwayImbalance {
                team: team.id.clone(),
                home,
                away,
            });
        }

        let mut weekly: FxHashMap<(i32, u32), u32> = FxHashMap::default();
        let mut per_date: FxHashMap<NaiveDate, Vec<(NaiveTime, &str)>> = FxHashMap::default();
        let mut seen_times: FxHashSet<(NaiveDate, NaiveTime)> = FxHashSet::default();

        for &(date, time, opponent, _) in &games {
            if !team.available_days.contains(&date.weekday()) {
                violations.push(ScheduleViolation::UnavailableDay {
                    team: team.id.clone(),
                    date,
                });
            }
            if team.blackouts.contains(&date) {
                violations.push(ScheduleViolation::BlackoutViolated {
                    team: team.id.clone(),
                    date,
                });
            }
            if !seen_times.insert((date, time)) {
                violations.push(ScheduleViolation::TeamDoubleBooked {
                    team: team.id.clone(),
                    date,
                    time,
                });
            }
            *weekly.entry(week_of(date)).or_insert(0) += 1;
            per_date.entry(date).or_default().push((time, opponent));
        }

        for ((year, week), count) in weekly {
            if count > config.weekly_game_limit {
                violations.push(ScheduleViolation::WeeklyLimitExceeded {
                    team: team.id.clone(),
                    year,
                    week,
                    count,
                });
            }
        }

        // Gap rule over consecutive distinct dates; same-date pairs are
        // doubleheaders and judged separately.
        let mut dates: Vec<NaiveDate> = per_date.keys().copied().collect();
        dates.sort();
        for pair in dates.windows(2) {
            let gap = (pair[1] - pair[0]).num_days();
            if gap < i64::from(config.min_gap_days) {
                violations.push(ScheduleViolation::GapTooSmall {
                    team: team.id.clone(),
                    first: pair[0],
                    second: pair[1],
                });
            }
        }

        let mut doubleheader_days = 0u32;
        for (&date, day_games) in &per_date {
            match day_games.len() {
                0 | 1 => {}
                2 => {
                    doubleheader_days += 1;
                    let mut times: Vec<NaiveTime> =
                        day_games.iter().map(|&(time, _)| time).collect();
                    times.sort();
                    if calendar.next_timeslot(date, times[0]) != Some(times[1]) {
                        violations.push(ScheduleViolation::NonAdjacentDoubleheader {
                            team: team.id.clone(),
                            date,
                        });
                    }
                    if day_games[0].1 == day_games[1].1 {
                        violations.push(ScheduleViolation::RepeatOpponentDoubleheader {
                            team: team.id.clone(),
                            date,
                        });
                    }
                }
                n => {
                    violations.push(ScheduleViolation::TooManyGamesOnDate {
                        team: team.id.clone(),
                        date,
                        count: n as u32,
                    });
                }
            }
        }

        if doubleheader_days < config.min_doubleheader_days
            || doubleheader_days > config.max_doubleheader_days
        {
            violations.push(ScheduleViolation::DoubleheaderCountOutOfRange {
                team: team.id.clone(),
                days: doubleheader_days,
            });
        }
    }

    violations
}
