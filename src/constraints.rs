//! Placement legality checks.
//!
//! Every check is a pure predicate over an immutable ledger snapshot and a
//! candidate (home, away, slot) triple; nothing here mutates state. The
//! solver commits a candidate only after `check_placement` accepts it, and
//! the verifier re-derives the same rules over finished schedules.

use chrono::Datelike;

use crate::calendar::SlotCalendar;
use crate::config::SolverConfig;
use crate::models::Slot;
use crate::scheduler::state::{week_of, Ledger};

/// Why a candidate placement was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Slot's weekday is not in the team's availability set.
    DayUnavailable { team: String },
    /// Slot's date is in the team's blackout set.
    Blackout { team: String },
    /// Another game already occupies this slot.
    SlotTaken,
    /// The team already plays at this date and time on some field.
    TeamBusy { team: String },
    /// The team already plays twice on this date.
    DayFull { team: String },
    /// Committing would exceed the weekly game limit.
    WeeklyLimit { team: String },
    /// Too close to another game date for this team.
    MinGap { team: String },
    /// A second game today would exceed the doubleheader-day maximum.
    DoubleheaderLimit { team: String },
    /// A second game today must occupy the immediately following timeslot.
    DoubleheaderNotAdjacent { team: String },
    /// Both games of a doubleheader day must be against different opponents.
    RepeatOpponent { team: String },
    /// Committing would exceed the season game total.
    TotalGamesCap { team: String },
    /// The designated side would exceed its home/away balance target.
    BalanceCap { team: String },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DayUnavailable { team } => write!(f, "{team} not available on this weekday"),
            Self::Blackout { team } => write!(f, "{team} blacked out on this date"),
            Self::SlotTaken => write!(f, "slot already taken"),
            Self::TeamBusy { team } => write!(f, "{team} already playing at this time"),
            Self::DayFull { team } => write!(f, "{team} already plays twice this date"),
            Self::WeeklyLimit { team } => write!(f, "{team} at weekly game limit"),
            Self::MinGap { team } => write!(f, "{team} has a game too close to this date"),
            Self::DoubleheaderLimit { team } => write!(f, "{team} at doubleheader-day maximum"),
            Self::DoubleheaderNotAdjacent { team } => {
                write!(f, "{team} second game of day not in next timeslot")
            }
            Self::RepeatOpponent { team } => write!(f, "{team} would face same opponent twice today"),
            Self::TotalGamesCap { team } => write!(f, "{team} at season game total"),
            Self::BalanceCap { team } => write!(f, "{team} at home/away balance target"),
        }
    }
}

/// Orientation that best serves home/away balance: the side with fewer
/// home games hosts; on a tie the pairing's stored order stands.
pub fn preferred_orientation<'a>(
    ledger: &Ledger,
    first: &'a str,
    second: &'a str,
) -> (&'a str, &'a str) {
    if ledger.book(second).home < ledger.book(first).home {
        (second, first)
    } else {
        (first, second)
    }
}

/// Accepts or rejects binding `home` vs `away` into `slot`.
///
/// Checks, in order: availability, blackout, slot occupancy, same-time and
/// same-day booking, weekly limit, minimum gap (same-date games exempt),
/// doubleheader bounds with slot adjacency and distinct opponents, season
/// total cap, and the home/away balance cap on both sides.
pub fn check_placement(
    ledger: &Ledger,
    calendar: &SlotCalendar,
    config: &SolverConfig,
    slot: &Slot,
    slot_pos: usize,
    home: &str,
    away: &str,
) -> Result<(), Violation> {
    let weekday = slot.date.weekday();
    for team in [home, away] {
        let reg = ledger.team(team);
        if !reg.available_days.contains(&weekday) {
            return Err(Violation::DayUnavailable { team: team.to_string() });
        }
        if reg.blackouts.contains(&slot.date) {
            return Err(Violation::Blackout { team: team.to_string() });
        }
    }

    if ledger.used_slots.contains(&slot_pos) {
        return Err(Violation::SlotTaken);
    }

    let week = week_of(slot.date);
    for (team, opponent) in [(home, away), (away, home)] {
        let book = ledger.book(team);
        let today = book.games_on(slot.date);

        if today.iter().any(|g| g.time == slot.time) {
            return Err(Violation::TeamBusy { team: team.to_string() });
        }
        if today.len() >= 2 {
            return Err(Violation::DayFull { team: team.to_string() });
        }
        if book.weekly_count(week) + 1 > config.weekly_game_limit {
            return Err(Violation::WeeklyLimit { team: team.to_string() });
        }
        let min_gap = i64::from(config.min_gap_days);
        for &other_date in book.day_games.keys() {
            if other_date != slot.date && (slot.date - other_date).num_days().abs() < min_gap {
                return Err(Violation::MinGap { team: team.to_string() });
            }
        }
        // A single existing game today makes this commit the back half of a
        // doubleheader: bounded in count, adjacent in time, fresh opponent.
        if let [existing] = today {
            if book.doubleheader_days + 1 > config.max_doubleheader_days {
                return Err(Violation::DoubleheaderLimit { team: team.to_string() });
            }
            if calendar.next_timeslot(slot.date, existing.time) != Some(slot.time) {
                return Err(Violation::DoubleheaderNotAdjacent { team: team.to_string() });
            }
            if existing.opponent == opponent {
                return Err(Violation::RepeatOpponent { team: team.to_string() });
            }
        }
        if book.total + 1 > config.max_games {
            return Err(Violation::TotalGamesCap { team: team.to_string() });
        }
    }

    if ledger.book(home).home + 1 > config.home_away_balance {
        return Err(Violation::BalanceCap { team: home.to_string() });
    }
    if ledger.book(away).away + 1 > config.home_away_balance {
        return Err(Violation::BalanceCap { team: away.to_string() });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::SlotOrder;
    use crate::models::Team;
    use chrono::{NaiveDate, NaiveTime, Weekday};

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn t(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    fn config() -> SolverConfig {
        SolverConfig {
            max_games: 6,
            home_away_balance: 3,
            weekly_game_limit: 2,
            min_gap_days: 2,
            min_doubleheader_days: 0,
            max_doubleheader_days: 1,
            max_retries: 10,
            ..SolverConfig::default()
        }
    }

    // Sunday 2025-05-04 with two timeslots, plus the following Sunday.
    fn calendar() -> SlotCalendar {
        SlotCalendar::new(
            vec![
                Slot::new(d(2025, 5, 4), t(10, 0), "Field 1"),
                Slot::new(d(2025, 5, 4), t(12, 0), "Field 1"),
                Slot::new(d(2025, 5, 4), t(14, 0), "Field 1"),
                Slot::new(d(2025, 5, 11), t(10, 0), "Field 1"),
            ],
            SlotOrder::Chronological,
        )
        .unwrap()
    }

    fn teams() -> Vec<Team> {
        vec![
            Team::new("A1", [Weekday::Sun]).with_blackouts([d(2025, 5, 11)]),
            Team::new("A2", [Weekday::Sun]),
            Team::new("A3", [Weekday::Sun]),
        ]
    }

    fn check(
        ledger: &Ledger,
        calendar: &SlotCalendar,
        slot: &Slot,
        slot_pos: usize,
        home: &str,
        away: &str,
    ) -> Result<(), Violation> {
        check_placement(ledger, calendar, &config(), slot, slot_pos, home, away)
    }

    #[test]
    fn test_accepts_clean_placement() {
        let ledger = Ledger::new(&teams());
        let calendar = calendar();
        let slot = calendar.ordered()[0].clone();
        assert_eq!(check(&ledger, &calendar, &slot, 0, "A1", "A2"), Ok(()));
    }

    #[test]
    fn test_rejects_unavailable_weekday() {
        let ledger = Ledger::new(&teams());
        let calendar = calendar();
        // Saturday slot: nobody plays Saturdays.
        let slot = Slot::new(d(2025, 5, 3), t(10, 0), "Field 1");
        assert_eq!(
            check(&ledger, &calendar, &slot, 0, "A1", "A2"),
            Err(Violation::DayUnavailable { team: "A1".to_string() })
        );
    }

    #[test]
    fn test_rejects_blackout_date() {
        let ledger = Ledger::new(&teams());
        let calendar = calendar();
        let slot = calendar.ordered()[3].clone();
        assert_eq!(
            check(&ledger, &calendar, &slot, 3, "A1", "A2"),
            Err(Violation::Blackout { team: "A1".to_string() })
        );
    }

    #[test]
    fn test_rejects_taken_slot() {
        let mut ledger = Ledger::new(&teams());
        let calendar = calendar();
        let slot = calendar.ordered()[0].clone();
        ledger.apply(&slot, 0, 0, "A1", "A2");
        assert_eq!(
            check(&ledger, &calendar, &slot, 0, "A2", "A3"),
            Err(Violation::SlotTaken)
        );
    }

    #[test]
    fn test_rejects_same_time_other_field() {
        let mut ledger = Ledger::new(&teams());
        let mut slots = calendar().ordered().to_vec();
        slots.push(Slot::new(d(2025, 5, 4), t(10, 0), "Field 2"));
        let calendar = SlotCalendar::new(slots, SlotOrder::Chronological).unwrap();
        ledger.apply(&calendar.ordered()[0].clone(), 0, 0, "A1", "A2");
        // A1 is already on Field 1 at 10:00.
        let other_field = Slot::new(d(2025, 5, 4), t(10, 0), "Field 2");
        assert_eq!(
            check(&ledger, &calendar, &other_field, 1, "A1", "A3"),
            Err(Violation::TeamBusy { team: "A1".to_string() })
        );
    }

    #[test]
    fn test_rejects_day_full() {
        let mut ledger = Ledger::new(&teams());
        let calendar = calendar();
        ledger.apply(&calendar.ordered()[0].clone(), 0, 0, "A1", "A2");
        ledger.apply(&calendar.ordered()[1].clone(), 1, 1, "A1", "A3");
        // A1 already has its doubleheader; a third game today is out.
        let slot = calendar.ordered()[2].clone();
        assert_eq!(
            check(&ledger, &calendar, &slot, 2, "A1", "A2"),
            Err(Violation::DayFull { team: "A1".to_string() })
        );
    }

    #[test]
    fn test_rejects_weekly_limit() {
        let mut ledger = Ledger::new(&teams());
        let calendar = calendar();
        let one_per_week = SolverConfig {
            weekly_game_limit: 1,
            ..config()
        };
        ledger.apply(&calendar.ordered()[0].clone(), 0, 0, "A1", "A2");
        let slot = calendar.ordered()[1].clone();
        assert_eq!(
            check_placement(&ledger, &calendar, &one_per_week, &slot, 1, "A1", "A3"),
            Err(Violation::WeeklyLimit { team: "A1".to_string() })
        );
    }

    #[test]
    fn test_rejects_min_gap() {
        let mut ledger = Ledger::new(&teams());
        let calendar = calendar();
        let wide_gap = SolverConfig {
            min_gap_days: 10,
            ..config()
        };
        ledger.apply(&calendar.ordered()[0].clone(), 0, 0, "A2", "A3");
        // The following Sunday is only 7 days out.
        let slot = calendar.ordered()[3].clone();
        assert_eq!(
            check_placement(&ledger, &calendar, &wide_gap, &slot, 3, "A2", "A3"),
            Err(Violation::MinGap { team: "A2".to_string() })
        );
    }

    #[test]
    fn test_same_date_exempt_from_gap() {
        let mut ledger = Ledger::new(&teams());
        let calendar = calendar();
        ledger.apply(&calendar.ordered()[0].clone(), 0, 0, "A1", "A2");
        // Adjacent timeslot, same date, different opponent: legal doubleheader.
        let slot = calendar.ordered()[1].clone();
        assert_eq!(check(&ledger, &calendar, &slot, 1, "A1", "A3"), Ok(()));
    }

    #[test]
    fn test_rejects_non_adjacent_doubleheader() {
        let mut ledger = Ledger::new(&teams());
        let calendar = calendar();
        ledger.apply(&calendar.ordered()[0].clone(), 0, 0, "A1", "A2");
        // 14:00 skips the 12:00 slot.
        let slot = calendar.ordered()[2].clone();
        assert_eq!(
            check(&ledger, &calendar, &slot, 2, "A1", "A3"),
            Err(Violation::DoubleheaderNotAdjacent { team: "A1".to_string() })
        );
    }

    #[test]
    fn test_rejects_repeat_opponent_doubleheader() {
        let mut ledger = Ledger::new(&teams());
        let calendar = calendar();
        ledger.apply(&calendar.ordered()[0].clone(), 0, 0, "A1", "A2");
        let slot = calendar.ordered()[1].clone();
        assert_eq!(
            check(&ledger, &calendar, &slot, 1, "A2", "A1"),
            Err(Violation::RepeatOpponent { team: "A2".to_string() })
        );
    }

    #[test]
    fn test_rejects_doubleheader_over_limit() {
        let mut ledger = Ledger::new(&teams());
        let calendar = calendar();
        let zero_dh = SolverConfig {
            max_doubleheader_days: 0,
            ..config()
        };
        ledger.apply(&calendar.ordered()[0].clone(), 0, 0, "A1", "A2");
        let slot = calendar.ordered()[1].clone();
        assert_eq!(
            check_placement(&ledger, &calendar, &zero_dh, &slot, 1, "A1", "A3"),
            Err(Violation::DoubleheaderLimit { team: "A1".to_string() })
        );
    }

    #[test]
    fn test_rejects_balance_cap() {
        let mut ledger = Ledger::new(&teams());
        let calendar = calendar();
        let tight = SolverConfig {
            home_away_balance: 1,
            min_gap_days: 0,
            ..config()
        };
        ledger.apply(&calendar.ordered()[0].clone(), 0, 0, "A2", "A3");
        // A2 already hosted once; hosting again would exceed the target.
        let slot = calendar.ordered()[3].clone();
        assert_eq!(
            check_placement(&ledger, &calendar, &tight, &slot, 3, "A2", "A3"),
            Err(Violation::BalanceCap { team: "A2".to_string() })
        );
    }

    #[test]
    fn test_preferred_orientation_balances_homes() {
        let mut ledger = Ledger::new(&teams());
        let calendar = calendar();
        assert_eq!(preferred_orientation(&ledger, "A1", "A2"), ("A1", "A2"));
        ledger.apply(&calendar.ordered()[0].clone(), 0, 0, "A1", "A2");
        // A1 now has one home game, so A2 should host next.
        assert_eq!(preferred_orientation(&ledger, "A1", "A2"), ("A2", "A1"));
    }
}
