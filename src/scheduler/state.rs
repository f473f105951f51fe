//! Per-attempt mutable search state.
//!
//! One `Ledger` is owned exclusively by the attempt that created it. Every
//! mutation made by `apply` is reversed exactly by `revert` with the same
//! `Placement`, which is what makes single-step undo possible.

use chrono::{Datelike, NaiveDate, NaiveTime};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::{Slot, Team};

/// ISO week key: (year, week number).
pub type WeekKey = (i32, u32);

/// One game already booked for a team on a given date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayGame {
    pub time: NaiveTime,
    pub opponent: String,
}

/// Running counters for one team during an attempt.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TeamBook {
    pub total: u32,
    pub home: u32,
    pub away: u32,
    /// Games per ISO week.
    pub weekly: FxHashMap<WeekKey, u32>,
    /// Games per date, at most two entries, in commit order.
    pub day_games: FxHashMap<NaiveDate, Vec<DayGame>>,
    /// Dates on which this team plays twice.
    pub doubleheader_days: u32,
}

impl TeamBook {
    pub fn games_on(&self, date: NaiveDate) -> &[DayGame] {
        self.day_games.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn weekly_count(&self, week: WeekKey) -> u32 {
        self.weekly.get(&week).copied().unwrap_or(0)
    }
}

/// Undo record for one committed game.
#[derive(Clone, Debug)]
pub struct Placement {
    pub slot_pos: usize,
    pub pool_pos: usize,
    pub home: String,
    pub away: String,
}

/// Team registration data plus all mutable bookkeeping for one attempt.
#[derive(Clone, Debug)]
pub struct Ledger {
    teams: FxHashMap<String, (Team, TeamBook)>,
    /// Calendar positions of slots already carrying a game.
    pub used_slots: FxHashSet<usize>,
}

pub fn week_of(date: NaiveDate) -> WeekKey {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

impl Ledger {
    pub fn new(teams: &[Team]) -> Self {
        Self {
            teams: teams
                .iter()
                .map(|t| (t.id.clone(), (t.clone(), TeamBook::default())))
                .collect(),
            used_slots: FxHashSet::default(),
        }
    }

    /// Registration data for a team. Team ids are validated before any
    /// attempt starts, so a miss here is a solver defect.
    pub fn team(&self, id: &str) -> &Team {
        &self.teams.get(id).expect("team id validated before solve").0
    }

    pub fn book(&self, id: &str) -> &TeamBook {
        &self.teams.get(id).expect("team id validated before solve").1
    }

    fn book_mut(&mut self, id: &str) -> &mut TeamBook {
        &mut self
            .teams
            .get_mut(id)
            .expect("team id validated before solve")
            .1
    }

    pub fn books(&self) -> impl Iterator<Item = (&str, &TeamBook)> {
        self.teams.iter().map(|(id, (_, book))| (id.as_str(), book))
    }

    /// Books a game into the ledger and returns its undo record.
    pub fn apply(
        &mut self,
        slot: &Slot,
        slot_pos: usize,
        pool_pos: usize,
        home: &str,
        away: &str,
    ) -> Placement {
        self.used_slots.insert(slot_pos);
        let week = week_of(slot.date);

        for (team, opponent, is_home) in [(home, away, true), (away, home, false)] {
            let book = self.book_mut(team);
            book.total += 1;
            if is_home {
                book.home += 1;
            } else {
                book.away += 1;
            }
            *book.weekly.entry(week).or_insert(0) += 1;
            let day = book.day_games.entry(slot.date).or_default();
            day.push(DayGame {
                time: slot.time,
                opponent: opponent.to_string(),
            });
            if day.len() == 2 {
                book.doubleheader_days += 1;
            }
        }

        Placement {
            slot_pos,
            pool_pos,
            home: home.to_string(),
            away: away.to_string(),
        }
    }

    /// Reverses `apply`. Placements must be reverted in LIFO order; the
    /// game being removed is always the team's most recent booking.
    pub fn revert(&mut self, placement: &Placement, slot: &Slot) {
        self.used_slots.remove(&placement.slot_pos);
        let week = week_of(slot.date);

        for (team, is_home) in [(&placement.home, true), (&placement.away, false)] {
            let book = self.book_mut(team);
            book.total -= 1;
            if is_home {
                book.home -= 1;
            } else {
                book.away -= 1;
            }
            let count = book.weekly.get_mut(&week).expect("weekly count underflow");
            *count -= 1;
            if *count == 0 {
                book.weekly.remove(&week);
            }
            let day = book
                .day_games
                .get_mut(&slot.date)
                .expect("day booking underflow");
            let removed = day.pop().expect("day booking underflow");
            debug_assert_eq!(removed.time, slot.time);
            if day.len() == 1 {
                book.doubleheader_days -= 1;
            }
            if day.is_empty() {
                book.day_games.remove(&slot.date);
            }
        }
    }
}
