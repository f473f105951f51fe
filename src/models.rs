//! Core data types for the league scheduling system.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A team entered in a division.
///
/// Carries only static registration data. Running counters (games played,
/// home/away split, doubleheader days) belong to the solver's ledger and
/// are never stored on the team itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    /// Weekdays on which the team can play.
    pub available_days: FxHashSet<Weekday>,
    /// Calendar dates on which the team cannot play.
    pub blackouts: FxHashSet<NaiveDate>,
}

impl Team {
    pub fn new(id: impl Into<String>, available_days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            id: id.into(),
            available_days: available_days.into_iter().collect(),
            blackouts: FxHashSet::default(),
        }
    }

    /// Adds blackout dates, returning self for chaining.
    pub fn with_blackouts(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.blackouts.extend(dates);
        self
    }
}

/// A bookable unit of field capacity: one date, one start time, one field.
///
/// Identity is the full (date, time, field) triple; the calendar rejects
/// duplicates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub field: String,
}

impl Slot {
    pub fn new(date: NaiveDate, time: NaiveTime, field: impl Into<String>) -> Self {
        Self {
            date,
            time,
            field: field.into(),
        }
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn is_sunday(&self) -> bool {
        self.date.weekday() == Weekday::Sun
    }
}

/// A required pairing of two teams and how many times they must meet.
///
/// `first` is the preferred initial host; the solver flips the orientation
/// of individual meetings to keep home/away counts balanced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub first: String,
    pub second: String,
    pub required: u32,
}

impl Matchup {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            required: 1,
        }
    }

    /// Sets the required meeting count, returning self for chaining.
    pub fn with_required(mut self, required: u32) -> Self {
        self.required = required;
        self
    }
}

/// A committed game: a matchup bound to a slot with home/away designated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub field: String,
    pub home: String,
    pub away: String,
}

impl Game {
    pub fn involves(&self, team: &str) -> bool {
        self.home == team || self.away == team
    }

    /// The other team of this game, if `team` participates.
    pub fn opponent_of(&self, team: &str) -> Option<&str> {
        if self.home == team {
            Some(&self.away)
        } else if self.away == team {
            Some(&self.home)
        } else {
            None
        }
    }
}

/// The full set of committed games for a season.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub games: Vec<Game>,
}

impl Schedule {
    pub fn new(games: Vec<Game>) -> Self {
        Self { games }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn games_for_team<'a>(&'a self, team: &'a str) -> impl Iterator<Item = &'a Game> {
        self.games.iter().filter(move |g| g.involves(team))
    }

    /// Sorts games by date, then time, then field for stable output.
    pub fn sort(&mut self) {
        self.games
            .sort_by(|a, b| (a.date, a.time, &a.field).cmp(&(b.date, b.time, &b.field)));
    }
}
