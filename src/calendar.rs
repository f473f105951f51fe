//! Slot calendar: deterministic iteration order and per-date timeslot index.

use chrono::{Datelike, NaiveDate, NaiveTime};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Slot;

/// Errors that can occur while building a slot calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// The same (date, time, field) triple appeared more than once.
    DuplicateSlot(Slot),
}

impl std::fmt::Display for CalendarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateSlot(slot) => write!(
                f,
                "Duplicate slot: {} {} on {}",
                slot.date, slot.time, slot.field
            ),
        }
    }
}

impl std::error::Error for CalendarError {}

/// Iteration-order policy for the calendar.
///
/// League play favors Sunday dates, so Sunday slots can be surfaced ahead
/// of slots that plain chronological order would visit first. How far ahead
/// they jump is a policy choice:
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotOrder {
    /// Sunday slots sort ahead of the other slots of the same ISO week;
    /// weeks themselves stay chronological.
    #[default]
    SundayFirstWeekly,
    /// Every Sunday slot sorts ahead of every non-Sunday slot, regardless
    /// of week.
    SundayFirstGlobal,
    /// Plain date, time, field order with no Sunday preference.
    Chronological,
}

/// Composite sort key for one slot under a given policy.
///
/// Lower key = visited earlier. Field id is the final tie-break so the
/// order is total and reproducible.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SlotKey {
    week: (i32, u32),
    non_sunday: bool,
    date: NaiveDate,
    time: NaiveTime,
    field: String,
}

fn sort_key(slot: &Slot, order: SlotOrder) -> SlotKey {
    let iso = slot.date.iso_week();
    let (week, non_sunday) = match order {
        SlotOrder::SundayFirstWeekly => ((iso.year(), iso.week()), !slot.is_sunday()),
        SlotOrder::SundayFirstGlobal => ((0, 0), !slot.is_sunday()),
        SlotOrder::Chronological => ((0, 0), false),
    };
    SlotKey {
        week,
        non_sunday,
        date: slot.date,
        time: slot.time,
        field: slot.field.clone(),
    }
}

/// Deduplicated, deterministically ordered collection of bookable slots.
#[derive(Clone, Debug)]
pub struct SlotCalendar {
    slots: Vec<Slot>,
    times_by_date: BTreeMap<NaiveDate, Vec<NaiveTime>>,
}

impl SlotCalendar {
    /// Builds a calendar from raw slots, sorting them under `order`.
    ///
    /// Returns an error if the same (date, time, field) triple appears
    /// twice; upstream loaders are expected to hand over deduplicated data.
    pub fn new(mut slots: Vec<Slot>, order: SlotOrder) -> Result<Self, CalendarError> {
        let mut seen: FxHashSet<(NaiveDate, NaiveTime, String)> = FxHashSet::default();
        for slot in &slots {
            if !seen.insert((slot.date, slot.time, slot.field.clone())) {
                return Err(CalendarError::DuplicateSlot(slot.clone()));
            }
        }

        slots.sort_by_cached_key(|slot| sort_key(slot, order));

        let mut times_by_date: BTreeMap<NaiveDate, Vec<NaiveTime>> = BTreeMap::new();
        for slot in &slots {
            let times = times_by_date.entry(slot.date).or_default();
            if !times.contains(&slot.time) {
                times.push(slot.time);
            }
        }
        for times in times_by_date.values_mut() {
            times.sort();
        }

        Ok(Self {
            slots,
            times_by_date,
        })
    }

    /// Slots in iteration order.
    pub fn ordered(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Sorted distinct start times offered on `date` (empty if none).
    pub fn timeslots(&self, date: NaiveDate) -> &[NaiveTime] {
        self.times_by_date
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The timeslot immediately following `after` on `date`, if any.
    ///
    /// Used by the doubleheader adjacency rule: a team's second game of a
    /// day must occupy the very next start time.
    pub fn next_timeslot(&self, date: NaiveDate, after: NaiveTime) -> Option<NaiveTime> {
        let times = self.timeslots(date);
        let idx = times.iter().position(|&t| t == after)?;
        times.get(idx + 1).copied()
    }
}
