//! Core backtracking season solver.
//!
//! Drives the per-slot search: for each slot in calendar order, pick a
//! legal matchup and orientation, commit it, and on dead ends undo one
//! commitment at a time. When backtracking unwinds all the way to the
//! start, the attempt is spent; the solver restarts with a reshuffled
//! candidate order until the retry budget runs out.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::calendar::{CalendarError, SlotCalendar};
use crate::config::{ConfigError, SolverConfig};
use crate::constraints::{check_placement, preferred_orientation};
use crate::models::{Game, Matchup, Schedule, Slot, Team};
use crate::verify::verify_schedule;
use crate::{log_changes, log_checks, log_debug};

use super::pool::MatchupPool;
use super::state::{Ledger, Placement};

/// Malformed-input errors, raised before any search begins.
///
/// Distinct from search exhaustion: these are never retried and indicate
/// the caller handed over contradictory or incomplete data.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error("duplicate team id: {0}")]
    DuplicateTeam(String),
    #[error("team {0} has an empty availability set")]
    EmptyAvailability(String),
    #[error("matchup references unknown team: {0}")]
    UnknownTeam(String),
    #[error("matchup pairs {0} against itself")]
    SelfMatchup(String),
    #[error("team {team} is down for {required} meetings but max_games is {max_games}")]
    MismatchedGameTarget {
        team: String,
        required: u32,
        max_games: u32,
    },
    #[error("matchup {0} vs {1} crosses division rosters")]
    CrossDivisionMatchup(String, String),
}

/// Diagnostic context for a search that ran out of retry budget.
///
/// Snapshotted at the deepest point any attempt reached, since an
/// exhausted attempt has already unwound its commitments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExhaustionReport {
    /// Attempts consumed (equals the configured budget).
    pub attempts: u32,
    /// Most games any attempt had committed at once.
    pub best_placed: usize,
    /// Pairings with meetings still owed at that point: (team, team, count).
    pub unplaced: Vec<(String, String, u32)>,
    /// Teams short of the season total at that point: (team, games placed).
    pub teams_below_target: Vec<(String, u32)>,
}

/// Terminal result of a bounded solve.
///
/// Exhaustion is an expected, reportable outcome that callers handle by
/// relaxing constraints and re-running, so it is a value here rather
/// than an error.
#[derive(Clone, Debug, PartialEq)]
pub enum SolveOutcome {
    Solved(Schedule),
    Exhausted(ExhaustionReport),
}

/// One decision point in the search: which slot it filled, where candidate
/// scanning resumes on backtrack, and how to undo the commitment.
/// `placement == None` means the slot was left empty after every real
/// candidate failed.
#[derive(Debug)]
struct Frame {
    slot_pos: usize,
    cursor: usize,
    placement: Option<Placement>,
}

#[derive(Debug, Default)]
struct BestSnapshot {
    placed: usize,
    unplaced: Vec<(String, String, u32)>,
    totals: Vec<(String, u32)>,
}

impl BestSnapshot {
    fn record(&mut self, placed: usize, pool: &MatchupPool, ledger: &Ledger) {
        self.placed = placed;
        self.unplaced = pool.remaining_pairings();
        let mut totals: Vec<(String, u32)> = ledger
            .books()
            .map(|(id, book)| (id.to_string(), book.total))
            .collect();
        totals.sort();
        self.totals = totals;
    }
}

/// Backtracking solver for one division's season.
///
/// Owns every piece of mutable search state for the duration of a
/// `solve` call; nothing is shared between attempts except the best-depth
/// diagnostics.
pub struct SeasonSolver {
    teams: Vec<Team>,
    calendar: SlotCalendar,
    pool: MatchupPool,
    config: SolverConfig,
}

impl SeasonSolver {
    /// Validates all inputs and builds a solver.
    ///
    /// Fails fast on contradictory configuration, duplicate or unknown
    /// team ids, empty availability sets, duplicate slots, self-pairings,
    /// and per-team meeting totals that cannot reach `max_games`.
    pub fn new(
        teams: Vec<Team>,
        slots: Vec<Slot>,
        matchups: Vec<Matchup>,
        config: SolverConfig,
    ) -> Result<Self, SchedulerError> {
        config.validate()?;

        let mut required_per_team: FxHashMap<&str, u32> = FxHashMap::default();
        for team in &teams {
            if required_per_team.insert(team.id.as_str(), 0).is_some() {
                return Err(SchedulerError::DuplicateTeam(team.id.clone()));
            }
            if team.available_days.is_empty() {
                return Err(SchedulerError::EmptyAvailability(team.id.clone()));
            }
        }

        for matchup in &matchups {
            if matchup.first == matchup.second {
                return Err(SchedulerError::SelfMatchup(matchup.first.clone()));
            }
            for side in [&matchup.first, &matchup.second] {
                match required_per_team.get_mut(side.as_str()) {
                    Some(count) => *count += matchup.required,
                    None => return Err(SchedulerError::UnknownTeam(side.clone())),
                }
            }
        }

        for team in &teams {
            let required = required_per_team[team.id.as_str()];
            if required != config.max_games {
                return Err(SchedulerError::MismatchedGameTarget {
                    team: team.id.clone(),
                    required,
                    max_games: config.max_games,
                });
            }
        }

        let calendar = SlotCalendar::new(slots, config.slot_order)?;

        Ok(Self {
            teams,
            calendar,
            pool: MatchupPool::new(matchups),
            config,
        })
    }

    /// Runs the bounded search to completion.
    ///
    /// Returns a finished, verified schedule or an exhaustion report once
    /// the retry budget is spent. Panics if a completed schedule fails
    /// re-verification; that is a solver bug, never an input problem.
    pub fn solve(&mut self) -> SolveOutcome {
        let verbosity = self.config.verbosity;
        let mut best = BestSnapshot::default();
        best.record(0, &self.pool, &Ledger::new(&self.teams));

        for attempt in 0..self.config.max_retries {
            self.pool.reorder_for_attempt(attempt, self.config.seed);
            log_changes!(
                verbosity,
                "Attempt {} of {}",
                attempt + 1,
                self.config.max_retries
            );

            if let Some(schedule) = self.run_attempt(&mut best) {
                let violations =
                    verify_schedule(&schedule, &self.teams, &self.calendar, &self.config);
                assert!(
                    violations.is_empty(),
                    "committed schedule violates its own constraints: {violations:?}"
                );
                log_changes!(
                    verbosity,
                    "Solved on attempt {} with {} games",
                    attempt + 1,
                    schedule.len()
                );
                return SolveOutcome::Solved(schedule);
            }
            log_changes!(verbosity, "Attempt {} exhausted", attempt + 1);
        }

        SolveOutcome::Exhausted(ExhaustionReport {
            attempts: self.config.max_retries,
            best_placed: best.placed,
            unplaced: best.unplaced.clone(),
            teams_below_target: best
                .totals
                .iter()
                .filter(|(_, total)| *total < self.config.max_games)
                .cloned()
                .collect(),
        })
    }

    /// One full attempt: empty schedule to completion or local exhaustion.
    fn run_attempt(&mut self, best: &mut BestSnapshot) -> Option<Schedule> {
        let verbosity = self.config.verbosity;
        let mut ledger = Ledger::new(&self.teams);
        let mut games: Vec<Game> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut slot_pos = 0usize;
        let mut cursor = 0usize;

        let candidate_count = self.pool.len() * 2;
        // Safety bound on one attempt's work; a search this deep in trouble
        // is better spent on a reshuffled restart.
        let max_steps = 100 * (self.calendar.len() + 1) * (candidate_count + 1);
        let mut steps = 0usize;

        loop {
            steps += 1;
            if steps > max_steps {
                log_debug!(verbosity, "  Step bound reached after {} steps", steps);
                return None;
            }

            // Success the moment every meeting is placed and season-end
            // checks hold; leftover slots simply stay open.
            if self.pool.all_placed() {
                if self.finalize_ok(&ledger) {
                    let mut schedule = Schedule::new(games);
                    schedule.sort();
                    return Some(schedule);
                }
                if !self.backtrack(&mut stack, &mut ledger, &mut games, &mut slot_pos, &mut cursor)
                {
                    return None;
                }
                continue;
            }

            if slot_pos == self.calendar.len() {
                // Out of slots with meetings still owed.
                if !self.backtrack(&mut stack, &mut ledger, &mut games, &mut slot_pos, &mut cursor)
                {
                    return None;
                }
                continue;
            }

            let slot = self.calendar.ordered()[slot_pos].clone();
            match self.next_candidate(&slot, slot_pos, cursor, &ledger) {
                Some((cand, pool_pos, home, away)) => {
                    log_changes!(
                        verbosity,
                        "  Commit {} vs {} at {} {} on {}",
                        home,
                        away,
                        slot.date,
                        slot.time,
                        slot.field
                    );
                    let placement = ledger.apply(&slot, slot_pos, pool_pos, &home, &away);
                    self.pool.mark_placed(pool_pos);
                    games.push(Game {
                        date: slot.date,
                        time: slot.time,
                        field: slot.field.clone(),
                        home,
                        away,
                    });
                    if games.len() > best.placed {
                        best.record(games.len(), &self.pool, &ledger);
                    }
                    stack.push(Frame {
                        slot_pos,
                        cursor: cand + 1,
                        placement: Some(placement),
                    });
                    slot_pos += 1;
                    cursor = 0;
                }
                None => {
                    // No matchup fits this slot; leave it open and move on.
                    log_debug!(
                        verbosity,
                        "  Leaving {} {} on {} open",
                        slot.date,
                        slot.time,
                        slot.field
                    );
                    stack.push(Frame {
                        slot_pos,
                        cursor: candidate_count,
                        placement: None,
                    });
                    slot_pos += 1;
                    cursor = 0;
                }
            }
        }
    }

    /// Scans candidates for `slot` starting at `from`.
    ///
    /// Candidates enumerate the pool in its current order, two per entry:
    /// the balance-preferred orientation first, then the reverse.
    fn next_candidate(
        &self,
        slot: &Slot,
        slot_pos: usize,
        from: usize,
        ledger: &Ledger,
    ) -> Option<(usize, usize, String, String)> {
        let verbosity = self.config.verbosity;
        for cand in from..self.pool.len() * 2 {
            let pool_pos = cand / 2;
            if !self.pool.has_remaining_at(pool_pos) {
                continue;
            }
            let matchup = self.pool.at(pool_pos);
            let (preferred_home, preferred_away) =
                preferred_orientation(ledger, &matchup.first, &matchup.second);
            let (home, away) = if cand % 2 == 0 {
                (preferred_home, preferred_away)
            } else {
                (preferred_away, preferred_home)
            };

            match check_placement(ledger, &self.calendar, &self.config, slot, slot_pos, home, away)
            {
                Ok(()) => return Some((cand, pool_pos, home.to_string(), away.to_string())),
                Err(violation) => {
                    log_checks!(
                        verbosity,
                        "    {} vs {} at {} {}: {}",
                        home,
                        away,
                        slot.date,
                        slot.time,
                        violation
                    );
                }
            }
        }
        None
    }

    /// Undoes the most recent commitment and resumes its slot with the
    /// next untried candidate. Returns false when the stack is empty and
    /// the attempt is spent.
    fn backtrack(
        &mut self,
        stack: &mut Vec<Frame>,
        ledger: &mut Ledger,
        games: &mut Vec<Game>,
        slot_pos: &mut usize,
        cursor: &mut usize,
    ) -> bool {
        while let Some(frame) = stack.pop() {
            let Some(placement) = frame.placement else {
                // Slots left open have no alternatives; keep unwinding.
                continue;
            };
            let slot = self.calendar.ordered()[frame.slot_pos].clone();
            log_debug!(
                self.config.verbosity,
                "  Backtrack: freeing {} {} on {}",
                slot.date,
                slot.time,
                slot.field
            );
            ledger.revert(&placement, &slot);
            self.pool.mark_unplaced(placement.pool_pos);
            games.pop();
            *slot_pos = frame.slot_pos;
            *cursor = frame.cursor;
            return true;
        }
        false
    }

    /// Season-end checks that cannot be enforced incrementally: exact game
    /// totals, the home/away split, and the doubleheader-day floor.
    fn finalize_ok(&self, ledger: &Ledger) -> bool {
        let verbosity = self.config.verbosity;
        for (team, book) in ledger.books() {
            if book.total != self.config.max_games {
                log_checks!(
                    verbosity,
                    "  Finalize: {} has {} of {} games",
                    team,
                    book.total,
                    self.config.max_games
                );
                return false;
            }
            if book.home > self.config.home_away_balance
                || book.away > self.config.home_away_balance
            {
                log_checks!(
                    verbosity,
                    "  Finalize: {} split {}/{} exceeds balance {}",
                    team,
                    book.home,
                    book.away,
                    self.config.home_away_balance
                );
                return false;
            }
            if book.doubleheader_days < self.config.min_doubleheader_days
                || book.doubleheader_days > self.config.max_doubleheader_days
            {
                log_checks!(
                    verbosity,
                    "  Finalize: {} has {} doubleheader days, needs {}..={}",
                    team,
                    book.doubleheader_days,
                    self.config.min_doubleheader_days,
                    self.config.max_doubleheader_days
                );
                return false;
            }
        }
        true
    }
}
