//! Matchup pool bookkeeping.
//!
//! Tracks how many meetings of each required pairing are still unplaced.
//! Iteration order is the generation order on the first attempt; later
//! attempts reshuffle it with an RNG derived purely from (seed, attempt)
//! so every attempt's candidate order is reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::Matchup;

#[derive(Clone, Debug)]
struct PoolEntry {
    matchup: Matchup,
    placed: u32,
}

/// The multiset of required meetings not yet bound to slots.
#[derive(Clone, Debug)]
pub struct MatchupPool {
    entries: Vec<PoolEntry>,
    /// Iteration order over `entries` for the current attempt.
    order: Vec<usize>,
    /// Total meetings still owed across all entries.
    outstanding: u32,
}

impl MatchupPool {
    pub fn new(matchups: Vec<Matchup>) -> Self {
        let outstanding = matchups.iter().map(|m| m.required).sum();
        let order = (0..matchups.len()).collect();
        Self {
            entries: matchups
                .into_iter()
                .map(|matchup| PoolEntry { matchup, placed: 0 })
                .collect(),
            order,
            outstanding,
        }
    }

    /// Number of distinct pairings in the pool.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all_placed(&self) -> bool {
        self.outstanding == 0
    }

    pub fn outstanding(&self) -> u32 {
        self.outstanding
    }

    /// The matchup at iteration position `pos`.
    pub fn at(&self, pos: usize) -> &Matchup {
        &self.entries[self.order[pos]].matchup
    }

    /// Whether the entry at iteration position `pos` still owes a meeting.
    pub fn has_remaining_at(&self, pos: usize) -> bool {
        let entry = &self.entries[self.order[pos]];
        entry.placed < entry.matchup.required
    }

    /// Matchups with meetings still owed, in iteration order.
    pub fn remaining(&self) -> impl Iterator<Item = &Matchup> {
        self.order
            .iter()
            .map(|&i| &self.entries[i])
            .filter(|e| e.placed < e.matchup.required)
            .map(|e| &e.matchup)
    }

    pub fn mark_placed(&mut self, pos: usize) {
        let entry = &mut self.entries[self.order[pos]];
        debug_assert!(entry.placed < entry.matchup.required);
        entry.placed += 1;
        self.outstanding -= 1;
    }

    pub fn mark_unplaced(&mut self, pos: usize) {
        let entry = &mut self.entries[self.order[pos]];
        debug_assert!(entry.placed > 0);
        entry.placed -= 1;
        self.outstanding += 1;
    }

    /// Pairings still owed, with their shortfall counts. Used for
    /// exhaustion diagnostics.
    pub fn remaining_pairings(&self) -> Vec<(String, String, u32)> {
        self.order
            .iter()
            .map(|&i| &self.entries[i])
            .filter(|e| e.placed < e.matchup.required)
            .map(|e| {
                (
                    e.matchup.first.clone(),
                    e.matchup.second.clone(),
                    e.matchup.required - e.placed,
                )
            })
            .collect()
    }

    /// Resets the iteration order for a fresh attempt.
    ///
    /// Attempt 0 keeps generation order; later attempts shuffle with an
    /// RNG seeded only from (seed, attempt), independent of any earlier
    /// attempt's history.
    pub fn reorder_for_attempt(&mut self, attempt: u32, seed: u64) {
        self.order = (0..self.entries.len()).collect();
        if attempt > 0 {
            let mut rng =
                StdRng::seed_from_u64(seed ^ u64::from(attempt).wrapping_mul(0x9E37_79B9_7F4A_7C15));
            self.order.shuffle(&mut rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_of(pairs: &[(&str, &str, u32)]) -> MatchupPool {
        MatchupPool::new(
            pairs
                .iter()
                .map(|(a, b, n)| Matchup::new(*a, *b).with_required(*n))
                .collect(),
        )
    }

    #[test]
    fn test_outstanding_tracks_marks() {
        let mut pool = pool_of(&[("A1", "A2", 2), ("A1", "A3", 1)]);
        assert_eq!(pool.outstanding(), 3);
        assert!(!pool.all_placed());

        pool.mark_placed(0);
        pool.mark_placed(0);
        pool.mark_placed(1);
        assert!(pool.all_placed());
        assert_eq!(pool.remaining().count(), 0);

        pool.mark_unplaced(0);
        assert_eq!(pool.outstanding(), 1);
        assert!(pool.has_remaining_at(0));
        assert!(!pool.has_remaining_at(1));
    }

    #[test]
    fn test_remaining_keeps_generation_order() {
        let pool = pool_of(&[("A1", "A2", 1), ("B1", "B2", 1), ("C1", "C2", 1)]);
        let firsts: Vec<_> = pool.remaining().map(|m| m.first.clone()).collect();
        assert_eq!(firsts, vec!["A1", "B1", "C1"]);
    }

    #[test]
    fn test_attempt_zero_keeps_order() {
        let mut pool = pool_of(&[("A1", "A2", 1), ("B1", "B2", 1), ("C1", "C2", 1)]);
        pool.reorder_for_attempt(0, 42);
        let firsts: Vec<_> = pool.remaining().map(|m| m.first.clone()).collect();
        assert_eq!(firsts, vec!["A1", "B1", "C1"]);
    }

    #[test]
    fn test_reorder_is_deterministic_per_attempt() {
        let pairs: Vec<(String, String)> = (0..16)
            .map(|i| (format!("T{i}"), format!("U{i}")))
            .collect();
        let matchups: Vec<Matchup> = pairs
            .iter()
            .map(|(a, b)| Matchup::new(a.clone(), b.clone()))
            .collect();

        let mut pool_a = MatchupPool::new(matchups.clone());
        let mut pool_b = MatchupPool::new(matchups);
        pool_a.reorder_for_attempt(3, 42);
        pool_b.reorder_for_attempt(3, 42);
        let order_a: Vec<_> = pool_a.remaining().map(|m| m.first.clone()).collect();
        let order_b: Vec<_> = pool_b.remaining().map(|m| m.first.clone()).collect();
        assert_eq!(order_a, order_b);

        // A different attempt produces a different order (with 16 entries
        // an identical shuffle would be astronomically unlikely).
        pool_b.reorder_for_attempt(4, 42);
        let order_c: Vec<_> = pool_b.remaining().map(|m| m.first.clone()).collect();
        assert_ne!(order_a, order_c);
    }

    #[test]
    fn test_remaining_pairings_reports_shortfall() {
        let mut pool = pool_of(&[("A1", "A2", 2), ("B1", "B2", 1)]);
        pool.mark_placed(0);
        assert_eq!(
            pool.remaining_pairings(),
            vec![
                ("A1".to_string(), "A2".to_string(), 1),
                ("B1".to_string(), "B2".to_string(), 1),
            ]
        );
    }
}
