//! Round-robin matchup construction for a division.
//!
//! Builds the pool of required pairings the solver consumes. Two shapes
//! cover league play: a plain double round-robin, and a weighted variant
//! where each team meets a fixed number of opponents twice and the rest
//! three times, assigned by a small backtracking search so the totals
//! work out for every team.

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::models::Matchup;

/// Errors that can occur while building a matchup pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchupError {
    /// Fewer than two teams to pair.
    NotEnoughTeams,
    /// No 2-vs-3 meeting split satisfies the per-team target.
    NoValidWeightAssignment,
}

impl std::fmt::Display for MatchupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotEnoughTeams => write!(f, "need at least two teams to build matchups"),
            Self::NoValidWeightAssignment => {
                write!(f, "no valid two-meeting assignment for these teams")
            }
        }
    }
}

impl std::error::Error for MatchupError {}

/// All unordered pairs of the given teams, in sorted order.
pub fn round_robin_pairs(teams: &[String]) -> Vec<(String, String)> {
    let mut sorted = teams.to_vec();
    sorted.sort();
    let mut pairs = Vec::with_capacity(sorted.len() * (sorted.len().saturating_sub(1)) / 2);
    for i in 0..sorted.len() {
        for j in (i + 1)..sorted.len() {
            pairs.push((sorted[i].clone(), sorted[j].clone()));
        }
    }
    pairs
}

/// Every pairing twice. Each team plays `2 * (n - 1)` games.
pub fn double_round_robin(teams: &[String]) -> Result<Vec<Matchup>, MatchupError> {
    if teams.len() < 2 {
        return Err(MatchupError::NotEnoughTeams);
    }
    Ok(round_robin_pairs(teams)
        .into_iter()
        .map(|(first, second)| Matchup::new(first, second).with_required(2))
        .collect())
}

/// Assigns 2 or 3 meetings to every pairing so that each team has exactly
/// `two_meeting_count` opponents it meets twice; all other opponents are
/// met three times. Each team plays
/// `2 * two_meeting_count + 3 * (n - 1 - two_meeting_count)` games.
///
/// The orientation of each pairing's odd third meeting is decided by the
/// caller's RNG, matching how balanced pools are seeded elsewhere.
pub fn weighted_round_robin<R: Rng>(
    teams: &[String],
    two_meeting_count: u32,
    rng: &mut R,
) -> Result<Vec<Matchup>, MatchupError> {
    if teams.len() < 2 {
        return Err(MatchupError::NotEnoughTeams);
    }
    if two_meeting_count as usize > teams.len() - 1 {
        return Err(MatchupError::NoValidWeightAssignment);
    }

    let pairs = round_robin_pairs(teams);
    let mut sorted = teams.to_vec();
    sorted.sort();
    let index: FxHashMap<&str, usize> = sorted
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut two_counts = vec![0u32; sorted.len()];
    let mut weights = vec![3u32; pairs.len()];
    if !assign_weights(&pairs, &index, 0, two_meeting_count, &mut two_counts, &mut weights) {
        return Err(MatchupError::NoValidWeightAssignment);
    }

    Ok(pairs
        .into_iter()
        .zip(weights)
        .map(|((first, second), required)| {
            // Flip odd-count pairings at random so third meetings don't
            // all favor the lexicographically first team.
            if required % 2 == 1 && rng.random_bool(0.5) {
                Matchup::new(second, first).with_required(required)
            } else {
                Matchup::new(first, second).with_required(required)
            }
        })
        .collect())
}

/// Backtracks over pairs in order, trying weight 2 where both teams still
/// need two-meeting opponents, then weight 3.
fn assign_weights(
    pairs: &[(String, String)],
    index: &FxHashMap<&str, usize>,
    pos: usize,
    target: u32,
    two_counts: &mut Vec<u32>,
    weights: &mut Vec<u32>,
) -> bool {
    if pos == pairs.len() {
        return two_counts.iter().all(|&c| c == target);
    }
    let (a, b) = (&pairs[pos].0, &pairs[pos].1);
    let (ia, ib) = (index[a.as_str()], index[b.as_str()]);

    if two_counts[ia] < target && two_counts[ib] < target {
        weights[pos] = 2;
        two_counts[ia] += 1;
        two_counts[ib] += 1;
        if assign_weights(pairs, index, pos + 1, target, two_counts, weights) {
            return true;
        }
        two_counts[ia] -= 1;
        two_counts[ib] -= 1;
    }

    weights[pos] = 3;
    assign_weights(pairs, index, pos + 1, target, two_counts, weights)
}

/// Shuffles generation order with the caller's RNG.
pub fn shuffled<R: Rng>(mut matchups: Vec<Matchup>, rng: &mut R) -> Vec<Matchup> {
    use rand::seq::SliceRandom;
    matchups.shuffle(rng);
    matchups
}
