use std::collections::{HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::ScheduleError;
use crate::roster::{Roster, Team};
use super::types::{Pair, Schedule};

/// Knobs for the greedy allocator
#[derive(Debug, Clone, PartialEq)]
pub struct GreedyOptions {
    /// Sort pairs by the handicap of their first listed player, lowest first
    pub order_by_handicap: bool,
    /// Shuffle pairs before walking the slots
    pub shuffle: bool,
    /// Fixed seed for reproducible runs; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for GreedyOptions {
    fn default() -> Self {
        Self {
            order_by_handicap: false,
            shuffle: true,
            seed: None,
        }
    }
}

impl GreedyOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

struct Candidate {
    pair: Pair,
    team: Team,
    handicap: f64,
}

/// Fills `num_rounds × matches_per_round` slots from `pairs`.
///
/// Slots are walked round by round. Each slot takes the next unused pair and the first
/// later pair from the other team; each goes on its own team's side. When the other team
/// has nothing left that side stays empty, and once the pool runs dry the remaining slots
/// are left fully empty. A pair is never placed twice.
pub fn allocate(
    roster: &Roster,
    pairs: &[Pair],
    num_rounds: u32,
    matches_per_round: u32,
    options: &GreedyOptions,
) -> Result<Schedule, ScheduleError> {
    let mut schedule = Schedule::empty(num_rounds, matches_per_round)?;

    let mut seen = HashSet::new();
    let mut candidates = Vec::with_capacity(pairs.len());
    for pair in pairs {
        if !seen.insert(pair) {
            continue;
        }
        let team = pair.team(roster)?;
        let handicap = roster
            .get(pair.first())
            .map(|p| p.handicap)
            .ok_or_else(|| ScheduleError::UnknownPlayer(pair.first().to_string()))?;
        candidates.push(Candidate {
            pair: pair.clone(),
            team,
            handicap,
        });
    }

    if options.shuffle {
        let mut rng = options.rng();
        candidates.shuffle(&mut rng);
    }
    if options.order_by_handicap {
        // Stable, so a preceding shuffle only reorders equal handicaps
        candidates.sort_by(|a, b| a.handicap.total_cmp(&b.handicap));
    }

    let mut pool: VecDeque<Candidate> = candidates.into();
    let total = pool.len();

    for slot in schedule.matches_mut() {
        let Some(first) = pool.pop_front() else {
            break;
        };
        let opponent_index = pool.iter().position(|c| c.team == first.team.opposite());
        let opponent = opponent_index.and_then(|index| pool.remove(index));

        *slot.side_mut(first.team) = Some(first.pair);
        if let Some(opponent) = opponent {
            *slot.side_mut(opponent.team) = Some(opponent.pair);
        }
    }

    tracing::debug!(
        pairs = total,
        unused = pool.len(),
        slots = schedule.slot_count(),
        incomplete = schedule.incomplete_count(),
        "greedy allocation finished"
    );

    Ok(schedule)
}
