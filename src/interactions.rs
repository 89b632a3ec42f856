//! Interaction accounting: how often each two players share a match, and the
//! checks derived from it. Everything here is recomputed from the schedule on demand.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::roster::Roster;
use crate::schedule::{Pair, Schedule, SlotRef};

/// Counts above this are flagged as too many meetings
pub const MAX_INTERACTIONS: u32 = 2;

/// Shared-match counts keyed by unordered player pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionCounts {
    counts: BTreeMap<(String, String), u32>,
}

fn key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl InteractionCounts {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let mut counts = BTreeMap::new();
        for m in schedule.matches() {
            let names = m.player_names();
            for (i, a) in names.iter().enumerate() {
                for b in &names[i + 1..] {
                    *counts.entry(key(a, b)).or_insert(0) += 1;
                }
            }
        }
        InteractionCounts { counts }
    }

    /// Number of matches both players appear in. Always 0 for a player with themself.
    pub fn get(&self, a: &str, b: &str) -> u32 {
        if a == b {
            return 0;
        }
        self.counts.get(&key(a, b)).copied().unwrap_or(0)
    }

    /// Non-zero counts, each unordered pair once
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.counts.iter().map(|((a, b), c)| (a.as_str(), b.as_str(), *c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImbalanceKind {
    Never,
    TooOften,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Imbalance {
    pub first: String,
    pub second: String,
    pub count: u32,
    pub kind: ImbalanceKind,
}

/// A pair that appears in more than one slot; every slot it sits in is listed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicatePair {
    pub pair: Pair,
    pub slots: Vec<SlotRef>,
}

/// A pair sitting on the other team's side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MisplacedPair {
    pub pair: Pair,
    pub slot: SlotRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub duplicates: Vec<DuplicatePair>,
    pub misplaced: Vec<MisplacedPair>,
    pub imbalances: Vec<Imbalance>,
}

impl ValidationReport {
    /// Duplicates and misplaced pairs are errors; imbalances are advisory
    pub fn has_errors(&self) -> bool {
        !self.duplicates.is_empty() || !self.misplaced.is_empty()
    }

    /// Every slot that should be marked in a grid view
    pub fn flagged_slots(&self) -> Vec<SlotRef> {
        let mut slots: Vec<SlotRef> = self
            .duplicates
            .iter()
            .flat_map(|d| d.slots.iter().copied())
            .chain(self.misplaced.iter().map(|m| m.slot))
            .collect();
        slots.sort();
        slots.dedup();
        slots
    }

    pub fn messages(&self) -> Vec<String> {
        let duplicates = self
            .duplicates
            .iter()
            .map(|d| format!("Pair \"{}\" is assigned multiple times.", d.pair));
        let misplaced = self.misplaced.iter().map(|m| {
            format!(
                "Pair \"{}\" is on the team {} side of round {}, match {}.",
                m.pair, m.slot.side, m.slot.round, m.slot.slot
            )
        });
        duplicates.chain(misplaced).collect()
    }
}

/// Checks a schedule against the roster: repeated pairs, pairs on the wrong side,
/// and player pairs that never meet or meet more than [`MAX_INTERACTIONS`] times.
pub fn validate(schedule: &Schedule, roster: &Roster) -> ValidationReport {
    let mut occurrences: HashMap<&Pair, Vec<SlotRef>> = HashMap::new();
    let mut order: Vec<&Pair> = Vec::new();
    let mut misplaced = Vec::new();

    for (slot, pair) in schedule.placements() {
        let seen = occurrences.entry(pair).or_default();
        if seen.is_empty() {
            order.push(pair);
        }
        seen.push(slot);

        if let Ok(team) = pair.team(roster) {
            if team != slot.side {
                misplaced.push(MisplacedPair {
                    pair: pair.clone(),
                    slot,
                });
            }
        }
    }

    let duplicates = order
        .into_iter()
        .filter_map(|pair| {
            let slots = &occurrences[pair];
            (slots.len() > 1).then(|| DuplicatePair {
                pair: pair.clone(),
                slots: slots.clone(),
            })
        })
        .collect();

    let counts = InteractionCounts::from_schedule(schedule);
    let players = roster.players();
    let mut imbalances = Vec::new();
    for (i, first) in players.iter().enumerate() {
        for second in &players[i + 1..] {
            let count = counts.get(&first.name, &second.name);
            let kind = if count == 0 {
                ImbalanceKind::Never
            } else if count > MAX_INTERACTIONS {
                ImbalanceKind::TooOften
            } else {
                continue;
            };
            imbalances.push(Imbalance {
                first: first.name.clone(),
                second: second.name.clone(),
                count,
                kind,
            });
        }
    }

    ValidationReport {
        duplicates,
        misplaced,
        imbalances,
    }
}

/// Square roster-ordered view of the counts; the diagonal is `None`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionMatrix {
    pub players: Vec<String>,
    pub cells: Vec<Vec<Option<u32>>>,
}

impl InteractionMatrix {
    pub fn new(roster: &Roster, counts: &InteractionCounts) -> Self {
        let players: Vec<String> = roster.players().iter().map(|p| p.name.clone()).collect();
        let cells = players
            .iter()
            .map(|row| {
                players
                    .iter()
                    .map(|col| (row != col).then(|| counts.get(row, col)))
                    .collect()
            })
            .collect();
        InteractionMatrix { players, cells }
    }

    /// True for off-diagonal cells at 0 or above the limit
    pub fn is_flagged(&self, row: usize, col: usize) -> bool {
        matches!(
            self.cells.get(row).and_then(|r| r.get(col)).copied().flatten(),
            Some(count) if count == 0 || count > MAX_INTERACTIONS
        )
    }
}
