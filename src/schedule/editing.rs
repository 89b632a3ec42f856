use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::ScheduleError;
use crate::roster::{Roster, Team};
use super::pairs::{generate_pairs, team_pairs};
use super::types::{Pair, Schedule, SlotRef};

impl Schedule {
    /// Places `pair` into `target`, taking it out of whatever slot held it before.
    /// Returns the pair that was sitting in `target`, which goes back to the pool.
    pub fn assign(
        &mut self,
        target: SlotRef,
        pair: Pair,
        roster: &Roster,
    ) -> Result<Option<Pair>, ScheduleError> {
        let team = pair.team(roster)?;
        if team != target.side {
            return Err(ScheduleError::WrongSide {
                pair: pair.to_string(),
                side: target.side.to_string(),
            });
        }
        if self.match_at(target.round, target.slot).is_none() {
            return Err(ScheduleError::SlotOutOfRange {
                round: target.round,
                slot: target.slot,
            });
        }

        self.release(&pair);

        let side = self
            .match_at_mut(target.round, target.slot)
            .map(|m| m.side_mut(target.side))
            .ok_or(ScheduleError::SlotOutOfRange {
                round: target.round,
                slot: target.slot,
            })?;
        Ok(side.replace(pair))
    }

    /// Empties one side of a match and hands back the pair that was there
    pub fn unassign(&mut self, target: SlotRef) -> Result<Pair, ScheduleError> {
        let m = self
            .match_at_mut(target.round, target.slot)
            .ok_or(ScheduleError::SlotOutOfRange {
                round: target.round,
                slot: target.slot,
            })?;
        m.side_mut(target.side).take().ok_or(ScheduleError::EmptySlot {
            round: target.round,
            slot: target.slot,
            side: target.side.to_string(),
        })
    }

    /// Clears every slot, keeping the grid size
    pub fn clear(&mut self) {
        for m in self.matches_mut() {
            m.team_a = None;
            m.team_b = None;
        }
    }

    /// Pairs of the current roster that are not placed anywhere
    pub fn unused_pairs(&self, roster: &Roster) -> Vec<Pair> {
        let placed: HashSet<&Pair> = self.placements().map(|(_, pair)| pair).collect();
        generate_pairs(roster)
            .into_iter()
            .filter(|pair| !placed.contains(pair))
            .collect()
    }

    /// Refills the grid at random: shuffled Team A pairs go down the A sides, Team B pairs down the B sides
    pub fn randomize<R: Rng + ?Sized>(&mut self, roster: &Roster, rng: &mut R) {
        self.clear();

        let mut a_pairs = team_pairs(roster, Team::A);
        let mut b_pairs = team_pairs(roster, Team::B);
        a_pairs.shuffle(rng);
        b_pairs.shuffle(rng);

        let mut a_pairs = a_pairs.into_iter();
        let mut b_pairs = b_pairs.into_iter();
        for m in self.matches_mut() {
            m.team_a = a_pairs.next();
            m.team_b = b_pairs.next();
        }
    }

    fn release(&mut self, pair: &Pair) {
        for m in self.matches_mut() {
            if m.team_a.as_ref() == Some(pair) {
                m.team_a = None;
            }
            if m.team_b.as_ref() == Some(pair) {
                m.team_b = None;
            }
        }
    }
}
