use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::roster::{Roster, Team};

/// Hard ceiling on `num_rounds × matches_per_round` for any generated grid
pub const MAX_SLOTS: u64 = 10_000;

/// Two players from the same team, stored with names sorted so each pair has one form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pair {
    first: String,
    second: String,
}

impl Pair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Pair {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Pair { first: a, second: b }
        } else {
            Pair { first: b, second: a }
        }
    }

    /// Parses the `"Name1 & Name2"` form
    pub fn parse(label: &str) -> Result<Pair, ScheduleError> {
        let names: Vec<&str> = label.split('&').map(str::trim).collect();
        match names.as_slice() {
            [a, b] if !a.is_empty() && !b.is_empty() && a != b => Ok(Pair::new(*a, *b)),
            _ => Err(ScheduleError::MalformedPair(label.to_string())),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn names(&self) -> [&str; 2] {
        [&self.first, &self.second]
    }

    /// Team both players belong to. Fails when a player is missing or the players are split across teams.
    pub fn team(&self, roster: &Roster) -> Result<Team, ScheduleError> {
        let first = roster
            .team_of(&self.first)
            .ok_or_else(|| ScheduleError::UnknownPlayer(self.first.clone()))?;
        let second = roster
            .team_of(&self.second)
            .ok_or_else(|| ScheduleError::UnknownPlayer(self.second.clone()))?;
        if first != second {
            return Err(ScheduleError::MalformedPair(self.to_string()));
        }
        Ok(first)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} & {}", self.first, self.second)
    }
}

impl From<Pair> for String {
    fn from(pair: Pair) -> String {
        pair.to_string()
    }
}

impl TryFrom<String> for Pair {
    type Error = ScheduleError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Pair::parse(&label)
    }
}

/// Points at one side of one match. Round and slot are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotRef {
    pub round: u32,
    pub slot: u32,
    pub side: Team,
}

/// One Team A pair against one Team B pair; either side may be unfilled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub round: u32,
    pub slot: u32,
    pub team_a: Option<Pair>,
    pub team_b: Option<Pair>,
}

impl Match {
    pub fn empty(round: u32, slot: u32) -> Match {
        Match {
            round,
            slot,
            team_a: None,
            team_b: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.team_a.is_some() && self.team_b.is_some()
    }

    pub fn side_mut(&mut self, side: Team) -> &mut Option<Pair> {
        match side {
            Team::A => &mut self.team_a,
            Team::B => &mut self.team_b,
        }
    }

    /// Filled sides with their slot reference
    pub fn placements(&self) -> impl Iterator<Item = (SlotRef, &Pair)> {
        let (round, slot) = (self.round, self.slot);
        [(Team::A, &self.team_a), (Team::B, &self.team_b)]
            .into_iter()
            .filter_map(move |(side, pair)| pair.as_ref().map(|p| (SlotRef { round, slot, side }, p)))
    }

    /// Distinct player names across both sides
    pub fn player_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(4);
        for pair in [&self.team_a, &self.team_b].into_iter().flatten() {
            for name in pair.names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub matches: Vec<Match>,
}

/// Rounds of matches, round-major
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub rounds: Vec<Round>,
}

impl Schedule {
    /// Grid of `num_rounds × matches_per_round` unfilled matches
    pub fn empty(num_rounds: u32, matches_per_round: u32) -> Result<Schedule, ScheduleError> {
        check_dimensions(num_rounds, matches_per_round, MAX_SLOTS)?;
        let rounds = (1..=num_rounds)
            .map(|round| Round {
                matches: (1..=matches_per_round).map(|slot| Match::empty(round, slot)).collect(),
            })
            .collect();
        Ok(Schedule { rounds })
    }

    pub fn num_rounds(&self) -> u32 {
        self.rounds.len() as u32
    }

    /// Widest round; rounds taken from outside may be ragged
    pub fn matches_per_round(&self) -> u32 {
        self.rounds.iter().map(|r| r.matches.len()).max().unwrap_or(0) as u32
    }

    pub fn slot_count(&self) -> usize {
        self.rounds.iter().map(|r| r.matches.len()).sum()
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.rounds.iter().flat_map(|r| r.matches.iter())
    }

    pub fn matches_mut(&mut self) -> impl Iterator<Item = &mut Match> {
        self.rounds.iter_mut().flat_map(|r| r.matches.iter_mut())
    }

    pub fn match_at(&self, round: u32, slot: u32) -> Option<&Match> {
        let round_index = (round as usize).checked_sub(1)?;
        let slot_index = (slot as usize).checked_sub(1)?;
        self.rounds.get(round_index)?.matches.get(slot_index)
    }

    pub fn match_at_mut(&mut self, round: u32, slot: u32) -> Option<&mut Match> {
        let round_index = (round as usize).checked_sub(1)?;
        let slot_index = (slot as usize).checked_sub(1)?;
        self.rounds.get_mut(round_index)?.matches.get_mut(slot_index)
    }

    /// Every filled side in schedule order
    pub fn placements(&self) -> impl Iterator<Item = (SlotRef, &Pair)> {
        self.matches().flat_map(|m| m.placements())
    }

    pub fn incomplete_count(&self) -> usize {
        self.matches().filter(|m| !m.is_complete()).count()
    }
}

/// Rejects zero-sized grids and grids with more than `max_slots` matches
pub fn check_dimensions(num_rounds: u32, matches_per_round: u32, max_slots: u64) -> Result<(), ScheduleError> {
    if num_rounds == 0 || matches_per_round == 0 {
        return Err(ScheduleError::InvalidDimensions);
    }
    let requested = u64::from(num_rounds) * u64::from(matches_per_round);
    let max = max_slots.min(MAX_SLOTS);
    if requested > max {
        return Err(ScheduleError::TooManySlots { requested, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::PlayerInput;

    #[test]
    fn test_pair_is_canonical() {
        assert_eq!(Pair::new("P2", "P1"), Pair::new("P1", "P2"));
        assert_eq!(Pair::new("P2", "P1").to_string(), "P1 & P2");
        assert_eq!(Pair::parse(" P2 &P1 ").unwrap(), Pair::new("P1", "P2"));
    }

    #[test]
    fn test_pair_parse_rejects_malformed_labels() {
        for label in ["P1", "P1 & ", "P1 & P1", "P1 & P2 & P3", ""] {
            assert!(Pair::parse(label).is_err(), "{label:?} should not parse");
        }
    }

    #[test]
    fn test_pair_team_lookup() {
        let roster = Roster::from_inputs(&[
            PlayerInput::new("P1", 1.0, "A"),
            PlayerInput::new("P2", 2.0, "A"),
            PlayerInput::new("Q1", 3.0, "B"),
        ])
        .unwrap();

        assert_eq!(Pair::new("P1", "P2").team(&roster), Ok(Team::A));
        assert_eq!(
            Pair::new("P1", "Zed").team(&roster),
            Err(ScheduleError::UnknownPlayer("Zed".to_string()))
        );
        assert!(matches!(
            Pair::new("P1", "Q1").team(&roster),
            Err(ScheduleError::MalformedPair(_))
        ));
    }

    #[test]
    fn test_pair_serializes_as_label() {
        let json = serde_json::to_string(&Pair::new("Dan", "Bails")).unwrap();
        assert_eq!(json, "\"Bails & Dan\"");
        let back: Pair = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Pair::new("Bails", "Dan"));
        assert!(serde_json::from_str::<Pair>("\"Dan\"").is_err());
    }

    #[test]
    fn test_empty_schedule_dimensions() {
        let schedule = Schedule::empty(3, 2).unwrap();
        assert_eq!(schedule.num_rounds(), 3);
        assert_eq!(schedule.matches_per_round(), 2);
        assert_eq!(schedule.slot_count(), 6);
        assert_eq!(schedule.incomplete_count(), 6);

        let last = schedule.match_at(3, 2).unwrap();
        assert_eq!((last.round, last.slot), (3, 2));
        assert!(schedule.match_at(0, 1).is_none());
        assert!(schedule.match_at(4, 1).is_none());

        assert_eq!(Schedule::empty(0, 2), Err(ScheduleError::InvalidDimensions));
        assert_eq!(Schedule::empty(2, 0), Err(ScheduleError::InvalidDimensions));
    }

    #[test]
    fn test_oversized_grid_is_rejected_before_allocating() {
        assert_eq!(
            Schedule::empty(100_000, 100_000),
            Err(ScheduleError::TooManySlots { requested: 10_000_000_000, max: MAX_SLOTS })
        );
        assert!(Schedule::empty(100, 100).is_ok());

        assert_eq!(
            check_dimensions(10, 10, 50),
            Err(ScheduleError::TooManySlots { requested: 100, max: 50 })
        );
        // A configured limit never raises the ceiling
        assert!(matches!(
            check_dimensions(200, 100, u64::MAX),
            Err(ScheduleError::TooManySlots { max: MAX_SLOTS, .. })
        ));
    }

    #[test]
    fn test_match_player_names_are_distinct() {
        let mut m = Match::empty(1, 1);
        m.team_a = Some(Pair::new("P1", "P2"));
        m.team_b = Some(Pair::new("P2", "Q1"));
        assert_eq!(m.player_names(), vec!["P1", "P2", "Q1"]);
        assert_eq!(m.placements().count(), 2);
    }
}
