use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RosterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    /// Parses a team label, accepting surrounding whitespace and lowercase
    pub fn parse(value: &str) -> Option<Team> {
        match value.trim() {
            "A" | "a" => Some(Team::A),
            "B" | "b" => Some(Team::B),
            _ => None,
        }
    }

    pub fn opposite(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::A => write!(f, "A"),
            Team::B => write!(f, "B"),
        }
    }
}

/// A validated player. Identity is by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub handicap: f64,
    pub team: Team,
}

/// Handicap as it arrives from a form or CSV cell, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawHandicap {
    Number(f64),
    Text(String),
}

impl RawHandicap {
    fn parse(&self) -> Option<f64> {
        let value = match self {
            RawHandicap::Number(v) => *v,
            RawHandicap::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        if value.is_finite() && value >= 0.0 {
            Some(value)
        } else {
            None
        }
    }
}

impl fmt::Display for RawHandicap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawHandicap::Number(v) => write!(f, "{}", v),
            RawHandicap::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One row of a roster edit, unvalidated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub name: String,
    pub handicap: RawHandicap,
    pub team: String,
}

impl PlayerInput {
    pub fn new(name: impl Into<String>, handicap: f64, team: impl Into<String>) -> Self {
        PlayerInput {
            name: name.into(),
            handicap: RawHandicap::Number(handicap),
            team: team.into(),
        }
    }
}

impl From<&Player> for PlayerInput {
    fn from(player: &Player) -> Self {
        PlayerInput::new(player.name.clone(), player.handicap, player.team.to_string())
    }
}

/// The live player list. Every mutation goes through [`Roster::replace`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn new() -> Self {
        Roster::default()
    }

    pub fn from_inputs(inputs: &[PlayerInput]) -> Result<Roster, RosterError> {
        Ok(Roster {
            players: validate_players(inputs)?,
        })
    }

    /// Twelve-player roster the application starts with when nothing else is loaded
    pub fn demo() -> Roster {
        let players = [
            ("Mottram", 2.9, Team::A),
            ("Dan", 3.9, Team::A),
            ("Whidden", 4.8, Team::A),
            ("Graham", 6.0, Team::A),
            ("Bails", 8.8, Team::A),
            ("Derek", 11.7, Team::A),
            ("Ioi", 15.2, Team::B),
            ("Luke", 23.0, Team::B),
            ("Geoff", 23.0, Team::B),
            ("Chapete", 24.5, Team::B),
            ("Shane", 30.0, Team::B),
            ("Bendy", 35.0, Team::B),
        ]
        .into_iter()
        .map(|(name, handicap, team)| Player {
            name: name.to_string(),
            handicap,
            team,
        })
        .collect();
        Roster { players }
    }

    /// Validates the whole batch and swaps it in. On error the current roster is kept as is.
    pub fn replace(&mut self, inputs: &[PlayerInput]) -> Result<(), RosterError> {
        let players = validate_players(inputs)?;
        self.players = players;
        Ok(())
    }

    pub fn add(&mut self, input: PlayerInput) -> Result<(), RosterError> {
        let mut inputs = self.to_inputs();
        inputs.push(input);
        self.replace(&inputs)
    }

    pub fn remove(&mut self, name: &str) -> Result<Player, RosterError> {
        let removed = self
            .get(name)
            .cloned()
            .ok_or_else(|| RosterError::NotFound(name.to_string()))?;
        let inputs: Vec<PlayerInput> = self
            .players
            .iter()
            .filter(|p| p.name != name)
            .map(PlayerInput::from)
            .collect();
        self.replace(&inputs)?;
        Ok(removed)
    }

    pub fn to_inputs(&self) -> Vec<PlayerInput> {
        self.players.iter().map(PlayerInput::from).collect()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn team_of(&self, name: &str) -> Option<Team> {
        self.get(name).map(|p| p.team)
    }

    /// Players on one team, in roster order
    pub fn members(&self, team: Team) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(move |p| p.team == team)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Validates a batch of player rows, stopping at the first bad row
pub fn validate_players(inputs: &[PlayerInput]) -> Result<Vec<Player>, RosterError> {
    let mut names = HashSet::new();
    let mut players = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(RosterError::EmptyName { row: index + 1 });
        }
        // '&' separates the two names in a pair label
        if name.contains('&') {
            return Err(RosterError::InvalidName { name });
        }

        let handicap = input.handicap.parse().ok_or_else(|| RosterError::InvalidHandicap {
            name: name.clone(),
            value: input.handicap.to_string(),
        })?;

        if !names.insert(name.clone()) {
            return Err(RosterError::DuplicateName { name });
        }

        let team = Team::parse(&input.team).ok_or_else(|| RosterError::UnknownTeam {
            name: name.clone(),
            team: input.team.clone(),
        })?;

        players.push(Player { name, handicap, team });
    }

    Ok(players)
}
