use thiserror::Error;

/// Reasons a roster edit is rejected. The roster is left untouched when any of these is returned.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RosterError {
    #[error("Player name cannot be empty (row {row})")]
    EmptyName { row: usize },
    #[error("Player name \"{name}\" cannot contain '&'")]
    InvalidName { name: String },
    #[error("Invalid handicap for player \"{name}\": {value}")]
    InvalidHandicap { name: String, value: String },
    #[error("Duplicate player name: \"{name}\"")]
    DuplicateName { name: String },
    #[error("Unknown team \"{team}\" for player \"{name}\"")]
    UnknownTeam { name: String, team: String },
    #[error("No player named \"{0}\"")]
    NotFound(String),
    #[error("Failed to read roster: {0}")]
    Load(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScheduleError {
    #[error("Unknown scheduling algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("Number of rounds and matches per round must both be greater than zero")]
    InvalidDimensions,
    #[error("A schedule of {requested} matches exceeds the limit of {max}")]
    TooManySlots { requested: u64, max: u64 },
    #[error("Pair references unknown player \"{0}\"")]
    UnknownPlayer(String),
    #[error("Malformed pair \"{0}\"")]
    MalformedPair(String),
    #[error("Cannot assign pair \"{pair}\" to team {side} slot")]
    WrongSide { pair: String, side: String },
    #[error("Round {round}, match {slot} does not exist")]
    SlotOutOfRange { round: u32, slot: u32 },
    #[error("Round {round}, match {slot} has no pair on team {side}")]
    EmptySlot { round: u32, slot: u32, side: String },
    #[error("Schedule generation timed out after {0} ms")]
    TimedOut(u64),
    #[error("Schedule worker failed: {0}")]
    WorkerFailed(String),
    #[error(transparent)]
    Roster(#[from] RosterError),
}
