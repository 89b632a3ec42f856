//! Doubles schedule builder for two teams.
//!
//! Players from Team A and Team B are combined into same-team pairs, and every
//! match puts one Team A pair against one Team B pair. The crate generates a
//! schedule, supports manual edits, and reports how often each two players meet.

pub mod config;
pub mod display;
pub mod error;
pub mod interactions;
pub mod parser;
pub mod roster;
pub mod schedule;
pub mod web;
pub mod worker;

pub use config::AppConfig;
pub use error::{RosterError, ScheduleError};
pub use interactions::{validate, InteractionCounts, InteractionMatrix, ValidationReport};
pub use roster::{Player, PlayerInput, Roster, Team};
pub use schedule::{AlgorithmKind, GreedyOptions, Pair, Schedule, SlotRef};
pub use worker::{ScheduleRequest, ScheduleResponse, ScheduleWorker, WorkerOutcome};
