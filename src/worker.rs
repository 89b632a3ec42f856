//! Off-thread schedule generation behind a small message contract.
//!
//! Callers send a [`ScheduleRequest`] and get back a [`ScheduleResponse`] that is
//! either `{ schedule }` or `{ errorMessage }`. Only one request is expected in
//! flight; runs cannot be cancelled, so a result that finishes after a newer
//! request was issued comes back as [`WorkerOutcome::Stale`] for the caller to drop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::roster::{PlayerInput, Roster};
use crate::schedule::{check_dimensions, AlgorithmKind, GreedyOptions, Match, Pair, Round, Schedule, MAX_SLOTS};

fn default_algorithm() -> String {
    AlgorithmKind::Greedy.as_str().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub players: Vec<PlayerInput>,
    pub num_rounds: u32,
    pub matches_per_round: u32,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMessage {
    #[serde(default)]
    pub team_a: Option<String>,
    #[serde(default)]
    pub team_b: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundMessage {
    pub matches: Vec<MatchMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleResponse {
    Schedule {
        schedule: Vec<RoundMessage>,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

impl ScheduleResponse {
    pub fn error(err: &ScheduleError) -> Self {
        ScheduleResponse::Error {
            error_message: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ScheduleResponse::Error { .. })
    }
}

/// Wire form of a schedule: pairs as `"Name1 & Name2"`, empty sides as `null`
pub fn to_wire(schedule: &Schedule) -> Vec<RoundMessage> {
    schedule
        .rounds
        .iter()
        .map(|round| RoundMessage {
            matches: round
                .matches
                .iter()
                .map(|m| MatchMessage {
                    team_a: m.team_a.as_ref().map(Pair::to_string),
                    team_b: m.team_b.as_ref().map(Pair::to_string),
                })
                .collect(),
        })
        .collect()
}

/// Reads rounds from the wire without judging them; duplicates and misplaced pairs
/// are left in for the accounting to flag. Blank labels count as empty sides.
pub fn from_wire(rounds: &[RoundMessage]) -> Result<Schedule, ScheduleError> {
    let parse = |label: &Option<String>| -> Result<Option<Pair>, ScheduleError> {
        match label.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => Pair::parse(text).map(Some),
        }
    };

    let mut schedule = Schedule::default();
    for (r, round) in rounds.iter().enumerate() {
        let mut matches = Vec::with_capacity(round.matches.len());
        for (s, m) in round.matches.iter().enumerate() {
            matches.push(Match {
                round: r as u32 + 1,
                slot: s as u32 + 1,
                team_a: parse(&m.team_a)?,
                team_b: parse(&m.team_b)?,
            });
        }
        schedule.rounds.push(Round { matches });
    }
    Ok(schedule)
}

fn run_request(
    request: &ScheduleRequest,
    options: &GreedyOptions,
    max_slots: u64,
) -> Result<Schedule, ScheduleError> {
    let kind: AlgorithmKind = request.algorithm.parse()?;
    let roster = Roster::from_inputs(&request.players)?;
    check_dimensions(request.num_rounds, request.matches_per_round, max_slots)?;
    kind.build(options.clone())
        .generate(&roster, request.num_rounds, request.matches_per_round)
}

/// Runs one request synchronously on the current thread. Grids over `max_slots` are rejected.
pub fn handle_request(request: &ScheduleRequest, options: &GreedyOptions, max_slots: u64) -> ScheduleResponse {
    match run_request(request, options, max_slots) {
        Ok(schedule) => ScheduleResponse::Schedule {
            schedule: to_wire(&schedule),
        },
        Err(err) => {
            tracing::warn!(algorithm = %request.algorithm, "schedule request rejected: {}", err);
            ScheduleResponse::error(&err)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    Completed(ScheduleResponse),
    /// A newer request was issued while this one ran
    Stale { ticket: u64, latest: u64 },
}

/// Hands requests to tokio's blocking pool with a timeout and tracks which request is newest
#[derive(Debug, Clone)]
pub struct ScheduleWorker {
    latest: Arc<AtomicU64>,
    timeout: Duration,
    options: GreedyOptions,
    max_slots: u64,
}

impl ScheduleWorker {
    pub fn new(timeout: Duration, options: GreedyOptions) -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            timeout,
            options,
            max_slots: MAX_SLOTS,
        }
    }

    pub fn with_max_slots(mut self, max_slots: u64) -> Self {
        self.max_slots = max_slots;
        self
    }

    fn issue_ticket(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    pub async fn run(&self, request: ScheduleRequest) -> WorkerOutcome {
        let ticket = self.issue_ticket();
        self.run_ticketed(ticket, request).await
    }

    async fn run_ticketed(&self, ticket: u64, request: ScheduleRequest) -> WorkerOutcome {
        tracing::info!(
            ticket,
            algorithm = %request.algorithm,
            players = request.players.len(),
            rounds = request.num_rounds,
            matches = request.matches_per_round,
            "generating schedule"
        );

        let options = self.options.clone();
        let max_slots = self.max_slots;
        let task = tokio::task::spawn_blocking(move || handle_request(&request, &options, max_slots));

        let response = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(response)) => response,
            Ok(Err(join_error)) => {
                tracing::error!(ticket, "schedule task failed: {}", join_error);
                ScheduleResponse::error(&ScheduleError::WorkerFailed(join_error.to_string()))
            }
            Err(_) => {
                let millis = self.timeout.as_millis() as u64;
                tracing::warn!(ticket, millis, "schedule generation timed out");
                ScheduleResponse::error(&ScheduleError::TimedOut(millis))
            }
        };

        let latest = self.latest.load(Ordering::SeqCst);
        if latest != ticket {
            tracing::warn!(ticket, latest, "discarding stale schedule result");
            return WorkerOutcome::Stale { ticket, latest };
        }
        WorkerOutcome::Completed(response)
    }
}
