use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::roster::Roster;
use super::greedy::{allocate, GreedyOptions};
use super::pairs::generate_pairs;
use super::types::Schedule;

/// A way of turning a roster into a filled schedule
pub trait ScheduleAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate(
        &self,
        roster: &Roster,
        num_rounds: u32,
        matches_per_round: u32,
    ) -> Result<Schedule, ScheduleError>;
}

/// Greedy slot filling over every within-team pair
#[derive(Debug, Clone, Default)]
pub struct Greedy {
    pub options: GreedyOptions,
}

impl ScheduleAlgorithm for Greedy {
    fn name(&self) -> &'static str {
        AlgorithmKind::Greedy.as_str()
    }

    fn generate(
        &self,
        roster: &Roster,
        num_rounds: u32,
        matches_per_round: u32,
    ) -> Result<Schedule, ScheduleError> {
        let pairs = generate_pairs(roster);
        allocate(roster, &pairs, num_rounds, matches_per_round, &self.options)
    }
}

/// Accepted under its own name but currently produces exactly the greedy schedule.
/// There is no objective function yet to anneal against.
#[derive(Debug, Clone, Default)]
pub struct SimulatedAnnealing {
    greedy: Greedy,
}

impl SimulatedAnnealing {
    pub fn new(options: GreedyOptions) -> Self {
        Self {
            greedy: Greedy { options },
        }
    }
}

impl ScheduleAlgorithm for SimulatedAnnealing {
    fn name(&self) -> &'static str {
        AlgorithmKind::SimulatedAnnealing.as_str()
    }

    fn generate(
        &self,
        roster: &Roster,
        num_rounds: u32,
        matches_per_round: u32,
    ) -> Result<Schedule, ScheduleError> {
        self.greedy.generate(roster, num_rounds, matches_per_round)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlgorithmKind {
    Greedy,
    SimulatedAnnealing,
}

impl AlgorithmKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlgorithmKind::Greedy => "greedy",
            AlgorithmKind::SimulatedAnnealing => "simulatedAnnealing",
        }
    }

    pub fn build(self, options: GreedyOptions) -> Box<dyn ScheduleAlgorithm> {
        match self {
            AlgorithmKind::Greedy => Box::new(Greedy { options }),
            AlgorithmKind::SimulatedAnnealing => Box::new(SimulatedAnnealing::new(options)),
        }
    }
}

impl Default for AlgorithmKind {
    fn default() -> Self {
        AlgorithmKind::Greedy
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmKind {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" => Ok(AlgorithmKind::Greedy),
            "simulatedAnnealing" => Ok(AlgorithmKind::SimulatedAnnealing),
            other => Err(ScheduleError::UnknownAlgorithm(other.to_string())),
        }
    }
}
