pub mod types;
pub mod pairs;
pub mod greedy;
pub mod algorithm;
pub mod editing;

pub use types::{check_dimensions, Match, Pair, Round, Schedule, SlotRef, MAX_SLOTS};
pub use pairs::{generate_pairs, team_pairs};
pub use greedy::{allocate, GreedyOptions};
pub use algorithm::{AlgorithmKind, Greedy, ScheduleAlgorithm, SimulatedAnnealing};
