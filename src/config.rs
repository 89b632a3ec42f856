use std::path::PathBuf;
use std::time::Duration;

use crate::schedule::{AlgorithmKind, GreedyOptions, MAX_SLOTS};

/// Application configuration
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub num_rounds: u32,
    pub matches_per_round: u32,
    pub algorithm: AlgorithmKind,
    /// Upper bound on a single generation run
    pub generation_timeout_ms: u64,
    /// Largest `rounds × matches` a request may ask for; capped at [`MAX_SLOTS`]
    pub max_slots: u64,
    /// Sort pairs by handicap before filling slots
    pub order_by_handicap: bool,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
    /// Roster CSV to start from; the demo roster is used when unset
    pub roster_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            num_rounds: 4,
            matches_per_round: 3,
            algorithm: AlgorithmKind::Greedy,
            generation_timeout_ms: 5_000,
            max_slots: MAX_SLOTS,
            order_by_handicap: false,
            seed: None,
            roster_path: None,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `PAIR_SCHEDULE_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable values are ignored and the default is kept
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let parsed = |key: &str| lookup(key).map(|v| v.trim().to_string());

        if let Some(port) = parsed("PAIR_SCHEDULE_PORT").and_then(|v| v.parse().ok()) {
            config.port = port;
        }
        if let Some(rounds) = parsed("PAIR_SCHEDULE_ROUNDS").and_then(|v| v.parse().ok()) {
            config.num_rounds = rounds;
        }
        if let Some(matches) = parsed("PAIR_SCHEDULE_MATCHES").and_then(|v| v.parse().ok()) {
            config.matches_per_round = matches;
        }
        if let Some(algorithm) = parsed("PAIR_SCHEDULE_ALGORITHM").and_then(|v| v.parse().ok()) {
            config.algorithm = algorithm;
        }
        if let Some(timeout) = parsed("PAIR_SCHEDULE_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            config.generation_timeout_ms = timeout;
        }
        if let Some(max) = parsed("PAIR_SCHEDULE_MAX_SLOTS").and_then(|v| v.parse::<u64>().ok()) {
            config.max_slots = max.min(MAX_SLOTS);
        }
        if let Some(seed) = parsed("PAIR_SCHEDULE_SEED").and_then(|v| v.parse().ok()) {
            config.seed = Some(seed);
        }
        if let Some(path) = parsed("PAIR_SCHEDULE_ROSTER").filter(|v| !v.is_empty()) {
            config.roster_path = Some(PathBuf::from(path));
        }
        config
    }

    pub fn greedy_options(&self) -> GreedyOptions {
        GreedyOptions {
            order_by_handicap: self.order_by_handicap,
            shuffle: true,
            seed: self.seed,
        }
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!((config.num_rounds, config.matches_per_round), (4, 3));
        assert_eq!(config.generation_timeout(), Duration::from_secs(5));
        assert!(config.greedy_options().shuffle);
        assert_eq!(config.max_slots, MAX_SLOTS);
    }

    #[test]
    fn test_lookup_overrides_and_ignores_garbage() {
        let env: HashMap<&str, &str> = [
            ("PAIR_SCHEDULE_PORT", "9000"),
            ("PAIR_SCHEDULE_ROUNDS", " 6 "),
            ("PAIR_SCHEDULE_MATCHES", "lots"),
            ("PAIR_SCHEDULE_ALGORITHM", "simulatedAnnealing"),
            ("PAIR_SCHEDULE_SEED", "17"),
            ("PAIR_SCHEDULE_MAX_SLOTS", "99999999"),
            ("PAIR_SCHEDULE_ROSTER", "players.csv"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.port, 9000);
        assert_eq!(config.num_rounds, 6);
        assert_eq!(config.matches_per_round, 3);
        assert_eq!(config.algorithm, AlgorithmKind::SimulatedAnnealing);
        assert_eq!(config.greedy_options().seed, Some(17));
        assert_eq!(config.max_slots, MAX_SLOTS);
        assert_eq!(config.roster_path, Some(PathBuf::from("players.csv")));
    }
}
