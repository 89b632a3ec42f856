use itertools::Itertools;

use crate::roster::{Roster, Team};
use super::types::Pair;

/// All two-player combinations within each team, Team A pairs first.
/// Order follows the roster: for players i < j of a team the pair (i, j) comes before (i, j+1).
pub fn generate_pairs(roster: &Roster) -> Vec<Pair> {
    [Team::A, Team::B]
        .into_iter()
        .flat_map(|team| team_pairs(roster, team))
        .collect()
}

/// Combinations for a single team; empty when the team has fewer than two players
pub fn team_pairs(roster: &Roster, team: Team) -> Vec<Pair> {
    roster
        .members(team)
        .map(|p| p.name.as_str())
        .combinations(2)
        .map(|names| Pair::new(names[0], names[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::PlayerInput;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn roster(a: usize, b: usize) -> Roster {
        let inputs: Vec<PlayerInput> = (1..=a)
            .map(|i| PlayerInput::new(format!("P{i}"), i as f64, "A"))
            .chain((1..=b).map(|i| PlayerInput::new(format!("Q{i}"), i as f64, "B")))
            .collect();
        Roster::from_inputs(&inputs).unwrap()
    }

    #[test]
    fn test_four_by_two_roster() {
        let pairs = generate_pairs(&roster(4, 2));
        let labels: Vec<String> = pairs.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "P1 & P2", "P1 & P3", "P1 & P4", "P2 & P3", "P2 & P4", "P3 & P4", "Q1 & Q2",
            ]
        );
    }

    #[test]
    fn test_small_teams_yield_no_pairs() {
        assert!(generate_pairs(&roster(1, 1)).is_empty());
        assert!(generate_pairs(&roster(0, 0)).is_empty());
        assert_eq!(team_pairs(&roster(3, 1), Team::B), Vec::<Pair>::new());
    }

    #[test]
    fn test_team_groups_follow_roster_order_not_team_order() {
        let roster = Roster::from_inputs(&[
            PlayerInput::new("Zed", 1.0, "B"),
            PlayerInput::new("Amy", 1.0, "A"),
            PlayerInput::new("Yan", 1.0, "B"),
            PlayerInput::new("Bob", 1.0, "A"),
        ])
        .unwrap();
        let pairs = generate_pairs(&roster);
        assert_eq!(pairs, vec![Pair::new("Amy", "Bob"), Pair::new("Yan", "Zed")]);
    }

    proptest! {
        #[test]
        fn prop_pair_count_and_team_purity(a in 0usize..9, b in 0usize..9) {
            let roster = roster(a, b);
            let pairs = generate_pairs(&roster);

            prop_assert_eq!(pairs.len(), a * a.saturating_sub(1) / 2 + b * b.saturating_sub(1) / 2);

            let unique: HashSet<&Pair> = pairs.iter().collect();
            prop_assert_eq!(unique.len(), pairs.len());

            for pair in &pairs {
                prop_assert!(pair.team(&roster).is_ok());
            }
        }
    }
}
