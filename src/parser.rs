use std::io::Read;
use std::path::Path;

use csv::{Reader, ReaderBuilder};

use crate::error::RosterError;
use crate::roster::{PlayerInput, RawHandicap, Roster};

/// Loads a roster from a CSV file with `name`, `handicap` and `team` columns
pub fn load_roster<P: AsRef<Path>>(csv_path: P) -> Result<Roster, RosterError> {
    let reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .map_err(|e| RosterError::Load(e.to_string()))?;
    read_roster(reader)
}

/// Same as [`load_roster`] but from any reader
pub fn parse_roster<R: Read>(source: R) -> Result<Roster, RosterError> {
    let reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);
    read_roster(reader)
}

fn read_roster<R: Read>(mut reader: Reader<R>) -> Result<Roster, RosterError> {
    let headers = reader
        .headers()
        .map_err(|e| RosterError::Load(e.to_string()))?
        .clone();

    // Find column indices, falling back to name,handicap,team order
    let column = |needle: &str, fallback: usize| {
        headers
            .iter()
            .position(|h| h.to_lowercase().contains(needle))
            .unwrap_or(fallback)
    };
    let name_col = column("name", 0);
    let handicap_col = column("handicap", 1);
    let team_col = column("team", 2);

    let mut inputs = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| RosterError::Load(e.to_string()))?;

        // Skip blank lines
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        inputs.push(PlayerInput {
            name: record.get(name_col).unwrap_or("").to_string(),
            handicap: RawHandicap::Text(record.get(handicap_col).unwrap_or("").to_string()),
            team: record.get(team_col).unwrap_or("").to_string(),
        });
    }

    let roster = Roster::from_inputs(&inputs)?;
    tracing::info!(players = roster.len(), "loaded roster");
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Team;
    use std::io::Write;

    #[test]
    fn test_parse_roster_by_header_names() {
        let csv = "Team,Player Name,Handicap\nA,Mottram,2.9\nB, Ioi ,15.2\n,,\n";
        let roster = parse_roster(csv.as_bytes()).unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.players()[1].name, "Ioi");
        assert_eq!(roster.players()[1].team, Team::B);
        assert_eq!(roster.players()[0].handicap, 2.9);
    }

    #[test]
    fn test_parse_roster_rejects_bad_rows() {
        let csv = "name,handicap,team\nDan,3.9,A\nDan,4.0,B\n";
        assert_eq!(
            parse_roster(csv.as_bytes()),
            Err(RosterError::DuplicateName { name: "Dan".to_string() })
        );

        let csv = "name,handicap,team\nDan,low,A\n";
        assert!(matches!(
            parse_roster(csv.as_bytes()),
            Err(RosterError::InvalidHandicap { .. })
        ));
    }

    #[test]
    fn test_load_roster_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,handicap,team").unwrap();
        writeln!(file, "P1,1,A").unwrap();
        writeln!(file, "Q1,2,B").unwrap();
        file.flush().unwrap();

        let roster = load_roster(file.path()).unwrap();
        assert_eq!(roster.len(), 2);

        assert!(matches!(
            load_roster("/definitely/not/here.csv"),
            Err(RosterError::Load(_))
        ));
    }
}
