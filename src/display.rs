use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;

use crate::interactions::{ImbalanceKind, InteractionMatrix, ValidationReport};
use crate::schedule::{Pair, Schedule};
use crate::worker::ScheduleResponse;

/// Formats one side of a match
pub fn format_side(pair: Option<&Pair>) -> String {
    match pair {
        Some(pair) => pair.to_string(),
        None => "[EMPTY]".to_string(),
    }
}

/// Renders the schedule as `Round N` blocks with one `Match M: A vs B` line per slot
pub fn render_schedule(schedule: &Schedule) -> String {
    let mut out = String::new();
    for (index, round) in schedule.rounds.iter().enumerate() {
        let _ = writeln!(out, "Round {}", index + 1);
        for m in &round.matches {
            let _ = writeln!(
                out,
                "  Match {}: {} vs {}",
                m.slot,
                format_side(m.team_a.as_ref()),
                format_side(m.team_b.as_ref())
            );
        }
    }
    out
}

/// Renders the interaction matrix as an aligned table; `-` on the diagonal, `*` marks flagged cells
pub fn render_matrix(matrix: &InteractionMatrix) -> String {
    let width = matrix
        .players
        .iter()
        .map(|name| name.len())
        .max()
        .unwrap_or(0)
        .max(3);

    let mut out = String::new();
    let _ = write!(out, "{:width$}", "", width = width);
    for name in &matrix.players {
        let _ = write!(out, " {:>width$}", name, width = width);
    }
    out.push('\n');

    for (row, name) in matrix.players.iter().enumerate() {
        let _ = write!(out, "{:width$}", name, width = width);
        for (col, cell) in matrix.cells[row].iter().enumerate() {
            let text = match cell {
                None => "-".to_string(),
                Some(count) if matrix.is_flagged(row, col) => format!("{}*", count),
                Some(count) => count.to_string(),
            };
            let _ = write!(out, " {:>width$}", text, width = width);
        }
        out.push('\n');
    }
    out
}

pub fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    for message in report.messages() {
        let _ = writeln!(out, "ERROR: {}", message);
    }
    let never = report
        .imbalances
        .iter()
        .filter(|i| i.kind == ImbalanceKind::Never)
        .count();
    let too_often = report.imbalances.len() - never;
    let _ = writeln!(
        out,
        "{} player pairs never meet, {} meet more than twice",
        never, too_often
    );
    out
}

/// Prints a schedule, its interaction matrix and validation messages
pub fn print_schedule(title: &str, schedule: &Schedule, matrix: &InteractionMatrix, report: &ValidationReport) {
    println!("\n=== {} ===", title);
    println!(
        "{} rounds x {} matches, {} incomplete",
        schedule.num_rounds(),
        schedule.matches_per_round(),
        schedule.incomplete_count()
    );
    print!("{}", render_schedule(schedule));
    println!("\nInteraction matrix (* = never met or met too often):");
    print!("{}", render_matrix(matrix));
    println!();
    print!("{}", render_report(report));
}

/// Writes a schedule to a text file with a generation timestamp header
pub fn write_schedule_to_file(
    title: &str,
    schedule: &Schedule,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;

    writeln!(file, "** {} **", title)?;
    writeln!(file, "Generated {}", chrono::Local::now().format("%Y-%m-%d %H:%M"))?;
    write!(file, "{}", render_schedule(schedule))?;

    Ok(())
}

/// Writes a worker response, success or error, as pretty JSON
pub fn write_response_json<P: AsRef<std::path::Path>>(
    response: &ScheduleResponse,
    path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, serde_json::to_string_pretty(response)?)?;
    Ok(())
}
