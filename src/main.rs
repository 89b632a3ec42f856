use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pair_schedule::display::{print_schedule, write_response_json, write_schedule_to_file};
use pair_schedule::parser::load_roster;
use pair_schedule::worker::{from_wire, ScheduleRequest, ScheduleResponse, WorkerOutcome};
use pair_schedule::{validate, AppConfig, InteractionCounts, InteractionMatrix, Roster, ScheduleWorker};

#[derive(Parser)]
#[command(name = "pair-schedule")]
#[command(about = "Two-team doubles schedule generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a schedule and print it with its interaction matrix
    Generate {
        /// Roster CSV with name, handicap and team columns
        #[arg(long)]
        roster: Option<PathBuf>,
        #[arg(long)]
        rounds: Option<u32>,
        #[arg(long)]
        matches: Option<u32>,
        #[arg(long)]
        algorithm: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        /// Sort pairs by handicap before filling slots
        #[arg(long)]
        by_handicap: bool,
        #[arg(long, default_value = "schedule.txt")]
        output: String,
        /// Also write the wire-format JSON response here
        #[arg(long)]
        output_json: Option<PathBuf>,
    },
    /// Start the web API
    Web {
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        roster: Option<PathBuf>,
    },
}

fn load_or_demo(path: Option<&Path>) -> Result<Roster, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(load_roster(path)?),
        None => {
            tracing::info!("no roster given, using the demo roster");
            Ok(Roster::demo())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();

    match cli.command {
        Commands::Web { port, roster } => {
            if let Some(port) = port {
                config.port = port;
            }
            let roster = load_or_demo(roster.or_else(|| config.roster_path.clone()).as_deref())?;
            println!("Access the site at http://localhost:{}", config.port);
            pair_schedule::web::start_server(config, roster).await?;
        }
        Commands::Generate {
            roster,
            rounds,
            matches,
            algorithm,
            seed,
            by_handicap,
            output,
            output_json,
        } => {
            if seed.is_some() {
                config.seed = seed;
            }
            config.order_by_handicap |= by_handicap;
            let roster = load_or_demo(roster.or_else(|| config.roster_path.clone()).as_deref())?;
            println!("Loaded {} players", roster.len());

            let request = ScheduleRequest {
                players: roster.to_inputs(),
                num_rounds: rounds.unwrap_or(config.num_rounds),
                matches_per_round: matches.unwrap_or(config.matches_per_round),
                algorithm: algorithm.unwrap_or_else(|| config.algorithm.as_str().to_string()),
            };
            let title = format!("Schedule ({})", request.algorithm);

            let worker = ScheduleWorker::new(config.generation_timeout(), config.greedy_options())
                .with_max_slots(config.max_slots);
            let response = match worker.run(request).await {
                WorkerOutcome::Completed(response) => response,
                WorkerOutcome::Stale { ticket, latest } => {
                    return Err(format!("request {} superseded by {}", ticket, latest).into());
                }
            };

            // Errors are written too, so the JSON file always reflects the last run
            if let Some(path) = &output_json {
                write_response_json(&response, path)?;
                println!("Response saved to {}", path.display());
            }

            let rounds = match &response {
                ScheduleResponse::Schedule { schedule } => schedule,
                ScheduleResponse::Error { error_message } => return Err(error_message.clone().into()),
            };
            let schedule = from_wire(rounds)?;
            let counts = InteractionCounts::from_schedule(&schedule);
            let matrix = InteractionMatrix::new(&roster, &counts);
            let report = validate(&schedule, &roster);

            print_schedule(&title, &schedule, &matrix, &report);

            println!("\n=== Writing Schedule to File ===");
            write_schedule_to_file(&title, &schedule, &output)?;
            println!("Schedule saved to {}", output);
        }
    }

    Ok(())
}
