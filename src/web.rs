use std::sync::{Mutex, MutexGuard};

use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::interactions::{validate, InteractionCounts, InteractionMatrix, ValidationReport};
use crate::roster::{Player, PlayerInput, Roster, Team};
use crate::schedule::{generate_pairs, Pair, Schedule, SlotRef};
use crate::worker::{from_wire, to_wire, RoundMessage, ScheduleRequest, ScheduleResponse, ScheduleWorker, WorkerOutcome};

/// Roster and schedule live here for the lifetime of the server
pub struct AppState {
    pub roster: Mutex<Roster>,
    pub schedule: Mutex<Schedule>,
    pub worker: ScheduleWorker,
    pub config: AppConfig,
    /// One generator for the server's lifetime so a fixed seed still varies between presses
    pub rng: Mutex<StdRng>,
}

impl AppState {
    pub fn new(config: AppConfig, roster: Roster) -> std::result::Result<Self, crate::error::ScheduleError> {
        let schedule = Schedule::empty(config.num_rounds, config.matches_per_round)?;
        let worker = ScheduleWorker::new(config.generation_timeout(), config.greedy_options())
            .with_max_slots(config.max_slots);
        let rng = Mutex::new(config.greedy_options().rng());
        Ok(AppState {
            roster: Mutex::new(roster),
            schedule: Mutex::new(schedule),
            worker,
            config,
            rng,
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("state lock poisoned"))
}

fn error_body(message: impl ToString) -> serde_json::Value {
    serde_json::json!({ "errorMessage": message.to_string() })
}

#[derive(Serialize)]
pub struct PairsResponse {
    pairs: Vec<Pair>,
    unused: Vec<Pair>,
}

#[derive(Serialize)]
pub struct InteractionsResponse {
    matrix: InteractionMatrix,
    report: ValidationReport,
    messages: Vec<String>,
    flagged_slots: Vec<SlotRef>,
}

#[derive(Serialize)]
pub struct ScheduleView {
    schedule: Vec<RoundMessage>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    num_rounds: Option<u32>,
    matches_per_round: Option<u32>,
    algorithm: Option<String>,
}

#[derive(Deserialize)]
pub struct AssignRequest {
    round: u32,
    slot: u32,
    side: Team,
    pair: String,
}

#[derive(Deserialize)]
pub struct UnassignRequest {
    round: u32,
    slot: u32,
    side: Team,
}

#[derive(Deserialize)]
pub struct ReplaceScheduleRequest {
    schedule: Vec<RoundMessage>,
}

async fn get_players(state: web::Data<AppState>) -> Result<HttpResponse> {
    let roster = lock(&state.roster)?;
    let players: Vec<Player> = roster.players().to_vec();
    Ok(HttpResponse::Ok().json(players))
}

// All-or-nothing roster replace
async fn put_players(
    body: web::Json<Vec<PlayerInput>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut roster = lock(&state.roster)?;
    match roster.replace(&body) {
        Ok(()) => {
            tracing::info!(players = roster.len(), "roster updated");
            Ok(HttpResponse::Ok().json(roster.players()))
        }
        Err(e) => {
            tracing::warn!("roster update rejected: {}", e);
            Ok(HttpResponse::BadRequest().json(error_body(e)))
        }
    }
}

async fn get_pairs(state: web::Data<AppState>) -> Result<HttpResponse> {
    let roster = lock(&state.roster)?;
    let schedule = lock(&state.schedule)?;
    Ok(HttpResponse::Ok().json(PairsResponse {
        pairs: generate_pairs(&roster),
        unused: schedule.unused_pairs(&roster),
    }))
}

async fn get_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    let schedule = lock(&state.schedule)?;
    Ok(HttpResponse::Ok().json(ScheduleView {
        schedule: to_wire(&schedule),
    }))
}

async fn put_schedule(
    body: web::Json<ReplaceScheduleRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    match from_wire(&body.schedule) {
        Ok(schedule) => {
            let mut current = lock(&state.schedule)?;
            *current = schedule;
            Ok(HttpResponse::Ok().json(ScheduleView {
                schedule: to_wire(&current),
            }))
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(error_body(e))),
    }
}

async fn generate_schedule(
    body: Option<web::Json<GenerateRequest>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    let players = lock(&state.roster)?.to_inputs();
    let request = ScheduleRequest {
        players,
        num_rounds: body.num_rounds.unwrap_or(state.config.num_rounds),
        matches_per_round: body.matches_per_round.unwrap_or(state.config.matches_per_round),
        algorithm: body
            .algorithm
            .unwrap_or_else(|| state.config.algorithm.as_str().to_string()),
    };

    match state.worker.run(request).await {
        WorkerOutcome::Completed(ScheduleResponse::Schedule { schedule }) => {
            let parsed = from_wire(&schedule)
                .map_err(actix_web::error::ErrorInternalServerError)?;
            *lock(&state.schedule)? = parsed;
            Ok(HttpResponse::Ok().json(ScheduleResponse::Schedule { schedule }))
        }
        WorkerOutcome::Completed(error @ ScheduleResponse::Error { .. }) => {
            Ok(HttpResponse::BadRequest().json(error))
        }
        WorkerOutcome::Stale { .. } => Ok(HttpResponse::Conflict()
            .json(error_body("A newer schedule request superseded this one"))),
    }
}

async fn assign_pair(
    body: web::Json<AssignRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let pair = match Pair::parse(&body.pair) {
        Ok(pair) => pair,
        Err(e) => return Ok(HttpResponse::BadRequest().json(error_body(e))),
    };
    let target = SlotRef {
        round: body.round,
        slot: body.slot,
        side: body.side,
    };

    let roster = lock(&state.roster)?;
    let mut schedule = lock(&state.schedule)?;
    match schedule.assign(target, pair, &roster) {
        Ok(displaced) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "displaced": displaced,
            "schedule": to_wire(&schedule),
        }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(error_body(e))),
    }
}

async fn unassign_pair(
    body: web::Json<UnassignRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let target = SlotRef {
        round: body.round,
        slot: body.slot,
        side: body.side,
    };
    let mut schedule = lock(&state.schedule)?;
    match schedule.unassign(target) {
        Ok(pair) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "released": pair,
            "schedule": to_wire(&schedule),
        }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(error_body(e))),
    }
}

async fn randomize_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    let roster = lock(&state.roster)?;
    let mut schedule = lock(&state.schedule)?;
    let mut rng = lock(&state.rng)?;
    schedule.randomize(&roster, &mut *rng);
    Ok(HttpResponse::Ok().json(ScheduleView {
        schedule: to_wire(&schedule),
    }))
}

async fn reset_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    let fresh = Schedule::empty(state.config.num_rounds, state.config.matches_per_round)
        .map_err(actix_web::error::ErrorInternalServerError)?;
    let mut schedule = lock(&state.schedule)?;
    *schedule = fresh;
    Ok(HttpResponse::Ok().json(ScheduleView {
        schedule: to_wire(&schedule),
    }))
}

async fn get_interactions(state: web::Data<AppState>) -> Result<HttpResponse> {
    let roster = lock(&state.roster)?;
    let schedule = lock(&state.schedule)?;
    let counts = InteractionCounts::from_schedule(&schedule);
    let report = validate(&schedule, &roster);
    Ok(HttpResponse::Ok().json(InteractionsResponse {
        matrix: InteractionMatrix::new(&roster, &counts),
        messages: report.messages(),
        flagged_slots: report.flagged_slots(),
        report,
    }))
}

/// Registers every API route; shared by the server and the integration tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/players", web::get().to(get_players))
        .route("/api/players", web::put().to(put_players))
        .route("/api/pairs", web::get().to(get_pairs))
        .route("/api/schedule", web::get().to(get_schedule))
        .route("/api/schedule", web::put().to(put_schedule))
        .route("/api/schedule/generate", web::post().to(generate_schedule))
        .route("/api/schedule/assign", web::post().to(assign_pair))
        .route("/api/schedule/unassign", web::post().to(unassign_pair))
        .route("/api/schedule/randomize", web::post().to(randomize_schedule))
        .route("/api/schedule/reset", web::post().to(reset_schedule))
        .route("/api/interactions", web::get().to(get_interactions));
}

pub async fn start_server(config: AppConfig, roster: Roster) -> std::io::Result<()> {
    let port = config.port;
    let app_state = web::Data::new(
        AppState::new(config, roster)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?,
    );

    tracing::info!("Starting web server on http://0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
