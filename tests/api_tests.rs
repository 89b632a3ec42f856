//! Integration tests for the HTTP API

use actix_web::{http::StatusCode, test, web, App};
use pair_schedule::web::{configure, AppState};
use pair_schedule::{AppConfig, Roster};
use serde_json::{json, Value};

fn test_state() -> web::Data<AppState> {
    let config = AppConfig {
        seed: Some(7),
        ..AppConfig::default()
    };
    web::Data::new(AppState::new(config, Roster::demo()).unwrap())
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(configure)).await
    };
}

#[actix_web::test]
async fn test_generate_fills_configured_grid() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/schedule/generate")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let rounds = body["schedule"].as_array().unwrap();
    assert_eq!(rounds.len(), 4);
    assert!(rounds.iter().all(|r| r["matches"].as_array().unwrap().len() == 3));

    // The generated schedule becomes the current one
    let req = test::TestRequest::get().uri("/api/schedule").to_request();
    let current: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(current["schedule"], body["schedule"]);
}

#[actix_web::test]
async fn test_generate_rejects_bad_requests() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/schedule/generate")
        .set_json(json!({"algorithm": "hillClimb"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"errorMessage": "Unknown scheduling algorithm: hillClimb"}));

    let req = test::TestRequest::post()
        .uri("/api/schedule/generate")
        .set_json(json!({"numRounds": 0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_duplicate_player_keeps_roster() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/players")
        .set_json(json!([
            {"name": "Dan", "handicap": 3.9, "team": "A"},
            {"name": "Dan", "handicap": "4.1", "team": "B"}
        ]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errorMessage"], "Duplicate player name: \"Dan\"");

    let req = test::TestRequest::get().uri("/api/players").to_request();
    let players: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(players.as_array().unwrap().len(), 12);
}

#[actix_web::test]
async fn test_assign_and_unassign() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/schedule/assign")
        .set_json(json!({"round": 1, "slot": 1, "side": "B", "pair": "Mottram & Dan"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/schedule/assign")
        .set_json(json!({"round": 1, "slot": 1, "side": "A", "pair": "Mottram & Dan"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["displaced"], Value::Null);
    assert_eq!(body["schedule"][0]["matches"][0]["teamA"], "Dan & Mottram");

    let req = test::TestRequest::get().uri("/api/pairs").to_request();
    let pairs: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(pairs["pairs"].as_array().unwrap().len(), 30);
    assert_eq!(pairs["unused"].as_array().unwrap().len(), 29);

    let req = test::TestRequest::post()
        .uri("/api/schedule/unassign")
        .set_json(json!({"round": 1, "slot": 1, "side": "A"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["released"], "Dan & Mottram");
    assert_eq!(body["schedule"][0]["matches"][0]["teamA"], Value::Null);
}

#[actix_web::test]
async fn test_interactions_flag_duplicates_from_uploaded_schedule() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/schedule")
        .set_json(json!({"schedule": [
            {"matches": [{"teamA": "Dan & Mottram", "teamB": "Ioi & Luke"}]},
            {"matches": [{"teamA": "Mottram & Dan", "teamB": null}]}
        ]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/interactions").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body["messages"],
        json!(["Pair \"Dan & Mottram\" is assigned multiple times."])
    );
    assert_eq!(body["flagged_slots"].as_array().unwrap().len(), 2);
    assert_eq!(body["matrix"]["players"].as_array().unwrap().len(), 12);

    let req = test::TestRequest::post().uri("/api/schedule/reset").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["schedule"].as_array().unwrap().len(), 4);
    assert_eq!(body["schedule"][0]["matches"][0]["teamA"], Value::Null);
}

#[actix_web::test]
async fn test_ampersand_in_player_name_is_rejected() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/players")
        .set_json(json!([
            {"name": "Ann", "handicap": 1.0, "team": "A"},
            {"name": "Tom&Jerry", "handicap": 2.0, "team": "A"},
            {"name": "Q1", "handicap": 3.0, "team": "B"},
            {"name": "Q2", "handicap": 4.0, "team": "B"}
        ]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errorMessage"], "Player name \"Tom&Jerry\" cannot contain '&'");

    // Generation still runs against the untouched demo roster
    let req = test::TestRequest::post()
        .uri("/api/schedule/generate")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_oversized_grid_is_rejected() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/schedule/generate")
        .set_json(json!({"numRounds": 100000, "matchesPerRound": 100000}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["errorMessage"],
        "A schedule of 10000000000 matches exceeds the limit of 10000"
    );
}

#[actix_web::test]
async fn test_seeded_randomize_varies_between_presses() {
    async fn press_twice(state: web::Data<AppState>) -> (Value, Value) {
        let app = test_app!(state);
        let mut grids = Vec::new();
        for _ in 0..2 {
            let req = test::TestRequest::post().uri("/api/schedule/randomize").to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            grids.push(body["schedule"].clone());
        }
        let second = grids.pop().unwrap();
        (grids.pop().unwrap(), second)
    }

    let (first, second) = press_twice(test_state()).await;
    assert_ne!(first, second);

    // Same seed, same sequence
    assert_eq!(press_twice(test_state()).await, (first, second));
}
