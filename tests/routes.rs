mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{FakeProvider, premier_league};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::util::ServiceExt;

use football_stats_api::api::{AppState, build_router};
use football_stats_api::config::Config;
use football_stats_api::service::StatsService;

fn app(provider: FakeProvider) -> axum::Router {
    let service = StatsService::new(Arc::new(provider), Config::for_tests());
    build_router(AppState {
        service: Arc::new(service),
    })
}

async fn read_json(resp: axum::response::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(resp).await
}

async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(resp).await
}

#[tokio::test]
async fn root_lists_routes() {
    let (status, json) = get_json(app(FakeProvider::new()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["routes"].as_array().unwrap().len() >= 8);
}

#[tokio::test]
async fn standings_cover_all_leagues() {
    let provider = FakeProvider::new().fixture(
        "standings",
        &[("league", "39"), ("season", "2023")],
        "standings_premier_league.json",
    );
    let (status, json) = get_json(app(provider), "/standings").await;
    assert_eq!(status, StatusCode::OK);

    let leagues = json.as_object().unwrap();
    let mut names: Vec<&str> = leagues.keys().map(String::as_str).collect();
    names.sort();
    assert_eq!(names, vec!["Bundesliga", "LaLiga", "Premier League", "SerieA"]);
    for rows in leagues.values() {
        assert!(rows.as_array().unwrap().len() <= 20);
    }
    assert_eq!(json["Premier League"][1]["name"], "Arsenal");
    assert_eq!(json["Premier League"][1]["points"], 89);
    assert_eq!(json["LaLiga"], json!([]));
}

#[tokio::test]
async fn recent_matches_report_each_team() {
    let (status, json) = post_json(
        app(premier_league()),
        "/teams/recent",
        json!({"team_1": "Arsenal", "team_2": "Chelsea", "league": "Premier League", "matches_number": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let arsenal = json["Arsenal"].as_array().expect("arsenal records");
    assert_eq!(arsenal.len(), 2);
    assert_eq!(arsenal[0]["result"], "W");
    assert_eq!(arsenal[0]["stats"]["ball_possession"], "64%");
    assert_eq!(json["Chelsea"]["error_code"], 502);
    assert!(json["Chelsea"]["message"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn unresolved_player_returns_not_found_body() {
    let (status, json) = post_json(
        app(premier_league()),
        "/players/stats",
        json!({"player_name": "Thierry Henry", "team_name": "Arsenal", "league_name": "Premier League"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error_code"], 404);
    assert!(json["message"].as_str().unwrap().contains("Thierry Henry"));
}

#[tokio::test]
async fn goalkeeper_stats_omit_scoring_fields() {
    let provider = premier_league().fixture(
        "players",
        &[("id", "19465"), ("season", "2023"), ("league", "39")],
        "player_raya_2023.json",
    );
    let (status, json) = post_json(
        app(provider),
        "/players/stats",
        json!({"player_name": "David Raya", "team_name": "Arsenal", "league_name": "Premier League"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["position"], "Goalkeeper");
    assert_eq!(json["stats"]["role"], "goalkeeper");
    assert_eq!(json["stats"]["goals"]["saves"], 64);
    assert!(json["stats"]["goals"].get("assists").is_none());
    assert!(json["stats"].get("shots").is_none());
}

#[tokio::test]
async fn season_override_reaches_provider() {
    let provider = premier_league()
        .fixture("teams", &[("league", "39"), ("season", "2022")], "teams_premier_league.json")
        .fixture(
            "players",
            &[("id", "19465"), ("season", "2022"), ("league", "39")],
            "player_raya_2023.json",
        );
    let (status, _) = post_json(
        app(provider),
        "/players/stats",
        json!({"player_name": "David Raya", "team_name": "Arsenal", "league_name": "Premier League", "season": 2022}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_field_is_unprocessable() {
    let (status, json) = post_json(
        app(premier_league()),
        "/teams/h2h",
        json!({"team_1": "Arsenal", "league": "Premier League"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error_code"], 422);
}

#[tokio::test]
async fn blank_name_is_unprocessable() {
    let (status, json) = post_json(
        app(premier_league()),
        "/player_predictions/recent",
        json!({"player_name": "  ", "team_name": "Arsenal", "league_name": "Premier League"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["message"], "player_name must not be empty");
}

#[tokio::test]
async fn same_team_twice_is_unprocessable() {
    let (status, json) = post_json(
        app(premier_league()),
        "/teams/recent",
        json!({"team_1": "Arsenal", "team_2": " arsenal", "league": "Premier League"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["message"], "team_1 and team_2 must differ");
}

#[tokio::test]
async fn team_predictions_include_note() {
    let (status, json) = post_json(
        app(premier_league()),
        "/team_predictions/predict",
        json!({"team_1": "Arsenal", "team_2": "Chelsea", "league": "Premier League"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["Arsenal"]["matches_used"], 3);
    assert_eq!(json["Arsenal"]["shots"]["on_target"]["actual"], 5.0);
    assert!(json["Arsenal"]["note"].as_str().unwrap().contains("not a forecast"));
    assert_eq!(json["Chelsea"]["error_code"], 502);
}
