use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::error::{ErrorBody, ServiceError, ServiceResult, TeamOutcome};
use crate::head_to_head::LatestH2h;
use crate::player_stats::PlayerSeasonRecord;
use crate::players::PlayerMatchRecord;
use crate::predict::{PlayerPredictions, TeamPredictions};
use crate::service::{H2hResponse, StatsService};
use crate::standings::StandingRow;
use crate::team_fixtures::MatchRecord;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StatsService>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamsRequest {
    pub team_1: String,
    pub team_2: String,
    pub league: String,
    #[serde(default)]
    pub matches_number: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRequest {
    pub player_name: String,
    pub team_name: String,
    pub league_name: String,
    #[serde(default)]
    pub matches_number: Option<usize>,
    #[serde(default)]
    pub season: Option<u16>,
}

#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    InvalidBody(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            Self::Service(err) => err.to_body(),
            Self::InvalidBody(message) => ErrorBody {
                error_code: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                message,
            },
        };
        let status = StatusCode::from_u16(body.error_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidBody(format!("{field} must not be empty")));
    }
    Ok(())
}

impl TeamsRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require("team_1", &self.team_1)?;
        require("team_2", &self.team_2)?;
        require("league", &self.league)?;
        if self.team_1.trim().eq_ignore_ascii_case(self.team_2.trim()) {
            return Err(ApiError::InvalidBody("team_1 and team_2 must differ".to_string()));
        }
        Ok(())
    }
}

impl PlayerRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require("player_name", &self.player_name)?;
        require("team_name", &self.team_name)?;
        require("league_name", &self.league_name)
    }
}

/// Runs a blocking service call off the async workers.
async fn run_blocking<T, F>(state: &AppState, call: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&StatsService) -> ServiceResult<T> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    match tokio::task::spawn_blocking(move || call(&service)).await {
        Ok(result) => Ok(Json(result?)),
        Err(err) => {
            error!(error = %err, "request worker failed");
            Err(ServiceError::Internal("request worker failed".to_string()).into())
        }
    }
}

fn teams_body(body: Result<Json<TeamsRequest>, JsonRejection>) -> Result<TeamsRequest, ApiError> {
    let Json(req) = body?;
    req.validate()?;
    Ok(req)
}

fn player_body(body: Result<Json<PlayerRequest>, JsonRejection>) -> Result<PlayerRequest, ApiError> {
    let Json(req) = body?;
    req.validate()?;
    Ok(req)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Football Stats API",
        "routes": [
            "GET /standings",
            "POST /teams/h2h",
            "POST /teams/h2h/latest",
            "POST /teams/recent",
            "POST /team_predictions/predict",
            "POST /players/stats",
            "POST /players/recent",
            "POST /player_predictions/recent",
        ],
    }))
}

async fn standings(State(state): State<AppState>) -> ApiResult<BTreeMap<String, Vec<StandingRow>>> {
    run_blocking(&state, |service| Ok(service.standings())).await
}

async fn h2h(
    State(state): State<AppState>,
    body: Result<Json<TeamsRequest>, JsonRejection>,
) -> ApiResult<H2hResponse> {
    let req = teams_body(body)?;
    info!(team_1 = %req.team_1, team_2 = %req.team_2, league = %req.league, "head-to-head");
    run_blocking(&state, move |service| service.h2h(&req.team_1, &req.team_2, &req.league)).await
}

async fn latest_h2h(
    State(state): State<AppState>,
    body: Result<Json<TeamsRequest>, JsonRejection>,
) -> ApiResult<LatestH2h> {
    let req = teams_body(body)?;
    info!(team_1 = %req.team_1, team_2 = %req.team_2, league = %req.league, "latest head-to-head");
    run_blocking(&state, move |service| {
        service.latest_h2h(&req.team_1, &req.team_2, &req.league)
    })
    .await
}

async fn recent_matches(
    State(state): State<AppState>,
    body: Result<Json<TeamsRequest>, JsonRejection>,
) -> ApiResult<BTreeMap<String, TeamOutcome<Vec<MatchRecord>>>> {
    let req = teams_body(body)?;
    info!(team_1 = %req.team_1, team_2 = %req.team_2, league = %req.league, "recent matches");
    run_blocking(&state, move |service| {
        service.recent_matches(&req.team_1, &req.team_2, &req.league, req.matches_number)
    })
    .await
}

async fn team_predictions(
    State(state): State<AppState>,
    body: Result<Json<TeamsRequest>, JsonRejection>,
) -> ApiResult<BTreeMap<String, TeamOutcome<TeamPredictions>>> {
    let req = teams_body(body)?;
    info!(team_1 = %req.team_1, team_2 = %req.team_2, league = %req.league, "team predictions");
    run_blocking(&state, move |service| {
        service.team_predictions(&req.team_1, &req.team_2, &req.league)
    })
    .await
}

async fn player_stats(
    State(state): State<AppState>,
    body: Result<Json<PlayerRequest>, JsonRejection>,
) -> ApiResult<PlayerSeasonRecord> {
    let req = player_body(body)?;
    info!(player = %req.player_name, team = %req.team_name, "player season stats");
    run_blocking(&state, move |service| {
        service.player_stats(&req.player_name, &req.team_name, &req.league_name, req.season)
    })
    .await
}

async fn player_recent(
    State(state): State<AppState>,
    body: Result<Json<PlayerRequest>, JsonRejection>,
) -> ApiResult<Vec<PlayerMatchRecord>> {
    let req = player_body(body)?;
    info!(player = %req.player_name, team = %req.team_name, "player recent matches");
    run_blocking(&state, move |service| {
        service.player_recent(
            &req.player_name,
            &req.team_name,
            &req.league_name,
            req.matches_number,
            req.season,
        )
    })
    .await
}

async fn player_predictions(
    State(state): State<AppState>,
    body: Result<Json<PlayerRequest>, JsonRejection>,
) -> ApiResult<PlayerPredictions> {
    let req = player_body(body)?;
    info!(player = %req.player_name, team = %req.team_name, "player predictions");
    run_blocking(&state, move |service| {
        service.player_predictions(
            &req.player_name,
            &req.team_name,
            &req.league_name,
            req.matches_number,
            req.season,
        )
    })
    .await
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/standings", get(standings))
        .route("/teams/h2h", post(h2h))
        .route("/teams/h2h/latest", post(latest_h2h))
        .route("/teams/recent", post(recent_matches))
        .route("/team_predictions/predict", post(team_predictions))
        .route("/players/stats", post(player_stats))
        .route("/players/recent", post(player_recent))
        .route("/player_predictions/recent", post(player_predictions))
        .with_state(state)
}
