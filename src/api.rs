use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::auth::AdminGate;
use crate::constants::{normalize_top_limit, DEFAULT_MODE};
use crate::error::{LeaderboardError, ResultRejection};
use crate::service::{LeaderboardService, Submission};
use crate::types::{LeaderboardResponse, SubmitResult};

#[derive(Clone)]
pub struct AppState {
    service: LeaderboardService,
    gate: Arc<dyn AdminGate>,
}

impl AppState {
    pub fn new(service: LeaderboardService, gate: Arc<dyn AdminGate>) -> Self {
        Self { service, gate }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    mode: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    admin_code: Option<String>,
    #[serde(default)]
    mode: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/leaderboard",
            get(list_handler).post(submit_handler).delete(remove_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn list_handler(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    respond(handle_list(&state, &query).await)
}

async fn submit_handler(
    State(state): State<AppState>,
    body: Result<Json<Submission>, JsonRejection>,
) -> Response {
    let result = match body {
        Ok(Json(submission)) => handle_submit(&state, &submission).await,
        Err(rejection) => Err(malformed(rejection)),
    };
    respond(result)
}

async fn remove_handler(
    State(state): State<AppState>,
    body: Result<Json<RemoveRequest>, JsonRejection>,
) -> Response {
    let result = match body {
        Ok(Json(request)) => handle_remove(&state, &request).await,
        Err(rejection) => Err(malformed(rejection)),
    };
    respond(result.map(|()| json!({ "ok": true })))
}

pub async fn handle_list(
    state: &AppState,
    query: &ListQuery,
) -> Result<LeaderboardResponse, LeaderboardError> {
    let mode = query
        .mode
        .as_deref()
        .filter(|mode| !mode.is_empty())
        .unwrap_or(DEFAULT_MODE.as_str());
    let limit = normalize_top_limit(parse_limit(query.limit.as_deref()));
    let entries = state.service.list_top(mode, limit).await?;
    Ok(LeaderboardResponse { entries })
}

pub async fn handle_submit(
    state: &AppState,
    submission: &Submission,
) -> Result<SubmitResult, LeaderboardError> {
    state.service.submit(submission).await
}

/// Checks the id before the credential, and the credential before touching
/// the store.
pub async fn handle_remove(
    state: &AppState,
    request: &RemoveRequest,
) -> Result<(), LeaderboardError> {
    let id = request.id.as_deref().map(str::trim).unwrap_or_default();
    if id.is_empty() {
        return Err(LeaderboardError::MissingId);
    }
    let grant = state.gate.authorize(request.admin_code.as_deref())?;
    state.service.remove(grant, request.mode.as_deref(), id).await
}

pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.parse::<usize>().ok())
}

fn malformed(rejection: JsonRejection) -> LeaderboardError {
    LeaderboardError::MalformedRequest {
        message: rejection.body_text(),
    }
}

fn respond<T: serde::Serialize>(result: Result<T, LeaderboardError>) -> Response {
    match result {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub fn status_for(error: &LeaderboardError) -> StatusCode {
    match error {
        LeaderboardError::Unauthorized => StatusCode::FORBIDDEN,
        LeaderboardError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

pub fn human_message(error: &LeaderboardError) -> String {
    match error {
        LeaderboardError::InvalidMode { .. } => "Invalid mode.".to_string(),
        LeaderboardError::InvalidName(rejection) => {
            let mut message = rejection.to_string();
            if let Some(first) = message.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            format!("{message}.")
        }
        LeaderboardError::InvalidResult {
            reason: ResultRejection::NotInteger,
            ..
        } => "Invalid score or time.".to_string(),
        LeaderboardError::InvalidResult {
            reason: ResultRejection::Range,
            ..
        } => "Result values outside the allowed range.".to_string(),
        LeaderboardError::Persistence { message } => message.clone(),
        LeaderboardError::Unauthorized => "Wrong admin code.".to_string(),
        LeaderboardError::MissingId => "Missing id.".to_string(),
        LeaderboardError::MalformedRequest { message } => message.clone(),
    }
}

impl IntoResponse for LeaderboardError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::warn!(code = self.code(), reason = self.reason(), error = %self, "request rejected");
        }
        let mut body = json!({
            "error": human_message(&self),
            "code": self.code(),
        });
        if let Some(reason) = self.reason() {
            body["reason"] = json!(reason);
        }
        (status, Json(body)).into_response()
    }
}
