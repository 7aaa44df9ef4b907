//! Control-surface request handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::AppState;
use crate::monitor::MonitorError;

/// Current monitor status. Never waits for an in-flight cycle.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.monitor.status())
}

/// Resume polling.
pub async fn start(State(state): State<AppState>) -> Response {
    match state.monitor.start().await {
        Ok(changed) => toggled(&state, changed),
        Err(e) => error_response(&e),
    }
}

/// Stop polling after any in-flight cycle.
pub async fn stop(State(state): State<AppState>) -> Response {
    match state.monitor.stop().await {
        Ok(changed) => toggled(&state, changed),
        Err(e) => error_response(&e),
    }
}

/// Run one cycle now and return its report.
pub async fn check(State(state): State<AppState>) -> Response {
    match state.monitor.check_now().await {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(&e),
    }
}

fn toggled(state: &AppState, changed: bool) -> Response {
    Json(serde_json::json!({
        "changed": changed,
        "status": state.monitor.status(),
    }))
    .into_response()
}

fn error_response(error: &MonitorError) -> Response {
    let status = match error {
        MonitorError::NotRunning => StatusCode::CONFLICT,
        MonitorError::Fetch(_) => StatusCode::BAD_GATEWAY,
        MonitorError::Closed => StatusCode::SERVICE_UNAVAILABLE,
    };
    (
        status,
        Json(serde_json::json!({ "error": error.to_string() })),
    )
        .into_response()
}
