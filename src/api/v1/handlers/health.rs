/*
 * Responsibility
 * - GET /health (liveness; no token required)
 * - Reports whether the credential store can currently serve keys
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let keys = match state.store.verification_keys() {
        Ok(keys) => keys.len(),
        Err(_) => 0,
    };
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "store": state.store.name(), "verification_keys": keys})),
    )
}
