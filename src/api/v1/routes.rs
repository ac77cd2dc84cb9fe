/*
 * Responsibility
 * - URL layout of v1
 * - Which routes are guarded, and how (Verify rules / Extract)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    health::health, profile::get_profile, tickets::verify_ticket, whoami::whoami,
};
use crate::middleware::auth::{extract, verify};
use crate::services::auth::Rule;
use crate::services::auth::scope::known::TOKEN_USER_READ;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/tickets/verify", post(verify_ticket));

    let owner_only = verify::apply(
        Router::new().route("/users/{owner}/profile", get(get_profile)),
        state.auth.clone(),
        vec![
            Rule::owner_from_path("owner"),
            Rule::all_scopes([TOKEN_USER_READ]),
        ],
    );

    let best_effort = extract::apply(
        Router::new().route("/whoami", get(whoami)),
        state.auth.clone(),
    );

    public.merge(owner_only).merge(best_effort)
}
