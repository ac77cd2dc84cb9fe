/*
 * Responsibility
 * - POST /tickets/verify: check an HMAC ticket and return its claims
 * - 404 when the service runs without a ticket key
 */
use axum::{Json, extract::State};

use crate::api::v1::dto::tickets::{VerifyTicketRequest, VerifyTicketResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn verify_ticket(
    State(state): State<AppState>,
    Json(req): Json<VerifyTicketRequest>,
) -> Result<Json<VerifyTicketResponse>, AppError> {
    let ticketer = state
        .ticketer
        .as_ref()
        .ok_or(AppError::not_found("ticket verification"))?;

    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_TICKET_REQUEST", msg))?;

    let claims = ticketer.verify(&req.ticket).map_err(|err| {
        tracing::warn!(error = %err, "ticket rejected");
        AppError::from(err)
    })?;

    Ok(Json(claims.into()))
}
