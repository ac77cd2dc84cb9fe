/*
 * Responsibility
 * - Ticket verification request/response DTO
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::auth::TicketClaims;

#[derive(Debug, Deserialize)]
pub struct VerifyTicketRequest {
    pub ticket: String,
}

impl VerifyTicketRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.ticket.trim().is_empty() {
            return Err("ticket is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyTicketResponse {
    pub study_id: String,
    pub subject_ids: Vec<Uuid>,
    pub expires_at: i64,
}

impl From<TicketClaims> for VerifyTicketResponse {
    fn from(claims: TicketClaims) -> Self {
        Self {
            study_id: claims.study_id,
            subject_ids: claims.subject_ids,
            expires_at: claims.exp,
        }
    }
}
