/*
 * Responsibility
 * - GET /whoami: echo the request identity (Extract mode, never 401)
 */
use axum::Json;

use crate::api::v1::extractors::{Identity, RequestIdentity};

pub async fn whoami(Identity(identity): Identity) -> Json<RequestIdentity> {
    Json(identity)
}
