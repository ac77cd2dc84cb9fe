/*
 * Responsibility
 * - The identity a handler sees for the current request
 * - Middleware writes it into request extensions; handlers only read it
 *
 * Notes
 * - Verify overwrites every field it can derive from the token
 * - Extract fills only the fields nothing upstream has set
 */
use serde::Serialize;
use uuid::Uuid;

use crate::services::auth::Claims;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestIdentity {
    pub user_id: Option<Uuid>,
    pub client_id: Option<String>,
    pub tenant_id: Option<String>,
    pub subject_id: Option<Uuid>,
}

impl RequestIdentity {
    /// Identity carried by a verified token.
    ///
    /// `user_id` is the token subject. `ghc:uid` stays on the claims and does
    /// not feed the identity. Empty claim values are treated as absent.
    pub fn from_claims(claims: &Claims) -> Self {
        let subject_id = claims.subject_id();

        Self {
            user_id: subject_id,
            client_id: non_empty(&claims.client_id),
            tenant_id: non_empty(&claims.tenant_id),
            subject_id,
        }
    }

    pub fn fill_missing(&mut self, other: &RequestIdentity) {
        if self.user_id.is_none() {
            self.user_id = other.user_id;
        }
        if self.client_id.is_none() {
            self.client_id.clone_from(&other.client_id);
        }
        if self.tenant_id.is_none() {
            self.tenant_id.clone_from(&other.tenant_id);
        }
        if self.subject_id.is_none() {
            self.subject_id = other.subject_id;
        }
    }

    pub fn overwrite_from(&mut self, other: &RequestIdentity) {
        if other.user_id.is_some() {
            self.user_id = other.user_id;
        }
        if other.client_id.is_some() {
            self.client_id.clone_from(&other.client_id);
        }
        if other.tenant_id.is_some() {
            self.tenant_id.clone_from(&other.tenant_id);
        }
        if other.subject_id.is_some() {
            self.subject_id = other.subject_id;
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
