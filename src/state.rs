/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - auth: Authenticator over the credential store
 *   - store: kept for health and key summaries
 *   - ticketer: present only when a ticket key is configured
 * - Clone is cheap (everything behind Arc)
 */
use std::sync::Arc;

use crate::services::auth::{Authenticator, Ticketer};
use crate::services::keys::CredentialStore;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<Authenticator>,
    pub store: Arc<CredentialStore>,
    pub ticketer: Option<Arc<Ticketer>>,
}

impl AppState {
    pub fn new(
        auth: Arc<Authenticator>,
        store: Arc<CredentialStore>,
        ticketer: Option<Arc<Ticketer>>,
    ) -> Self {
        Self {
            auth,
            store,
            ticketer,
        }
    }
}
