/*
 * Responsibility
 * - Domain services that do not depend on the HTTP layout
 *   - keys: credential store (load / hot reload / merge)
 *   - auth: token verification, authorization, tickets
 */
pub mod auth;
pub mod keys;
