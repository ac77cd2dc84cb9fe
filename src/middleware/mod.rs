/*
 * Responsibility
 * - Public interface of the middleware layer
 *   - http: cross-cutting transport layers
 *   - auth: Verify / Extract token guards
 */
pub mod auth;
pub mod http;
