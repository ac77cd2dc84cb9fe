/*
 * Responsibility
 * - Token guards for routers
 *   - verify: blocking; rejects before the handler runs
 *   - extract: best effort; never rejects
 *
 * Notes
 * - Both are installed with route_layer so path parameters are matched already
 */
mod request;

pub mod extract;
pub mod verify;
