/*!
 * Authentication context extractors
 *
 * Responsibility:
 * - Hand the verified claims / request identity to handlers
 * - axum glue stays in core, plain types in types
 *
 * Public API:
 * - RequestIdentity
 * - VerifiedClaims
 * - Identity
 */

mod core;
mod types;

pub use core::{Identity, VerifiedClaims};
pub use types::RequestIdentity;
