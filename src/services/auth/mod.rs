/*
 * Responsibility
 * - Access token domain: claims, owner, scope, verification, issuing
 * - Request-side pieces: token extraction, authorization rules, logging
 * - HMAC tickets for service-to-service calls
 */
pub mod authenticator;
pub mod claims;
pub mod extractor;
pub mod issuer;
pub mod logger;
pub mod owner;
pub mod rules;
pub mod scope;
pub mod ticket;
pub mod verifier;

pub use authenticator::{AuthError, Authenticator};
pub use claims::{Claims, ClaimsError, ISSUER};
pub use extractor::{ExtractError, ExtractorConfig, TokenExtractor, TokenRequest};
pub use issuer::{AccessToken, AccessTokenOptions, IssueError, TokenIssuer};
pub use logger::{AuthLogger, TraceContext, TracingLogger};
pub use owner::Owner;
pub use rules::{Rule, RuleError, RuleRequest};
pub use scope::Scope;
pub use ticket::{TicketClaims, TicketError, Ticketer};
pub use verifier::{TokenVerifier, VerifyError};
