//! Blocking guard: extract -> verify -> authorize.
//!
//! On failure the handler is not called and the response is built from
//! [`AppError`] (401, 400 for malformed claims, 500 when no keys can be
//! served). On success `Claims` and a refreshed `RequestIdentity` go into
//! the request extensions.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use super::request::PreparedRequest;
use crate::api::v1::extractors::RequestIdentity;
use crate::error::AppError;
use crate::services::auth::{AuthError, Authenticator, Claims, Rule, TraceContext};

#[derive(Clone)]
struct VerifyGuard {
    auth: Arc<Authenticator>,
    rules: Arc<[Rule]>,
}

/// Guard every route of `router` with `rules`.
///
/// ```ignore
/// let profile = Router::new().route("/users/{owner}/profile", get(profile));
/// let profile = middleware::auth::verify::apply(
///     profile,
///     state.auth.clone(),
///     vec![Rule::owner_from_path("owner"), Rule::all_scopes(["user:r"])],
/// );
/// ```
pub fn apply<S>(router: Router<S>, auth: Arc<Authenticator>, rules: Vec<Rule>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let guard = VerifyGuard {
        auth,
        rules: rules.into(),
    };
    router.route_layer(middleware::from_fn_with_state(guard, verify_middleware))
}

async fn verify_middleware(
    State(guard): State<VerifyGuard>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let prepared = PreparedRequest::new(req).await?;
    let ctx = TraceContext::from_parts(&prepared.parts);

    let claims = match check(&guard, &prepared) {
        Ok(claims) => claims,
        Err(err) => {
            guard.auth.report(&ctx, &err);
            return Err(err.into());
        }
    };

    let mut req = prepared.into_request();
    let mut identity = req
        .extensions()
        .get::<RequestIdentity>()
        .cloned()
        .unwrap_or_default();
    identity.overwrite_from(&RequestIdentity::from_claims(&claims));

    req.extensions_mut().insert(identity);
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

fn check(guard: &VerifyGuard, prepared: &PreparedRequest) -> Result<Claims, AuthError> {
    let claims = guard.auth.authenticate(&prepared.token_request())?;
    guard
        .auth
        .authorize(&guard.rules, &prepared.rule_request(), &claims)?;
    Ok(claims)
}
