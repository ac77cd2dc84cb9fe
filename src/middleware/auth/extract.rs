//! Best-effort guard: extract + verify, never reject.
//!
//! A verified token contributes `Claims` and fills whatever `RequestIdentity`
//! fields are still empty. Anything else is logged and the request proceeds
//! untouched.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use super::request::PreparedRequest;
use crate::api::v1::extractors::RequestIdentity;
use crate::services::auth::{AuthError, Authenticator, TraceContext};

pub fn apply<S>(router: Router<S>, auth: Arc<Authenticator>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(auth, extract_middleware))
}

async fn extract_middleware(
    State(auth): State<Arc<Authenticator>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let prepared = match PreparedRequest::new(req).await {
        Ok(prepared) => prepared,
        // The body is gone at this point; the request cannot continue
        Err(err) => return err.into_response(),
    };
    let ctx = TraceContext::from_parts(&prepared.parts);
    let outcome = auth.authenticate(&prepared.token_request());

    let mut req = prepared.into_request();
    match outcome {
        Ok(claims) => {
            let incoming = RequestIdentity::from_claims(&claims);
            let mut identity = req
                .extensions()
                .get::<RequestIdentity>()
                .cloned()
                .unwrap_or_default();
            identity.fill_missing(&incoming);

            req.extensions_mut().insert(identity);
            req.extensions_mut().insert(claims);
        }
        Err(AuthError::Extract(err)) if err.is_absent() => {}
        Err(err) => auth.logger().info(&ctx, &format!("token ignored: {err}")),
    }

    next.run(req).await
}
