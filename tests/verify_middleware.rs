//! Verify guard over real routers: status mapping, owner and scope rules,
//! extraction precedence, and what reaches the handler.
mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::routing::post;
use chrono::Utc;
use common::{app, key_doc, memory_store, read_json, token};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use token_gate::middleware::auth::verify;
use token_gate::services::auth::{Authenticator, ExtractorConfig, ISSUER};
use tower::ServiceExt;
use uuid::Uuid;

fn profile_request(owner: Uuid, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(format!("/api/v1/users/{owner}/profile"));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

#[tokio::test]
async fn owner_with_scope_gets_profile() {
    let app = app(memory_store(key_doc(&[0, 1], &[(0, true)])));
    let owner = Uuid::new_v4();

    // Any listed key verifies, not only the first one
    for key in [0, 1] {
        let jwt = token(key, owner, "user:r tag:lab");
        let res = app
            .clone()
            .oneshot(profile_request(owner, Some(&jwt)))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);

        let body = read_json(res).await;
        assert_eq!(body["owner"], owner.to_string());
        assert_eq!(body["scope"], serde_json::json!(["user:r", "tag:lab"]));
        assert_eq!(body["tags"], serde_json::json!(["lab"]));
        assert_eq!(body["client_id"], "integration");
    }
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = app(memory_store(key_doc(&[0], &[])));
    let res = app
        .oneshot(profile_request(Uuid::new_v4(), None))
        .await
        .expect("response");

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(res).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn rule_failures_are_unauthorized() {
    let app = app(memory_store(key_doc(&[0], &[])));
    let owner = Uuid::new_v4();

    let cases = [
        // someone else's profile
        token(0, Uuid::new_v4(), "user:r"),
        // right owner, scope lacks user:r
        token(0, owner, "user:w rec:r"),
        // signed by a key the store does not list
        token(2, owner, "user:r"),
    ];
    for jwt in cases {
        let res = app
            .clone()
            .oneshot(profile_request(owner, Some(&jwt)))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn nil_owner_is_never_accepted() {
    let app = app(memory_store(key_doc(&[0], &[])));
    let jwt = token(0, Uuid::nil(), "user:r");

    let res = app
        .oneshot(profile_request(Uuid::nil(), Some(&jwt)))
        .await
        .expect("response");
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_claims_are_a_bad_request() {
    let app = app(memory_store(key_doc(&[0], &[])));
    let owner = Uuid::new_v4();
    let now = Utc::now().timestamp();
    let payload = serde_json::json!({
        "sub": format!("owner:{owner}"),
        "iss": ISSUER,
        "exp": now + 60,
        "nbf": now - 60,
        "ghc:scope": 17,
    });
    let jwt = jsonwebtoken::encode(
        &Header::new(Algorithm::RS256),
        &payload,
        &EncodingKey::from_rsa_pem(common::PRIVATE_KEYS[0].as_bytes()).expect("key"),
    )
    .expect("sign");

    let res = app
        .oneshot(profile_request(owner, Some(&jwt)))
        .await
        .expect("response");
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn store_without_keys_is_a_server_error() {
    // An empty document never loads, so the store has nothing to verify with
    let store = memory_store(String::new());
    assert!(store.verification_keys().is_err());

    let owner = Uuid::new_v4();
    let res = app(store)
        .oneshot(profile_request(owner, Some(&token(0, owner, "user:r"))))
        .await
        .expect("response");
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

fn echo_router() -> Router {
    let store = memory_store(key_doc(&[0], &[]));
    let auth = Arc::new(Authenticator::new(store, &ExtractorConfig::default()));
    verify::apply(
        Router::new().route("/submit", post(|body: String| async move { body })),
        auth,
        Vec::new(),
    )
}

fn form_request(body: String, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/submit")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(body)).expect("request")
}

#[tokio::test]
async fn form_token_is_accepted_and_body_survives() {
    let jwt = token(0, Uuid::new_v4(), "user:r");
    let form = format!("note=hello&access_token={jwt}");

    let res = echo_router()
        .oneshot(form_request(form.clone(), None))
        .await
        .expect("response");
    assert_eq!(res.status(), StatusCode::OK);

    let echoed = to_bytes(res.into_body(), usize::MAX).await.expect("body");
    assert_eq!(echoed, form.as_bytes());
}

#[tokio::test]
async fn malformed_header_is_not_rescued_by_form() {
    let jwt = token(0, Uuid::new_v4(), "user:r");
    let form = format!("access_token={jwt}");

    for header_value in ["Bearer not-a-jwt", "Basic dXNlcjpwYXNz"] {
        let res = echo_router()
            .oneshot(form_request(form.clone(), Some(header_value)))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{header_value}");
    }
}
