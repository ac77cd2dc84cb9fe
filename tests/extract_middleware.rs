//! Extract guard: never rejects, and only fills identity fields nothing
//! upstream has set. Verify, by contrast, overwrites them.
mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use common::{app, key_doc, memory_store, read_json, token};
use token_gate::api::v1::extractors::{Identity, RequestIdentity};
use token_gate::middleware::auth::{extract, verify};
use token_gate::services::auth::{Authenticator, ExtractorConfig};
use tower::ServiceExt;
use uuid::Uuid;

fn whoami(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/v1/whoami");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

#[tokio::test]
async fn anonymous_request_passes_through() {
    let res = app(memory_store(key_doc(&[0], &[])))
        .oneshot(whoami(None))
        .await
        .expect("response");
    assert_eq!(res.status(), StatusCode::OK);

    let body = read_json(res).await;
    assert!(body["user_id"].is_null());
    assert!(body["client_id"].is_null());
}

#[tokio::test]
async fn bad_tokens_are_ignored() {
    let app = app(memory_store(key_doc(&[0], &[])));
    let foreign = token(3, Uuid::new_v4(), "user:r");

    for value in [foreign.as_str(), "garbage"] {
        let res = app.clone().oneshot(whoami(Some(value))).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        assert!(read_json(res).await["subject_id"].is_null());
    }
}

#[tokio::test]
async fn verified_token_fills_identity() {
    let subject = Uuid::new_v4();
    let res = app(memory_store(key_doc(&[0], &[])))
        .oneshot(whoami(Some(&token(0, subject, "rec:r"))))
        .await
        .expect("response");
    assert_eq!(res.status(), StatusCode::OK);

    let body = read_json(res).await;
    assert_eq!(body["subject_id"], subject.to_string());
    // user_id always mirrors the subject
    assert_eq!(body["user_id"], subject.to_string());
    assert_eq!(body["client_id"], "integration");
}

async fn seed_upstream_identity(mut req: Request<Body>, next: Next) -> Response {
    req.extensions_mut().insert(RequestIdentity {
        client_id: Some("upstream".into()),
        ..RequestIdentity::default()
    });
    next.run(req).await
}

async fn echo_identity(Identity(identity): Identity) -> Json<RequestIdentity> {
    Json(identity)
}

fn seeded(guard: &str) -> Router {
    let store = memory_store(key_doc(&[0], &[]));
    let auth = Arc::new(Authenticator::new(store, &ExtractorConfig::default()));
    let routes = Router::new().route("/who", get(echo_identity));
    let guarded = match guard {
        "extract" => extract::apply(routes, auth),
        _ => verify::apply(routes, auth, Vec::new()),
    };
    guarded.layer(middleware::from_fn(seed_upstream_identity))
}

fn who(token: &str) -> Request<Body> {
    Request::builder()
        .uri("/who")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn extract_does_not_overwrite_upstream_values() {
    let subject = Uuid::new_v4();
    let res = seeded("extract")
        .oneshot(who(&token(0, subject, "user:r")))
        .await
        .expect("response");

    let body = read_json(res).await;
    assert_eq!(body["client_id"], "upstream");
    assert_eq!(body["user_id"], subject.to_string());
}

#[tokio::test]
async fn verify_overwrites_upstream_values() {
    let subject = Uuid::new_v4();
    let res = seeded("verify")
        .oneshot(who(&token(0, subject, "user:r")))
        .await
        .expect("response");

    let body = read_json(res).await;
    assert_eq!(body["client_id"], "integration");
    assert_eq!(body["subject_id"], subject.to_string());
}
