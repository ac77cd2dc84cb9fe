//! Request preparation shared by both guards.
//!
//! Splits the request, buffers a url-encoded form body (so the argument
//! strategy can read it) and snapshots the matched path parameters.

use axum::{
    RequestPartsExt,
    body::{Body, Bytes, to_bytes},
    extract::RawPathParams,
    http::{Method, Request, header, request::Parts},
};

use crate::error::AppError;
use crate::services::auth::{RuleRequest, TokenRequest};

pub(super) const FORM_BODY_LIMIT: usize = 1024 * 1024;

pub(super) struct PreparedRequest {
    pub(super) parts: Parts,
    body: Body,
    form: Option<Bytes>,
    path_params: Vec<(String, String)>,
}

impl PreparedRequest {
    pub(super) async fn new(req: Request<Body>) -> Result<Self, AppError> {
        let (mut parts, body) = req.into_parts();

        let (body, form) = if carries_form(&parts) {
            let bytes = to_bytes(body, FORM_BODY_LIMIT).await.map_err(|err| {
                tracing::warn!(error = %err, "failed to buffer form body");
                AppError::bad_request("INVALID_BODY", "request body could not be read")
            })?;
            (Body::from(bytes.clone()), Some(bytes))
        } else {
            (body, None)
        };

        let path_params = match parts.extract::<RawPathParams>().await {
            Ok(params) => params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            Err(_) => Vec::new(),
        };

        Ok(Self {
            parts,
            body,
            form,
            path_params,
        })
    }

    pub(super) fn token_request(&self) -> TokenRequest<'_> {
        TokenRequest::from_parts(&self.parts).with_form(self.form.as_deref())
    }

    pub(super) fn rule_request(&self) -> RuleRequest<'_> {
        RuleRequest::new(&self.parts, &self.path_params)
    }

    pub(super) fn into_request(self) -> Request<Body> {
        Request::from_parts(self.parts, self.body)
    }
}

fn carries_form(parts: &Parts) -> bool {
    let body_method = matches!(parts.method, Method::POST | Method::PUT | Method::PATCH);
    body_method
        && parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| {
                ct.trim_start()
                    .to_ascii_lowercase()
                    .starts_with("application/x-www-form-urlencoded")
            })
}
