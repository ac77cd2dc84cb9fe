/*
 * Responsibility
 * - Double-submit check for cookie-carried tokens
 * - The CSRF cookie must equal the CSRF header (or form field) on unsafe methods
 */
use axum::http::{HeaderName, Method};
use subtle::ConstantTimeEq;
use thiserror::Error;

use super::request::TokenRequest;

pub const CSRF_COOKIE_NAME: &str = "csrf_token";
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";
pub const CSRF_FORM_FIELD: &str = "csrf_token";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsrfError {
    #[error("csrf cookie missing")]
    MissingCookie,
    #[error("csrf token missing")]
    MissingToken,
    #[error("csrf token mismatch")]
    Mismatch,
}

#[derive(Debug, Clone)]
pub struct CsrfPolicy {
    pub cookie_name: String,
    pub header_name: HeaderName,
    pub form_field: String,
    pub safe_methods: Vec<Method>,
}

impl Default for CsrfPolicy {
    fn default() -> Self {
        Self {
            cookie_name: CSRF_COOKIE_NAME.to_string(),
            header_name: HeaderName::from_static(CSRF_HEADER_NAME),
            form_field: CSRF_FORM_FIELD.to_string(),
            safe_methods: vec![Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE],
        }
    }
}

impl CsrfPolicy {
    pub fn is_safe(&self, method: &Method) -> bool {
        self.safe_methods.contains(method)
    }

    pub fn verify(&self, req: &TokenRequest<'_>) -> Result<(), CsrfError> {
        if self.is_safe(req.method) {
            return Ok(());
        }

        let expected = req.cookie(&self.cookie_name).ok_or(CsrfError::MissingCookie)?;
        let submitted = match req.headers.get(&self.header_name) {
            Some(value) => value.to_str().map_err(|_| CsrfError::Mismatch)?.to_string(),
            None => req
                .form_value(&self.form_field)
                .ok_or(CsrfError::MissingToken)?,
        };

        if expected.as_bytes().ct_eq(submitted.as_bytes()).into() {
            Ok(())
        } else {
            Err(CsrfError::Mismatch)
        }
    }
}
