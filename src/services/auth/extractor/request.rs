use axum::http::{HeaderMap, Method, Uri, header, request::Parts};

/// The parts of a request token extraction looks at.
///
/// `form` is the buffered urlencoded body, if the caller read one.
#[derive(Debug, Clone, Copy)]
pub struct TokenRequest<'a> {
    pub method: &'a Method,
    pub headers: &'a HeaderMap,
    pub uri: &'a Uri,
    pub form: Option<&'a [u8]>,
}

impl<'a> TokenRequest<'a> {
    pub fn new(method: &'a Method, headers: &'a HeaderMap, uri: &'a Uri) -> Self {
        Self {
            method,
            headers,
            uri,
            form: None,
        }
    }

    pub fn from_parts(parts: &'a Parts) -> Self {
        Self::new(&parts.method, &parts.headers, &parts.uri)
    }

    pub fn with_form(mut self, form: Option<&'a [u8]>) -> Self {
        self.form = form;
        self
    }

    /// First value of `name`, body before query. Empty counts as absent.
    pub fn form_value(&self, name: &str) -> Option<String> {
        let body = self.form.and_then(|body| lookup(body, name));
        let value = match body {
            Some(value) => value,
            None => lookup(self.uri.query().unwrap_or_default().as_bytes(), name)?,
        };
        (!value.is_empty()).then_some(value)
    }

    /// Value of cookie `name` across all `Cookie` headers. Empty counts as absent.
    pub fn cookie(&self, name: &str) -> Option<&'a str> {
        let headers: &'a HeaderMap = self.headers;
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.trim_matches('"'))
            .filter(|v| !v.is_empty())
    }
}

fn lookup(encoded: &[u8], name: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded)
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
