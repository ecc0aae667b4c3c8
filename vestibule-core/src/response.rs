//! Responses and response construction.

use crate::error::DispatchError;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header::LOCATION};
use std::fmt;

/// Status used by [`Response::redirect_to`].
pub const DEFAULT_REDIRECT_STATUS: u16 = 302;

/// The final product of a dispatch: a body, a status code and headers.
///
/// Each header name holds a single value; setting a header replaces any
/// previous value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    body: String,
    status: StatusCode,
    headers: HeaderMap,
}

impl Response {
    /// Create a response with the given body and status.
    pub fn new(body: impl Into<String>, status: StatusCode) -> Self {
        Self {
            body: body.into(),
            status,
            headers: HeaderMap::new(),
        }
    }

    /// Create a `200 OK` response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(body, StatusCode::OK)
    }

    /// Create a redirection response.
    ///
    /// Fails with [`DispatchError::InvalidArgument`] unless `code` is a 3xx
    /// status, or when `location` cannot be used as a header value.
    pub fn redirect(location: &str, code: u16) -> Result<Self, DispatchError> {
        if !(300..=399).contains(&code) {
            return Err(DispatchError::InvalidArgument(format!(
                "invalid redirection response code {code}"
            )));
        }
        let status = StatusCode::from_u16(code)
            .map_err(|err| DispatchError::InvalidArgument(err.to_string()))?;
        let value = HeaderValue::from_str(location)
            .map_err(|err| DispatchError::InvalidArgument(format!("invalid location: {err}")))?;

        let mut response = Self::new(format!("Redirecting to {location}"), status);
        response.headers.insert(LOCATION, value);
        Ok(response)
    }

    /// Create a `302 Found` redirection response.
    pub fn redirect_to(location: &str) -> Result<Self, DispatchError> {
        Self::redirect(location, DEFAULT_REDIRECT_STATUS)
    }

    /// The response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Replace the response body.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Consume the response, returning its body.
    pub fn into_body(self) -> String {
        self.body
    }

    /// The status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Replace the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// All headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Look up a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Set a header from typed parts.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Set a header from strings, validating both parts.
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<(), DispatchError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| DispatchError::InvalidArgument(format!("invalid header name: {err}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| DispatchError::InvalidArgument(format!("invalid header value: {err}")))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Builder form of [`insert_header`](Self::insert_header).
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.insert_header(name, value);
        self
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

/// Builds the responses the dispatch core creates on its own.
///
/// The active factory is the "response class" of a request: wrapped raw
/// results and converted errors are built through it.
pub trait ResponseFactory: Send + Sync + 'static {
    /// A name identifying this factory, recorded under `response.class`.
    fn name(&self) -> &str;

    /// Build a response.
    fn create(&self, body: String, status: StatusCode) -> Response;
}

/// The default [`ResponseFactory`], producing bare [`Response`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainResponses;

impl ResponseFactory for PlainResponses {
    fn name(&self) -> &str {
        "response"
    }

    fn create(&self, body: String, status: StatusCode) -> Response {
        Response::new(body, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_redirect() {
        let response = Response::redirect_to("/").unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.header("Location"), Some("/"));
        assert_eq!(response.body(), "Redirecting to /");
    }

    #[test]
    fn test_absolute_redirect() {
        let response = Response::redirect_to("http://example.com").unwrap();
        assert_eq!(response.status().as_u16(), 302);
        assert_eq!(response.header("Location"), Some("http://example.com"));
    }

    #[test]
    fn test_every_3xx_code_redirects() {
        for code in 300..=399 {
            let response = Response::redirect("/next", code).unwrap();
            assert_eq!(response.status().as_u16(), code);
            assert_eq!(response.header("location"), Some("/next"));
        }
    }

    #[test]
    fn test_non_3xx_codes_are_rejected() {
        for code in [0, 3, 30, 100, 200, 299, 400, 401, 500, 3000] {
            let err = Response::redirect("/somewhere", code).unwrap_err();
            assert!(matches!(err, DispatchError::InvalidArgument(_)), "code {code}");
        }
    }

    #[test]
    fn test_header_validation() {
        let mut response = Response::ok("body");
        assert!(response.add_header("X-Trace", "abc").is_ok());
        assert_eq!(response.header("x-trace"), Some("abc"));
        assert!(response.add_header("bad header", "v").is_err());
        assert!(response.add_header("X-Bad", "line\nbreak").is_err());
    }

    #[test]
    fn test_display_is_body() {
        assert_eq!(Response::ok("ok").to_string(), "ok");
    }
}
