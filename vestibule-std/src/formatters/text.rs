//! Plain text responses.

use http::{HeaderValue, StatusCode, header::CONTENT_TYPE};
use serde_json::Value;
use vestibule_core::{BoxError, FormatKind, Formatter, Payload, Response};

/// Renders results as plain text.
///
/// Injected values are appended after the body, one per line, in the order
/// they were set, and are consumed by the next response. Ready-made
/// responses pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    appended: Vec<(String, Value)>,
}

impl TextFormatter {
    /// Create a text formatter.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Formatter for TextFormatter {
    fn kind(&self) -> FormatKind {
        FormatKind::Text
    }

    fn transform(&mut self, result: Payload) -> Result<Response, BoxError> {
        let appended = std::mem::take(&mut self.appended);
        let mut body = match result {
            Payload::Response(response) => return Ok(response),
            value => value.render(),
        };
        for (_, value) in appended {
            if !body.is_empty() && !body.ends_with('\n') {
                body.push('\n');
            }
            match value {
                Value::String(text) => body.push_str(&text),
                other => body.push_str(&other.to_string()),
            }
        }
        Ok(Response::new(body, StatusCode::OK)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8")))
    }

    fn set_value(&mut self, name: &str, value: Value) -> bool {
        match self.appended.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.appended.push((name.to_owned(), value)),
        }
        true
    }
}
