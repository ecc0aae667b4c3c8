//! JSON responses.

use http::{HeaderValue, StatusCode, header::CONTENT_TYPE};
use serde_json::{Map, Value};
use vestibule_core::{BoxError, FormatKind, Formatter, Payload, Response};

/// Renders results as JSON documents.
///
/// Without injected values the result is rendered on its own. Once a value
/// is set, the document becomes an object holding the result under
/// `"result"` next to every injected value. Values are consumed by the
/// next [`transform`](Formatter::transform).
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    status: StatusCode,
    pretty: bool,
    values: Map<String, Value>,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            pretty: false,
            values: Map::new(),
        }
    }
}

impl JsonFormatter {
    /// Create a compact JSON formatter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent the rendered documents.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Status of the produced responses.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// The values waiting for the next response.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    fn document(result: Value, values: Map<String, Value>) -> Value {
        if values.is_empty() {
            return result;
        }
        let mut document = Map::with_capacity(values.len() + 1);
        document.insert("result".to_owned(), result);
        for (name, value) in values {
            document.entry(name).or_insert(value);
        }
        Value::Object(document)
    }
}

impl Formatter for JsonFormatter {
    fn kind(&self) -> FormatKind {
        FormatKind::Json
    }

    fn transform(&mut self, result: Payload) -> Result<Response, BoxError> {
        let values = std::mem::take(&mut self.values);
        let result = match result {
            Payload::Response(response) => return Ok(response),
            Payload::Value(value) => value,
        };
        let document = Self::document(result, values);
        let body = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(Response::new(body, self.status)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json")))
    }

    fn set_value(&mut self, name: &str, value: Value) -> bool {
        self.values.insert(name.to_owned(), value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_renders_result() {
        let response = JsonFormatter::new()
            .transform(Payload::Value(json!({ "id": 7 })))
            .unwrap();
        assert_eq!(response.body(), r#"{"id":7}"#);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_embeds_values() {
        let mut formatter = JsonFormatter::new();
        assert!(formatter.set_value("buffered", Value::from("notice")));
        let response = formatter.transform(Payload::from("done")).unwrap();
        let body: Value = serde_json::from_str(response.body()).unwrap();
        assert_eq!(body, json!({ "result": "done", "buffered": "notice" }));
    }

    #[test]
    fn test_values_apply_to_one_response() {
        let mut formatter = JsonFormatter::new();
        formatter.set_value("buffered", Value::from("first request"));
        let first = formatter.transform(Payload::from("one")).unwrap();
        let body: Value = serde_json::from_str(first.body()).unwrap();
        assert_eq!(body, json!({ "result": "one", "buffered": "first request" }));
        assert!(formatter.values().is_empty());

        let second = formatter.transform(Payload::from("two")).unwrap();
        assert_eq!(second.body(), r#""two""#);
    }

    #[test]
    fn test_result_key_wins() {
        let mut formatter = JsonFormatter::new();
        formatter.set_value("result", Value::from("shadow"));
        let response = formatter.transform(Payload::Value(Value::from(1))).unwrap();
        let body: Value = serde_json::from_str(response.body()).unwrap();
        assert_eq!(body, json!({ "result": 1 }));
    }

    #[test]
    fn test_responses_pass_through() {
        let original = Response::new("as is", StatusCode::ACCEPTED);
        let mut formatter = JsonFormatter::new().pretty(true);
        formatter.set_value("buffered", Value::from("dropped"));
        let response = formatter.transform(Payload::Response(original.clone())).unwrap();
        assert_eq!(response, original);
        assert!(formatter.values().is_empty());
    }
}
