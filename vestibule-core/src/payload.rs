//! Raw handler results.

use crate::{
    error::{BoxError, InvokeError},
    response::Response,
};
use serde_json::Value;
use std::fmt;

/// The raw result of invoking a callback.
///
/// A handler either returns a plain value, which still needs formatting, or a
/// fully formed [`Response`], which is passed through.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A value awaiting formatting.
    Value(Value),
    /// A response that needs no further formatting.
    Response(Response),
}

impl Payload {
    /// The empty payload.
    pub const fn null() -> Self {
        Payload::Value(Value::Null)
    }

    /// Serialize any value into a payload.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Payload::Value)
    }

    /// Returns `true` if this payload is already a response.
    pub fn is_response(&self) -> bool {
        matches!(self, Payload::Response(_))
    }

    /// Borrow the response, if any.
    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Payload::Response(response) => Some(response),
            Payload::Value(_) => None,
        }
    }

    /// Borrow the value, if any.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Payload::Value(value) => Some(value),
            Payload::Response(_) => None,
        }
    }

    /// The string representation used as a response body.
    ///
    /// Strings render bare, `null` renders empty, responses render their body
    /// and every other value renders as compact JSON.
    pub fn render(&self) -> String {
        match self {
            Payload::Value(Value::Null) => String::new(),
            Payload::Value(Value::String(text)) => text.clone(),
            Payload::Value(value) => value.to_string(),
            Payload::Response(response) => response.body().to_owned(),
        }
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<Response> for Payload {
    fn from(response: Response) -> Self {
        Payload::Response(response)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Value(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Value(Value::String(text))
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Value(Value::String(text.to_owned()))
    }
}

/// Conversion of handler return values into a [`Payload`].
///
/// # Default Implementations
///
/// - `Payload`, `Response`, `serde_json::Value`, `String`, `&'static str`
/// - `()` → the empty payload
/// - `Result<T, E>` → delegates to `T`, or fails with [`InvokeError::Handler`]
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from an action",
    label = "missing `IntoPayload` implementation",
    note = "Actions must return a type implementing `IntoPayload`."
)]
pub trait IntoPayload {
    /// Convert the return value.
    fn into_payload(self) -> Result<Payload, InvokeError>;
}

impl IntoPayload for Payload {
    fn into_payload(self) -> Result<Payload, InvokeError> {
        Ok(self)
    }
}

impl IntoPayload for Response {
    fn into_payload(self) -> Result<Payload, InvokeError> {
        Ok(Payload::Response(self))
    }
}

impl IntoPayload for Value {
    fn into_payload(self) -> Result<Payload, InvokeError> {
        Ok(Payload::Value(self))
    }
}

impl IntoPayload for String {
    fn into_payload(self) -> Result<Payload, InvokeError> {
        Ok(self.into())
    }
}

impl IntoPayload for &'static str {
    fn into_payload(self) -> Result<Payload, InvokeError> {
        Ok(self.into())
    }
}

impl IntoPayload for () {
    fn into_payload(self) -> Result<Payload, InvokeError> {
        Ok(Payload::null())
    }
}

impl<T, E> IntoPayload for Result<T, E>
where
    T: IntoPayload,
    E: Into<BoxError>,
{
    fn into_payload(self) -> Result<Payload, InvokeError> {
        match self {
            Ok(value) => value.into_payload(),
            Err(err) => Err(InvokeError::Handler(err.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    #[test]
    fn test_render() {
        assert_eq!(Payload::from("ok").render(), "ok");
        assert_eq!(Payload::null().render(), "");
        assert_eq!(Payload::from(json!(42)).render(), "42");
        assert_eq!(Payload::from(json!({"a": [1, 2]})).render(), r#"{"a":[1,2]}"#);
        assert_eq!(Payload::from(Response::ok("body")).render(), "body");
    }

    #[test]
    fn test_result_conversion() {
        let ok: Result<&'static str, AppError> = Ok("fine");
        assert_eq!(ok.into_payload().unwrap(), Payload::from("fine"));

        let failed: Result<&'static str, AppError> = Err(AppError::new("nope", 403));
        let err = failed.into_payload().unwrap_err();
        assert!(!err.is_invalid_callback());
        assert_eq!(err.to_string(), "nope");
    }
}
