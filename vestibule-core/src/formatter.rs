//! Pluggable response formatting.

use crate::{error::BoxError, payload::Payload, response::Response};
use serde_json::Value;
use std::{borrow::Cow, fmt};

/// The output format a [`Formatter`] produces.
///
/// The kind selects the handler hook run before formatting: an entry point
/// `indexAction` has the hook `indexJson` under [`FormatKind::Json`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// JSON documents.
    Json,
    /// HTML pages.
    Html,
    /// Plain text.
    Text,
    /// Any other format, named by its hook suffix.
    Custom(Cow<'static, str>),
}

impl FormatKind {
    /// A custom format.
    pub fn custom(suffix: impl Into<Cow<'static, str>>) -> Self {
        FormatKind::Custom(suffix.into())
    }

    /// The suffix of handler hooks for this format.
    pub fn hook_suffix(&self) -> &str {
        match self {
            FormatKind::Json => "Json",
            FormatKind::Html => "Html",
            FormatKind::Text => "Text",
            FormatKind::Custom(suffix) => suffix,
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hook_suffix())
    }
}

/// Converts a raw result into the final [`Response`].
///
/// A formatter is optional per request. When present, the result stage runs
/// the handler's format hook, injects captured output through
/// [`set_value`](Formatter::set_value), and then calls
/// [`transform`](Formatter::transform).
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Formatter`",
    label = "missing `Formatter` implementation",
    note = "Formatters must implement `kind` and `transform`."
)]
pub trait Formatter: Send + Sync + 'static {
    /// The format this formatter produces.
    fn kind(&self) -> FormatKind;

    /// Produce the final response.
    ///
    /// Values set since the previous call are consumed, so a formatter
    /// reused across requests never carries them into a later response.
    fn transform(&mut self, result: Payload) -> Result<Response, BoxError>;

    /// Store a named value to embed in the next response.
    ///
    /// Returns `false` if this formatter does not accept values.
    fn set_value(&mut self, name: &str, value: Value) -> bool {
        let _ = (name, value);
        false
    }
}
