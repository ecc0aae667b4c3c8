//! Standard formatters.

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;
