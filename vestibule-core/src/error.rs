//! Error types for Vestibule.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`DispatchError`] - Errors raised by the dispatch core
//! - [`InvokeError`] - Errors raised while invoking a callback
//! - [`AppError`] - Application errors with an integer code

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the dispatch core itself.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A caller supplied an argument outside the accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A controller had to be constructed but the context holds no request.
    #[error("no request registered in the context")]
    MissingRequest,

    /// The result stage ran before a callback was registered.
    #[error("no callback registered in the context")]
    MissingCallback,

    /// The lifecycle completed without any stage setting a response.
    #[error("dispatch produced no response")]
    NoResponse,

    /// The formatter failed to transform the result.
    #[error("formatter `{kind}` failed to transform the result")]
    Format {
        /// The kind of the failing formatter.
        kind: String,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}

/// Errors that can occur while invoking a [`Callback`](crate::Callback).
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The callback has no target at all.
    #[error("callback has no target")]
    NoTarget,

    /// The target is a class reference that was never instantiated.
    #[error("class `{0}` has not been instantiated")]
    Uninstantiated(String),

    /// The target does not expose the requested method.
    #[error("method `{method}` does not exist on `{target}`")]
    MissingMethod {
        /// Type name of the target.
        target: String,
        /// The method that was requested.
        method: String,
    },

    /// The method exists but rejected its arguments.
    #[error("invalid arguments for `{method}`: {reason}")]
    InvalidArguments {
        /// The method that was invoked.
        method: String,
        /// Why the arguments were rejected.
        reason: String,
    },

    /// The handler ran and failed.
    #[error(transparent)]
    Handler(BoxError),
}

impl InvokeError {
    /// Returns `true` when the callback could not be invoked at all.
    ///
    /// Handler failures are not invalid callbacks: the method was found and
    /// ran to completion with an error.
    pub fn is_invalid_callback(&self) -> bool {
        !matches!(self, InvokeError::Handler(_))
    }
}

impl From<BoxError> for InvokeError {
    fn from(err: BoxError) -> Self {
        InvokeError::Handler(err)
    }
}

/// An application error carrying a message and an integer code.
///
/// The code conventionally holds an HTTP status. The exception stage clamps
/// codes outside `100..=599` to a server error.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AppError {
    message: String,
    code: i64,
    #[source]
    source: Option<BoxError>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(message: impl Into<String>, code: i64) -> Self {
        Self {
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Attach the error that caused this one.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The raw, unclamped code.
    pub fn code(&self) -> i64 {
        self.code
    }
}

/// Extract the integer code of an error.
///
/// [`AppError`]s report their own code, handler failures are unwrapped, and
/// everything else reports `0`.
pub fn error_code(error: &(dyn std::error::Error + 'static)) -> i64 {
    if let Some(app) = error.downcast_ref::<AppError>() {
        return app.code();
    }
    if let Some(InvokeError::Handler(inner)) = error.downcast_ref::<InvokeError>() {
        return error_code(inner.as_ref());
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_code() {
        let err = AppError::new("not here", 404);
        assert_eq!(err.to_string(), "not here");
        assert_eq!(error_code(&err), 404);
    }

    #[test]
    fn test_code_through_handler_failure() {
        let err = InvokeError::Handler(Box::new(AppError::new("gone", 410)));
        assert_eq!(err.to_string(), "gone");
        assert_eq!(error_code(&err), 410);
        assert!(!err.is_invalid_callback());
    }

    #[test]
    fn test_foreign_errors_have_no_code() {
        let err = DispatchError::NoResponse;
        assert_eq!(error_code(&err), 0);
        let missing = InvokeError::MissingMethod {
            target: "Posts".into(),
            method: "indexJson".into(),
        };
        assert!(missing.is_invalid_callback());
        assert_eq!(error_code(&missing), 0);
    }
}
