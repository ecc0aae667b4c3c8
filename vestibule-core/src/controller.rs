//! Handler capabilities.
//!
//! [`Actions`] is what makes an object invokable by name. [`Controller`]
//! adds construction from the request context, which lets the callback stage
//! instantiate a handler class on demand.

use crate::{
    callback::Arguments,
    context::{Context, Request},
    error::{BoxError, DispatchError, InvokeError},
    naming::model_name,
    payload::Payload,
    response::Response,
};
use futures::future::BoxFuture;
use std::sync::Arc;

/// An object exposing a closed set of named entry points.
///
/// Implementations are usually generated by the `#[actions]` attribute, which
/// builds the method table from an `impl` block.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Actions`",
    label = "missing `Actions` implementation",
    note = "Annotate an `impl` block of `{Self}` with `#[actions]`, or implement `invoke` and `has_action`."
)]
pub trait Actions: Send + 'static {
    /// Invoke the entry point named `method`.
    fn invoke<'a>(
        &'a mut self,
        method: &'a str,
        arguments: Arguments,
    ) -> BoxFuture<'a, Result<Payload, InvokeError>>;

    /// Returns `true` if `method` names an entry point.
    fn has_action(&self, method: &str) -> bool;

    /// Type name used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A request handler that can be constructed by the dispatch core.
///
/// Controllers receive the request context and the current request at
/// construction. Their public entry points follow the `xxxAction` naming
/// convention; per-format hooks follow `xxxJson`, `xxxHtml`, and so on.
pub trait Controller: Actions + Sized {
    /// Construct the controller for one request.
    fn new(context: &Context, request: Arc<Request>) -> Result<Self, BoxError>;

    /// The request being handled.
    fn request(&self) -> &Request;

    /// Create a redirection response. See [`Response::redirect`].
    fn redirect(&self, location: &str, code: u16) -> Result<Response, DispatchError> {
        Response::redirect(location, code)
    }

    /// Name of the data model paired with this controller.
    fn model_name() -> String {
        model_name(std::any::type_name::<Self>())
    }
}
