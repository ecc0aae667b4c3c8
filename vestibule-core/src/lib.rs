//! # vestibule-core
//!
//! Core types and traits for the Vestibule request dispatch core.
//!
//! Vestibule sits between a resolved callback and the final response of a
//! single request. It is driven by four lifecycle stages, each represented by
//! a typed event:
//!
//! ## Init ([`InitEvent`])
//!
//! Opens an output-capture scope. The scope is an explicit [`CaptureScope`]
//! handle that travels with the request and is released when dropped.
//!
//! ## Callback ([`CallbackEvent`])
//!
//! Normalizes the resolved [`Callback`]: controller classes are instantiated
//! and entry-point method names receive their `Action` suffix.
//!
//! ## Result ([`ResultEvent`])
//!
//! Turns the raw [`Payload`] returned by the handler into a [`Response`],
//! either directly or through the request's [`Formatter`].
//!
//! ## Exception ([`ExceptionEvent`])
//!
//! Converts an uncaught error into a [`Response`] with a valid status code.
//!
//! # Seams
//!
//! - [`Hook`] / [`DynHook`] - subscribers to a lifecycle stage
//! - [`Actions`] / [`Controller`] - invokable handler types
//! - [`Formatter`] - pluggable response formatting
//! - [`ResponseFactory`] - the configured response type
//!
//! # Error Types
//!
//! - [`DispatchError`] - failures of the dispatch core itself
//! - [`InvokeError`] - failures while invoking a callback
//! - [`AppError`] - application errors carrying a status code

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod callback;
mod context;
mod controller;
mod error;
mod event;
mod formatter;
mod hook;
mod naming;
mod output;
mod payload;
mod response;

// Re-exports
pub use callback::{Arguments, Callback, ClassRef, ControllerFactory, Function, Instance, Target};
pub use context::{Context, Request, keys};
pub use controller::{Actions, Controller};
pub use error::{AppError, BoxError, DispatchError, InvokeError, error_code};
pub use event::{
    CallbackEvent, Event, ExceptionEvent, InitEvent, LifecycleEvent, ResultEvent, Stage,
};
pub use formatter::{FormatKind, Formatter};
pub use hook::{DynHook, Hook, HookResult};
pub use naming::{model_name, singularize};
pub use output::{CaptureScope, OutputBuffer, ScopeKind};
pub use payload::{IntoPayload, Payload};
pub use response::{DEFAULT_REDIRECT_STATUS, PlainResponses, Response, ResponseFactory};
