//! Lifecycle events.
//!
//! Each stage of a request has its own event type owning exactly the state
//! that stage may change. Events are created by the host for one request,
//! handed to the stage's hooks by `&mut`, and dropped afterwards.

use crate::{
    callback::Callback,
    error::{BoxError, error_code},
    output::CaptureScope,
    payload::Payload,
    response::Response,
};
use std::fmt;

/// The lifecycle stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Request setup.
    Init,
    /// Callback normalization.
    Callback,
    /// Raw result formatting.
    Result,
    /// Error recovery.
    Exception,
}

impl Stage {
    /// The event name of this stage.
    pub const fn name(self) -> &'static str {
        match self {
            Stage::Init => "core.init",
            Stage::Callback => "core.callback",
            Stage::Result => "core.result",
            Stage::Exception => "core.exception",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A marker trait for lifecycle event types.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a lifecycle event",
    label = "must implement `LifecycleEvent`",
    note = "Hooks subscribe to `InitEvent`, `CallbackEvent`, `ResultEvent` or `ExceptionEvent`."
)]
pub trait LifecycleEvent: Send + Sync + 'static {
    /// The stage this event belongs to.
    const STAGE: Stage;
}

/// The init stage: sets up the request.
#[derive(Debug, Default)]
pub struct InitEvent {
    capture: Option<CaptureScope>,
}

impl InitEvent {
    /// Create an init event.
    pub fn new() -> Self {
        Self::default()
    }

    /// The capture scope opened for this request.
    pub fn capture(&self) -> Option<&CaptureScope> {
        self.capture.as_ref()
    }

    /// Record the request's capture scope.
    pub fn set_capture(&mut self, scope: CaptureScope) {
        self.capture = Some(scope);
    }

    /// Take the capture scope so it can travel to later stages.
    pub fn take_capture(&mut self) -> Option<CaptureScope> {
        self.capture.take()
    }
}

impl LifecycleEvent for InitEvent {
    const STAGE: Stage = Stage::Init;
}

/// The callback stage: carries the callback being normalized.
#[derive(Debug)]
pub struct CallbackEvent {
    callback: Callback,
}

impl CallbackEvent {
    /// Create a callback event.
    pub fn new(callback: Callback) -> Self {
        Self { callback }
    }

    /// The callback.
    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    /// Mutable access to the callback.
    pub fn callback_mut(&mut self) -> &mut Callback {
        &mut self.callback
    }

    /// Replace the callback.
    pub fn set_callback(&mut self, callback: Callback) {
        self.callback = callback;
    }

    /// Consume the event, returning the callback.
    pub fn into_callback(self) -> Callback {
        self.callback
    }
}

impl LifecycleEvent for CallbackEvent {
    const STAGE: Stage = Stage::Callback;
}

/// The result stage: turns the raw result into a response.
#[derive(Debug)]
pub struct ResultEvent {
    result: Payload,
    response: Option<Response>,
    capture: Option<CaptureScope>,
}

impl ResultEvent {
    /// Create a result event for a raw result.
    pub fn new(result: impl Into<Payload>) -> Self {
        Self {
            result: result.into(),
            response: None,
            capture: None,
        }
    }

    /// Attach the request's capture scope.
    pub fn with_capture(mut self, scope: Option<CaptureScope>) -> Self {
        self.capture = scope;
        self
    }

    /// The raw result.
    pub fn result(&self) -> &Payload {
        &self.result
    }

    /// Replace the raw result.
    pub fn set_result(&mut self, result: impl Into<Payload>) {
        self.result = result.into();
    }

    /// The response, if a stage has set one.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Set the response.
    pub fn set_response(&mut self, response: Response) {
        self.response = Some(response);
    }

    /// Take the response out of the event.
    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }

    /// The capture scope, if still attached.
    pub fn capture(&self) -> Option<&CaptureScope> {
        self.capture.as_ref()
    }

    /// Take the capture scope.
    pub fn take_capture(&mut self) -> Option<CaptureScope> {
        self.capture.take()
    }
}

impl LifecycleEvent for ResultEvent {
    const STAGE: Stage = Stage::Result;
}

/// The exception stage: converts an error into a response.
#[derive(Debug)]
pub struct ExceptionEvent {
    error: BoxError,
    response: Option<Response>,
    capture: Option<CaptureScope>,
}

impl ExceptionEvent {
    /// Create an exception event.
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self {
            error: error.into(),
            response: None,
            capture: None,
        }
    }

    /// Attach the request's capture scope.
    pub fn with_capture(mut self, scope: Option<CaptureScope>) -> Self {
        self.capture = scope;
        self
    }

    /// The originating error.
    pub fn error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.error.as_ref()
    }

    /// The error message.
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// The raw error code. See [`error_code`].
    pub fn code(&self) -> i64 {
        error_code(self.error.as_ref())
    }

    /// The response, if a stage has set one.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Set the response.
    pub fn set_response(&mut self, response: Response) {
        self.response = Some(response);
    }

    /// Take the response out of the event.
    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }

    /// Take the capture scope.
    pub fn take_capture(&mut self) -> Option<CaptureScope> {
        self.capture.take()
    }
}

impl LifecycleEvent for ExceptionEvent {
    const STAGE: Stage = Stage::Exception;
}

/// Any lifecycle event.
#[derive(Debug)]
pub enum Event {
    /// See [`InitEvent`].
    Init(InitEvent),
    /// See [`CallbackEvent`].
    Callback(CallbackEvent),
    /// See [`ResultEvent`].
    Result(ResultEvent),
    /// See [`ExceptionEvent`].
    Exception(ExceptionEvent),
}

impl Event {
    /// The stage of this event.
    pub fn stage(&self) -> Stage {
        match self {
            Event::Init(_) => Stage::Init,
            Event::Callback(_) => Stage::Callback,
            Event::Result(_) => Stage::Result,
            Event::Exception(_) => Stage::Exception,
        }
    }

    /// The response produced so far, for the stages that carry one.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Event::Result(event) => event.response(),
            Event::Exception(event) => event.response(),
            Event::Init(_) | Event::Callback(_) => None,
        }
    }
}

impl From<InitEvent> for Event {
    fn from(event: InitEvent) -> Self {
        Event::Init(event)
    }
}

impl From<CallbackEvent> for Event {
    fn from(event: CallbackEvent) -> Self {
        Event::Callback(event)
    }
}

impl From<ResultEvent> for Event {
    fn from(event: ResultEvent) -> Self {
        Event::Result(event)
    }
}

impl From<ExceptionEvent> for Event {
    fn from(event: ExceptionEvent) -> Self {
        Event::Exception(event)
    }
}
