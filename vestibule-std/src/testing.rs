//! Testing utilities for Vestibule.
//!
//! This module provides utilities to make testing hooks, formatters, and
//! controllers easier.
//!
//! # Features
//!
//! - [`RecordingHook`]: A hook that records the stages it observes
//! - [`StubFormatter`]: A formatter with inspectable values
//! - [`EchoController`]: A controller with a fixed set of entry points

use serde_json::{Map, Value, json};
use std::sync::Arc;
use vestibule_core::{
    Actions, AppError, Arguments, BoxError, Context, Controller, FormatKind, Formatter, Hook,
    HookResult, InvokeError, LifecycleEvent, OutputBuffer, Payload, Request, Response, Stage,
};
use futures::future::BoxFuture;
use parking_lot::Mutex;

// ============================================================================
// Recording Hook
// ============================================================================

/// A hook that records the stage of every event it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHook::new();
/// let dispatcher = Dispatcher::builder().on_all(recorder.clone()).build();
///
/// kernel.handle(&mut context, callback).await;
///
/// assert_eq!(recorder.stages(), vec![Stage::Init, Stage::Callback, Stage::Result]);
/// ```
#[derive(Debug, Clone)]
pub struct RecordingHook {
    stages: Arc<Mutex<Vec<Stage>>>,
    result: HookResult,
}

impl RecordingHook {
    /// Create a new recording hook that returns `Next`.
    pub fn new() -> Self {
        Self::with_result(HookResult::Next)
    }

    /// Create a recording hook that returns a specific result.
    pub fn with_result(result: HookResult) -> Self {
        Self {
            stages: Arc::new(Mutex::new(Vec::new())),
            result,
        }
    }

    /// The recorded stages, in order.
    pub fn stages(&self) -> Vec<Stage> {
        self.stages.lock().clone()
    }

    /// Get the number of recorded events.
    pub fn count(&self) -> usize {
        self.stages.lock().len()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.stages.lock().clear();
    }
}

impl Default for RecordingHook {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: LifecycleEvent> Hook<E> for RecordingHook {
    async fn on_event(&self, _event: &mut E, _context: &mut Context) -> Result<HookResult, BoxError> {
        self.stages.lock().push(E::STAGE);
        Ok(self.result)
    }
}

// ============================================================================
// Stub Formatter
// ============================================================================

/// A formatter rendering `"{kind}:{result}"`.
///
/// Clones share their values, so a test can keep one clone and inspect what
/// the result stage injected into the other.
#[derive(Debug, Clone)]
pub struct StubFormatter {
    kind: FormatKind,
    values: Arc<Mutex<Map<String, Value>>>,
    failure: Option<&'static str>,
}

impl StubFormatter {
    /// Create a stub formatter of the given kind.
    pub fn new(kind: FormatKind) -> Self {
        Self {
            kind,
            values: Arc::new(Mutex::new(Map::new())),
            failure: None,
        }
    }

    /// Create a stub formatter whose transform always fails.
    pub fn failing(kind: FormatKind, message: &'static str) -> Self {
        Self {
            failure: Some(message),
            ..Self::new(kind)
        }
    }

    /// The values set so far.
    pub fn values(&self) -> Map<String, Value> {
        self.values.lock().clone()
    }
}

impl Formatter for StubFormatter {
    fn kind(&self) -> FormatKind {
        self.kind.clone()
    }

    fn transform(&mut self, result: Payload) -> Result<Response, BoxError> {
        if let Some(message) = self.failure {
            return Err(message.into());
        }
        Ok(Response::ok(format!("{}:{}", self.kind, result.render())))
    }

    fn set_value(&mut self, name: &str, value: Value) -> bool {
        self.values.lock().insert(name.to_owned(), value);
        true
    }
}

// ============================================================================
// Echo Controller
// ============================================================================

/// A controller with a fixed set of entry points.
///
/// | method | behavior |
/// |---|---|
/// | `indexAction` | returns the request body |
/// | `indexJson` | wraps its argument as `{"wrapped": ...}` |
/// | `brokenAction` | returns `"broken"` |
/// | `brokenJson` | fails with code 500 |
/// | `failAction` | writes its arguments to the output buffer, then fails with `Not Found` and code 404 |
/// | `echoAction` | writes its arguments to the output buffer and returns the first |
/// | `redirectAction` | redirects to `/login` |
/// | `countAction` | returns how often it was called on this instance |
pub struct EchoController {
    request: Arc<Request>,
    output: OutputBuffer,
    calls: u64,
}

impl EchoController {
    const ACTIONS: &'static [&'static str] = &[
        "indexAction",
        "indexJson",
        "brokenAction",
        "brokenJson",
        "failAction",
        "echoAction",
        "redirectAction",
        "countAction",
    ];

    fn dispatch(&mut self, method: &str, arguments: Arguments) -> Result<Payload, InvokeError> {
        match method {
            "indexAction" => Ok(Payload::from(self.request.body().clone())),
            "indexJson" => match arguments.into_iter().next() {
                Some(Payload::Value(value)) => Ok(Payload::Value(json!({ "wrapped": value }))),
                Some(response) => Ok(response),
                None => Err(InvokeError::InvalidArguments {
                    method: method.to_owned(),
                    reason: "expected the raw result".to_owned(),
                }),
            },
            "brokenAction" => Ok(Payload::from("broken")),
            "brokenJson" => Err(InvokeError::Handler(AppError::new("hook exploded", 500).into())),
            "failAction" => {
                for argument in &arguments {
                    self.output.write(&argument.render());
                }
                Err(InvokeError::Handler(AppError::new("Not Found", 404).into()))
            }
            "echoAction" => {
                for argument in &arguments {
                    self.output.write(&argument.render());
                }
                Ok(arguments.into_iter().next().unwrap_or_default())
            }
            "redirectAction" => self
                .redirect("/login", 302)
                .map(Payload::Response)
                .map_err(|err| InvokeError::Handler(err.into())),
            "countAction" => {
                self.calls += 1;
                Ok(Payload::from(Value::from(self.calls)))
            }
            _ => Err(InvokeError::MissingMethod {
                target: self.type_name().to_owned(),
                method: method.to_owned(),
            }),
        }
    }
}

impl Actions for EchoController {
    fn invoke<'a>(
        &'a mut self,
        method: &'a str,
        arguments: Arguments,
    ) -> BoxFuture<'a, Result<Payload, InvokeError>> {
        Box::pin(async move { self.dispatch(method, arguments) })
    }

    fn has_action(&self, method: &str) -> bool {
        Self::ACTIONS.contains(&method)
    }
}

impl Controller for EchoController {
    fn new(context: &Context, request: Arc<Request>) -> Result<Self, BoxError> {
        Ok(Self {
            request,
            output: context.output().clone(),
            calls: 0,
        })
    }

    fn request(&self) -> &Request {
        &self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vestibule_core::{Callback, ClassRef};

    #[tokio::test]
    async fn test_echo_controller_entry_points() {
        let context = Context::for_request(Request::new("hello".to_owned()));
        let request = context.request().cloned().unwrap();
        let callback = Callback::object(EchoController::new(&context, request).unwrap(), "indexAction");

        assert_eq!(callback.invoke().await.unwrap(), Payload::from("hello"));

        let mut missing = callback.clone();
        missing.set_method("deleteAction");
        assert!(missing.invoke().await.unwrap_err().is_invalid_callback());
        assert_eq!(EchoController::model_name(), "vestibule_std::testing::Echo");
        assert!(ClassRef::controller::<EchoController>().is_controller());
    }

    #[test]
    fn test_stub_formatter() {
        let mut formatter = StubFormatter::new(FormatKind::Json);
        let mut shared = formatter.clone();
        assert!(shared.set_value("buffered", Value::from("x")));
        assert_eq!(formatter.values().len(), 1);
        assert_eq!(formatter.transform(Payload::from("a")).unwrap().body(), "Json:a");
        assert!(StubFormatter::failing(FormatKind::Text, "nope").transform(Payload::null()).is_err());
    }
}
