//! # The Core Listener
//!
//! [`CoreListener`] subscribes to all four lifecycle stages and carries the
//! default behavior of the dispatch core:
//!
//! - **Init**: open the request's capture scope
//! - **Callback**: instantiate controller classes and store the callback
//! - **Result**: run the format hook and produce the response. Captured
//!   output is embedded by the formatter, or flushed to the sink when there
//!   is none
//! - **Exception**: convert the error into a response
//!
//! The listener holds no per-request state. Everything a request needs lives
//! in its [`Context`] and in the events passed through.

use crate::{adapter::transform_callback, config::ListenerConfig};
use http::StatusCode;
use serde_json::Value;
use vestibule_core::{
    BoxError, Callback, CallbackEvent, Context, DispatchError, ExceptionEvent, Hook, HookResult,
    InitEvent, InvokeError, Payload, ResultEvent,
};

/// Outcome of running a handler's format hook.
#[derive(Debug)]
pub enum HookOutcome {
    /// The hook ran and produced a new result.
    Replaced(Payload),
    /// The handler has no hook for this format.
    Absent,
    /// The hook ran and failed.
    Failed(InvokeError),
}

/// Run the format hook named by `callback` with `result` as its argument.
pub async fn run_format_hook(callback: &Callback, result: Payload) -> HookOutcome {
    match callback.execute(vec![result]).await {
        Ok(replaced) => HookOutcome::Replaced(replaced),
        Err(err) if err.is_invalid_callback() => HookOutcome::Absent,
        Err(err) => HookOutcome::Failed(err),
    }
}

/// Map an error code to a response status.
///
/// Codes outside `100..=599` become `fallback`.
pub fn clamp_status(code: i64, fallback: StatusCode) -> StatusCode {
    u16::try_from(code)
        .ok()
        .filter(|code| (100..=599).contains(code))
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(fallback)
}

/// The default subscriber of every lifecycle stage.
#[derive(Debug, Clone, Default)]
pub struct CoreListener {
    config: ListenerConfig,
}

impl CoreListener {
    /// Create a listener with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a listener with the given settings.
    pub fn with_config(config: ListenerConfig) -> Self {
        Self { config }
    }

    /// The listener settings.
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Open the request's capture scope.
    pub fn on_init(&self, event: &mut InitEvent, context: &mut Context) {
        if self.config.capture_output {
            event.set_capture(context.output().begin());
        }
    }

    /// Normalize the callback and store it in the context.
    pub fn on_callback(&self, event: &mut CallbackEvent, context: &mut Context) -> Result<(), BoxError> {
        transform_callback(event.callback_mut(), context, &self.config.action_suffix)?;
        context.set_callback(event.callback().clone());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            method = %event.callback().method(),
            target = ?event.callback().target(),
            "callback normalized"
        );
        Ok(())
    }

    /// Produce the response for the raw result.
    pub async fn on_result(&self, event: &mut ResultEvent, context: &mut Context) -> Result<(), BoxError> {
        let Some(kind) = context.formatter().map(|formatter| formatter.kind()) else {
            if let Some(scope) = event.take_capture() {
                scope.flush();
            }
            let response = match event.result() {
                Payload::Response(response) => response.clone(),
                raw => context
                    .response_factory()
                    .create(raw.render(), self.config.success_status()),
            };
            event.set_response(response);
            return Ok(());
        };

        let callback = context.callback_mut().ok_or(DispatchError::MissingCallback)?;
        if callback.method().is_empty() {
            return Ok(());
        }

        let outcome = match callback.hook_name_for(&kind, &self.config.action_suffix) {
            Some(hook) => {
                callback.set_method(hook);
                let hook = callback.clone();
                run_format_hook(&hook, event.result().clone()).await
            }
            None => HookOutcome::Absent,
        };

        let result = match outcome {
            HookOutcome::Replaced(result) => result,
            HookOutcome::Absent => event.result().clone(),
            HookOutcome::Failed(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, format = %kind, "format hook failed, keeping raw result");
                #[cfg(not(feature = "tracing"))]
                let _ = err;
                event.result().clone()
            }
        };

        if let Some(scope) = event.take_capture() {
            if context.output().has_passthrough() {
                scope.flush();
            } else {
                let buffered = scope.finish();
                if !buffered.is_empty() {
                    self.inject_buffered(context, buffered);
                }
            }
        }

        let Some(formatter) = context.formatter_mut() else {
            return Ok(());
        };
        let response = formatter.transform(result).map_err(|source| DispatchError::Format {
            kind: kind.to_string(),
            source,
        })?;
        event.set_response(response);
        Ok(())
    }

    fn inject_buffered(&self, context: &mut Context, buffered: String) {
        let Some(formatter) = context.formatter_mut() else {
            return;
        };
        let accepted = formatter.set_value(&self.config.buffered_key, Value::String(buffered));

        #[cfg(feature = "tracing")]
        {
            if !accepted {
                tracing::debug!(format = %formatter.kind(), "formatter does not accept buffered output");
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = accepted;
    }

    /// Convert the error into a response unless one is already set.
    pub fn on_exception(&self, event: &mut ExceptionEvent, context: &mut Context) {
        if event.response().is_some() {
            return;
        }
        let code = event.code();
        let status = clamp_status(code, self.config.fallback_status());

        #[cfg(feature = "tracing")]
        tracing::debug!(code, status = status.as_u16(), error = %event.message(), "converting error");

        let response = context.response_factory().create(event.message(), status);
        event.set_response(response);
    }
}

impl Hook<InitEvent> for CoreListener {
    async fn on_event(&self, event: &mut InitEvent, context: &mut Context) -> Result<HookResult, BoxError> {
        self.on_init(event, context);
        Ok(HookResult::Next)
    }
}

impl Hook<CallbackEvent> for CoreListener {
    async fn on_event(&self, event: &mut CallbackEvent, context: &mut Context) -> Result<HookResult, BoxError> {
        self.on_callback(event, context)?;
        Ok(HookResult::Next)
    }
}

impl Hook<ResultEvent> for CoreListener {
    async fn on_event(&self, event: &mut ResultEvent, context: &mut Context) -> Result<HookResult, BoxError> {
        self.on_result(event, context).await?;
        Ok(HookResult::Next)
    }
}

impl Hook<ExceptionEvent> for CoreListener {
    async fn on_event(&self, event: &mut ExceptionEvent, context: &mut Context) -> Result<HookResult, BoxError> {
        self.on_exception(event, context);
        Ok(HookResult::Next)
    }
}
