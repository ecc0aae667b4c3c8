//! # Request Kernel
//!
//! [`Kernel`] drives one request through the four lifecycle stages:
//!
//! ```text
//! Init -> Callback -> invoke -> Result
//!            \           \        \
//!             +-----------+--------+--> Exception
//! ```
//!
//! Any error raised by a stage or by the handler, and a result stage that
//! ends without a response, is routed to the exception stage. The kernel
//! always produces a [`Response`]. Output captured before a failure is
//! flushed to the sink of the request's [`OutputBuffer`](vestibule_core::OutputBuffer).

use crate::{
    config::KernelConfig,
    listener::{CoreListener, clamp_status},
    registry::{Dispatcher, DispatcherBuilder},
};
use vestibule_core::{
    BoxError, Callback, CallbackEvent, CaptureScope, Context, DispatchError, ExceptionEvent,
    InitEvent, InvokeError, Request, Response, ResultEvent,
};

/// Runs requests through the lifecycle stages.
#[derive(Clone)]
pub struct Kernel {
    config: KernelConfig,
    dispatcher: Dispatcher,
}

impl Kernel {
    /// Create a kernel whose only hook is the [`CoreListener`].
    pub fn new(config: KernelConfig) -> Self {
        let dispatcher = Self::default_hooks(&config).build();
        Self { config, dispatcher }
    }

    /// Create a kernel running the given hooks.
    ///
    /// The dispatcher replaces the default hooks entirely. Start from
    /// [`default_hooks`](Self::default_hooks) to keep the core behavior.
    pub fn with_dispatcher(config: KernelConfig, dispatcher: Dispatcher) -> Self {
        Self { config, dispatcher }
    }

    /// A dispatcher builder with the [`CoreListener`] subscribed to every stage.
    pub fn default_hooks(config: &KernelConfig) -> DispatcherBuilder {
        Dispatcher::builder().on_all(CoreListener::with_config(config.listener.clone()))
    }

    /// The kernel settings.
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// The registered hooks.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Create the context of a new request, seeded with the configured
    /// parameters.
    pub fn context(&self, request: Request) -> Context {
        let mut context = Context::for_request(request);
        for (name, value) in &self.config.parameters {
            context.set_parameter(name.clone(), value.clone());
        }
        context
    }

    /// Handle one request.
    pub async fn handle(&self, context: &mut Context, callback: Callback) -> Response {
        #[cfg(feature = "tracing")]
        tracing::debug!(method = %callback.method(), "handling request");

        let mut init = InitEvent::new();
        if let Err(err) = self.dispatcher.init.dispatch(&mut init, context).await {
            return self.recover(err, init.take_capture(), context).await;
        }
        let capture = init.take_capture();

        let mut event = CallbackEvent::new(callback);
        if let Err(err) = self.dispatcher.callback.dispatch(&mut event, context).await {
            return self.recover(err, capture, context).await;
        }
        let callback = event.into_callback();

        let result = match callback.invoke().await {
            Ok(result) => result,
            Err(err) => return self.recover(handler_error(err), capture, context).await,
        };

        let mut event = ResultEvent::new(result).with_capture(capture);
        if let Err(err) = self.dispatcher.result.dispatch(&mut event, context).await {
            let capture = event.take_capture();
            return self.recover(err, capture, context).await;
        }
        match event.take_response() {
            Some(response) => response,
            None => {
                let capture = event.take_capture();
                self.recover(DispatchError::NoResponse.into(), capture, context).await
            }
        }
    }

    async fn recover(
        &self,
        error: BoxError,
        capture: Option<CaptureScope>,
        context: &mut Context,
    ) -> Response {
        #[cfg(feature = "tracing")]
        tracing::warn!(error = %error, "request failed");

        let mut event = ExceptionEvent::new(error).with_capture(capture);
        let outcome = self.dispatcher.exception.dispatch(&mut event, context).await;
        if let Some(scope) = event.take_capture() {
            scope.flush();
        }

        if let Some(response) = event.take_response() {
            return response;
        }

        #[cfg(feature = "tracing")]
        {
            if let Err(err) = &outcome {
                tracing::warn!(error = %err, "exception stage failed");
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = outcome;

        let status = clamp_status(event.code(), self.config.listener.fallback_status());
        context.response_factory().create(event.message(), status)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}

fn handler_error(err: InvokeError) -> BoxError {
    match err {
        InvokeError::Handler(inner) => inner,
        other => other.into(),
    }
}
