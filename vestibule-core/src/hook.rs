//! # Stage Subscribers (Hook)
//!
//! A hook subscribes to one lifecycle stage. It receives the stage's event
//! and the request context by mutable reference, may change either, and
//! decides whether later hooks of the same stage still run.
//!
//! # Use Cases
//!
//! - The core listener, which normalizes callbacks and builds responses
//! - Observing events (logging, tracing)
//! - Short-circuiting a stage with a ready-made response
//!
//! # Static vs Dynamic Dispatch
//!
//! [`Hook`] uses native `async fn` for static dispatch. Registries store hooks
//! as [`DynHook`] trait objects.

use crate::{context::Context, error::BoxError, event::LifecycleEvent};
use futures::future::BoxFuture;
use std::{future::Future, sync::Arc};

/// Result of hook execution indicating whether to continue or stop propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookResult {
    /// Continue with the next hook of this stage.
    Next,
    /// The stage is complete; later hooks of this stage are skipped.
    Stop,
}

/// A subscriber to the lifecycle stage of `E`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Hook<{E}>`",
    label = "missing `Hook` implementation",
    note = "Hooks must implement `on_event` for the specific event type `{E}`."
)]
pub trait Hook<E: LifecycleEvent>: Send + Sync + 'static {
    /// Called when the stage runs.
    fn on_event(
        &self,
        event: &mut E,
        context: &mut Context,
    ) -> impl Future<Output = Result<HookResult, BoxError>> + Send;
}

/// Dynamic object-safe version of [`Hook`].
pub trait DynHook<E: LifecycleEvent>: Send + Sync + 'static {
    /// Called when the stage runs (dynamic dispatch version).
    fn on_event_dyn<'a>(
        &'a self,
        event: &'a mut E,
        context: &'a mut Context,
    ) -> BoxFuture<'a, Result<HookResult, BoxError>>;
}

// Blanket implementation: Any type implementing Hook implements DynHook automatically.
impl<E: LifecycleEvent, T: Hook<E>> DynHook<E> for T {
    fn on_event_dyn<'a>(
        &'a self,
        event: &'a mut E,
        context: &'a mut Context,
    ) -> BoxFuture<'a, Result<HookResult, BoxError>> {
        Box::pin(self.on_event(event, context))
    }
}

// Allow boxed hooks to be used where Hook is expected.
impl<E: LifecycleEvent> Hook<E> for Box<dyn DynHook<E>> {
    async fn on_event(&self, event: &mut E, context: &mut Context) -> Result<HookResult, BoxError> {
        (**self).on_event_dyn(event, context).await
    }
}

impl<E: LifecycleEvent> Hook<E> for Arc<dyn DynHook<E>> {
    async fn on_event(&self, event: &mut E, context: &mut Context) -> Result<HookResult, BoxError> {
        (**self).on_event_dyn(event, context).await
    }
}
