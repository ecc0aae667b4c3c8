//! Logging hook for event observation.

use vestibule_core::{BoxError, Context, Hook, HookResult, LifecycleEvent};

/// A hook that logs every lifecycle event it observes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHook;

impl<E: LifecycleEvent + std::fmt::Debug> Hook<E> for LoggingHook {
    async fn on_event(&self, event: &mut E, context: &mut Context) -> Result<HookResult, BoxError> {
        #[cfg(feature = "tracing")]
        {
            tracing::info!(stage = %E::STAGE, ?event, level = context.output().level(), "Processing event");
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = (event, context);
        }
        Ok(HookResult::Next)
    }
}
