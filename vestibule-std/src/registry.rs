//! Runtime hook registration.
//!
//! A [`Registry`] holds the hooks of one stage and runs them in registration
//! order. A [`Dispatcher`] bundles one registry per stage.

use vestibule_core::{
    BoxError, CallbackEvent, Context, DynHook, Event, ExceptionEvent, HookResult, InitEvent,
    LifecycleEvent, ResultEvent,
};
use std::sync::Arc;

/// The hooks of one lifecycle stage.
pub struct Registry<E: LifecycleEvent> {
    hooks: Vec<Arc<dyn DynHook<E>>>,
}

impl<E: LifecycleEvent> Registry<E> {
    /// Dispatch an event to all registered hooks sequentially.
    ///
    /// A hook returning [`HookResult::Stop`] ends the stage. A hook error ends
    /// the stage and is returned.
    pub async fn dispatch(&self, event: &mut E, context: &mut Context) -> Result<HookResult, BoxError> {
        for hook in &self.hooks {
            match hook.on_event_dyn(event, context).await? {
                HookResult::Stop => return Ok(HookResult::Stop),
                HookResult::Next => continue,
            }
        }
        Ok(HookResult::Next)
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns `true` if no hook is registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<E: LifecycleEvent> Default for Registry<E> {
    fn default() -> Self {
        Self { hooks: Vec::new() }
    }
}

impl<E: LifecycleEvent> Clone for Registry<E> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

/// Builder for constructing a Registry.
pub struct RegistryBuilder<E: LifecycleEvent> {
    hooks: Vec<Arc<dyn DynHook<E>>>,
}

impl<E: LifecycleEvent> Default for RegistryBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: LifecycleEvent> RegistryBuilder<E> {
    /// Create a new empty registry builder.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a hook.
    pub fn register<H: DynHook<E>>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Register a shared hook.
    pub fn register_shared(mut self, hook: Arc<dyn DynHook<E>>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Build the registry.
    pub fn build(self) -> Registry<E> {
        Registry { hooks: self.hooks }
    }
}

/// One registry per lifecycle stage.
#[derive(Default, Clone)]
pub struct Dispatcher {
    /// Hooks of [`Stage::Init`](vestibule_core::Stage::Init).
    pub init: Registry<InitEvent>,
    /// Hooks of [`Stage::Callback`](vestibule_core::Stage::Callback).
    pub callback: Registry<CallbackEvent>,
    /// Hooks of [`Stage::Result`](vestibule_core::Stage::Result).
    pub result: Registry<ResultEvent>,
    /// Hooks of [`Stage::Exception`](vestibule_core::Stage::Exception).
    pub exception: Registry<ExceptionEvent>,
}

impl Dispatcher {
    /// Start building a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Dispatch an event to the registry of its stage.
    pub async fn dispatch_event(&self, event: &mut Event, context: &mut Context) -> Result<HookResult, BoxError> {
        match event {
            Event::Init(event) => self.init.dispatch(event, context).await,
            Event::Callback(event) => self.callback.dispatch(event, context).await,
            Event::Result(event) => self.result.dispatch(event, context).await,
            Event::Exception(event) => self.exception.dispatch(event, context).await,
        }
    }
}

/// Builder for a [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    init: RegistryBuilder<InitEvent>,
    callback: RegistryBuilder<CallbackEvent>,
    result: RegistryBuilder<ResultEvent>,
    exception: RegistryBuilder<ExceptionEvent>,
}

impl DispatcherBuilder {
    /// Subscribe a hook to the init stage.
    pub fn on_init<H: DynHook<InitEvent>>(mut self, hook: H) -> Self {
        self.init = self.init.register(hook);
        self
    }

    /// Subscribe a hook to the callback stage.
    pub fn on_callback<H: DynHook<CallbackEvent>>(mut self, hook: H) -> Self {
        self.callback = self.callback.register(hook);
        self
    }

    /// Subscribe a hook to the result stage.
    pub fn on_result<H: DynHook<ResultEvent>>(mut self, hook: H) -> Self {
        self.result = self.result.register(hook);
        self
    }

    /// Subscribe a hook to the exception stage.
    pub fn on_exception<H: DynHook<ExceptionEvent>>(mut self, hook: H) -> Self {
        self.exception = self.exception.register(hook);
        self
    }

    /// Subscribe a hook to all four stages.
    pub fn on_all<H>(self, hook: H) -> Self
    where
        H: DynHook<InitEvent>
            + DynHook<CallbackEvent>
            + DynHook<ResultEvent>
            + DynHook<ExceptionEvent>
            + Clone,
    {
        self.on_init(hook.clone())
            .on_callback(hook.clone())
            .on_result(hook.clone())
            .on_exception(hook)
    }

    /// Build the dispatcher.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            init: self.init.build(),
            callback: self.callback.build(),
            result: self.result.build(),
            exception: self.exception.build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHook;
    use vestibule_core::{Hook, Response, Stage};

    struct Respond(&'static str);

    impl Hook<ResultEvent> for Respond {
        async fn on_event(&self, event: &mut ResultEvent, _context: &mut Context) -> Result<HookResult, BoxError> {
            event.set_response(Response::ok(self.0));
            Ok(HookResult::Stop)
        }
    }

    struct Failing;

    impl Hook<ResultEvent> for Failing {
        async fn on_event(&self, _event: &mut ResultEvent, _context: &mut Context) -> Result<HookResult, BoxError> {
            Err("hook failed".into())
        }
    }

    #[tokio::test]
    async fn test_hooks_run_in_order_until_stop() {
        let recorder = RecordingHook::new();
        let registry = RegistryBuilder::new()
            .register(recorder.clone())
            .register(Respond("first"))
            .register(Respond("second"))
            .register(recorder.clone())
            .build();

        let mut event = ResultEvent::new("raw");
        let mut context = Context::new();
        let result = registry.dispatch(&mut event, &mut context).await.unwrap();

        assert_eq!(result, HookResult::Stop);
        assert_eq!(event.response().unwrap().body(), "first");
        assert_eq!(recorder.stages(), vec![Stage::Result]);
    }

    #[tokio::test]
    async fn test_hook_error_ends_stage() {
        let recorder = RecordingHook::new();
        let registry = RegistryBuilder::new()
            .register(Failing)
            .register(recorder.clone())
            .build();

        let mut event = ResultEvent::new("raw");
        let err = registry.dispatch(&mut event, &mut Context::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "hook failed");
        assert_eq!(recorder.count(), 0);
    }

    #[tokio::test]
    async fn test_dispatcher_routes_by_stage() {
        let recorder = RecordingHook::new();
        let dispatcher = Dispatcher::builder().on_all(recorder.clone()).build();
        let mut context = Context::new();

        for event in [
            Event::from(InitEvent::new()),
            Event::from(ResultEvent::new("x")),
            Event::from(ExceptionEvent::new("boom")),
        ] {
            let mut event = event;
            dispatcher.dispatch_event(&mut event, &mut context).await.unwrap();
        }

        assert_eq!(recorder.stages(), vec![Stage::Init, Stage::Result, Stage::Exception]);
        assert!(dispatcher.callback.len() == 1);
    }
}
