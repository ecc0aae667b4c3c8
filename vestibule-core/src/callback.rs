//! Callbacks: what to invoke, on which target, with which arguments.
//!
//! A [`Callback`] is handed to the dispatch core already resolved. Its
//! [`Target`] is one of:
//!
//! - a [`ClassRef`], a class that has not been instantiated yet
//! - an [`Instance`], a live object implementing [`Actions`]
//! - a [`Function`], a free-standing async function
//!
//! The callback stage turns controller classes into instances; only
//! instances and functions can be invoked.

use crate::{
    context::{Context, Request},
    controller::{Actions, Controller},
    error::{BoxError, InvokeError},
    formatter::FormatKind,
    payload::{IntoPayload, Payload},
};
use futures::{
    future::BoxFuture,
    lock::{Mutex, MutexGuard},
};
use std::{borrow::Cow, fmt, future::Future, sync::Arc};

/// The ordered arguments of a callback.
pub type Arguments = Vec<Payload>;

/// Constructs a controller from the request context.
pub type ControllerFactory = fn(&Context, Arc<Request>) -> Result<Box<dyn Actions>, BoxError>;

fn construct<C: Controller>(context: &Context, request: Arc<Request>) -> Result<Box<dyn Actions>, BoxError> {
    Ok(Box::new(C::new(context, request)?))
}

/// A reference to a class that has not been instantiated.
///
/// Classes with the controller capability carry the constructor used by the
/// callback stage; plain classes carry only their name.
#[derive(Clone)]
pub struct ClassRef {
    name: Cow<'static, str>,
    factory: Option<ControllerFactory>,
}

impl ClassRef {
    /// A class without the controller capability.
    pub fn plain(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            factory: None,
        }
    }

    /// The controller class `C`.
    pub fn controller<C: Controller>() -> Self {
        Self {
            name: Cow::Borrowed(std::any::type_name::<C>()),
            factory: Some(construct::<C>),
        }
    }

    /// The class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if this class can be constructed as a controller.
    pub fn is_controller(&self) -> bool {
        self.factory.is_some()
    }

    /// Construct the controller.
    ///
    /// Plain classes fail with [`InvokeError::Uninstantiated`]. Errors raised
    /// by the controller constructor are returned unchanged.
    pub fn construct(&self, context: &Context, request: Arc<Request>) -> Result<Instance, BoxError> {
        let Some(factory) = self.factory else {
            return Err(InvokeError::Uninstantiated(self.name.to_string()).into());
        };
        factory(context, request).map(Instance::from_boxed)
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRef")
            .field("name", &self.name)
            .field("controller", &self.is_controller())
            .finish()
    }
}

/// A live, shareable handler object.
///
/// Clones refer to the same object, so the instance that served the action
/// also serves the formatting hook of the same request.
#[derive(Clone)]
pub struct Instance {
    type_name: &'static str,
    inner: Arc<Mutex<Box<dyn Actions>>>,
}

impl Instance {
    /// Wrap a handler object.
    pub fn new<A: Actions>(actions: A) -> Self {
        Self::from_boxed(Box::new(actions))
    }

    /// Wrap an already boxed handler object.
    pub fn from_boxed(actions: Box<dyn Actions>) -> Self {
        Self {
            type_name: actions.type_name(),
            inner: Arc::new(Mutex::new(actions)),
        }
    }

    /// Type name of the wrapped object.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Lock the object for invocation.
    pub async fn lock(&self) -> MutexGuard<'_, Box<dyn Actions>> {
        self.inner.lock().await
    }

    /// Returns `true` if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instance").field(&self.type_name).finish()
    }
}

type ActionFn = dyn Fn(Arguments) -> BoxFuture<'static, Result<Payload, InvokeError>> + Send + Sync;

/// A named async function usable as a callback target.
///
/// A function answers only to its own name.
#[derive(Clone)]
pub struct Function {
    name: Cow<'static, str>,
    inner: Arc<ActionFn>,
}

impl Function {
    /// Wrap an async function.
    pub fn new<F, Fut, R>(name: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoPayload + 'static,
    {
        Self {
            name: name.into(),
            inner: Arc::new(move |arguments| {
                let fut = func(arguments);
                Box::pin(async move { fut.await.into_payload() })
            }),
        }
    }

    /// The function name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Function").field(&self.name).finish()
    }
}

/// The target of a [`Callback`].
#[derive(Debug, Clone, Default)]
pub enum Target {
    /// No target; invocation fails.
    #[default]
    None,
    /// A class that has not been instantiated.
    Class(ClassRef),
    /// A live handler object.
    Object(Instance),
    /// A free-standing function.
    Function(Function),
}

/// A descriptor of a target, a method name and the arguments to pass.
#[derive(Debug, Clone, Default)]
pub struct Callback {
    target: Target,
    method: String,
    arguments: Arguments,
}

impl Callback {
    /// Create a callback without arguments.
    pub fn new(target: Target, method: impl Into<String>) -> Self {
        Self {
            target,
            method: method.into(),
            arguments: Vec::new(),
        }
    }

    /// A callback on an uninstantiated class.
    pub fn class(class: ClassRef, method: impl Into<String>) -> Self {
        Self::new(Target::Class(class), method)
    }

    /// A callback on a live object.
    pub fn object<A: Actions>(actions: A, method: impl Into<String>) -> Self {
        Self::new(Target::Object(Instance::new(actions)), method)
    }

    /// A callback on a function; the method is the function name.
    pub fn function(function: Function) -> Self {
        let method = function.name().to_owned();
        Self::new(Target::Function(function), method)
    }

    /// Builder for the argument list.
    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    /// The target.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The uninstantiated class, if the target is one.
    pub fn class_ref(&self) -> Option<&ClassRef> {
        match &self.target {
            Target::Class(class) => Some(class),
            _ => None,
        }
    }

    /// The class name, set only while the target is an uninstantiated class.
    pub fn class_name(&self) -> Option<&str> {
        self.class_ref().map(ClassRef::name)
    }

    /// The live object, if the target is one.
    pub fn instance(&self) -> Option<&Instance> {
        match &self.target {
            Target::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// Replace the target with a live object.
    pub fn set_instance(&mut self, instance: Instance) {
        self.target = Target::Object(instance);
    }

    /// Returns `true` if the target can be invoked directly.
    pub fn is_instantiated(&self) -> bool {
        matches!(self.target, Target::Object(_) | Target::Function(_))
    }

    /// The method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Replace the method name.
    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = method.into();
    }

    /// The arguments.
    pub fn arguments(&self) -> &[Payload] {
        &self.arguments
    }

    /// Replace the arguments.
    pub fn set_arguments(&mut self, arguments: Arguments) {
        self.arguments = arguments;
    }

    /// The name of the formatting hook matching `kind`.
    ///
    /// Only entry points ending in `action_suffix` have hooks: the suffix is
    /// replaced by the formatter's hook suffix, so `indexAction` with a JSON
    /// formatter maps to `indexJson`.
    pub fn hook_name_for(&self, kind: &FormatKind, action_suffix: &str) -> Option<String> {
        let stem = self.method.strip_suffix(action_suffix)?;
        Some(format!("{stem}{}", kind.hook_suffix()))
    }

    /// Invoke the callback with its own arguments.
    pub async fn invoke(&self) -> Result<Payload, InvokeError> {
        self.execute(self.arguments.clone()).await
    }

    /// Invoke the callback with the given arguments.
    pub async fn execute(&self, arguments: Arguments) -> Result<Payload, InvokeError> {
        match &self.target {
            Target::Object(instance) => {
                let mut actions = instance.lock().await;
                if !actions.has_action(&self.method) {
                    return Err(InvokeError::MissingMethod {
                        target: instance.type_name().to_owned(),
                        method: self.method.clone(),
                    });
                }
                actions.invoke(&self.method, arguments).await
            }
            Target::Function(function) => {
                if function.name() != self.method {
                    return Err(InvokeError::MissingMethod {
                        target: function.name().to_owned(),
                        method: self.method.clone(),
                    });
                }
                (function.inner)(arguments).await
            }
            Target::Class(class) => Err(InvokeError::Uninstantiated(class.name().to_owned())),
            Target::None => Err(InvokeError::NoTarget),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeter {
        greeted: usize,
    }

    impl Actions for Greeter {
        fn invoke<'a>(
            &'a mut self,
            method: &'a str,
            arguments: Arguments,
        ) -> BoxFuture<'a, Result<Payload, InvokeError>> {
            Box::pin(async move {
                match method {
                    "helloAction" => {
                        self.greeted += 1;
                        Ok(Payload::from(format!("hello #{}", self.greeted)))
                    }
                    "helloJson" => Ok(arguments.into_iter().next().unwrap_or_default()),
                    other => Err(InvokeError::MissingMethod {
                        target: "Greeter".into(),
                        method: other.into(),
                    }),
                }
            })
        }

        fn has_action(&self, method: &str) -> bool {
            matches!(method, "helloAction" | "helloJson")
        }
    }

    #[test]
    fn test_hook_name_for() {
        let callback = Callback::object(Greeter { greeted: 0 }, "indexAction");
        assert_eq!(
            callback.hook_name_for(&FormatKind::Json, "Action").as_deref(),
            Some("indexJson")
        );
        assert_eq!(
            callback.hook_name_for(&FormatKind::custom("Csv"), "Action").as_deref(),
            Some("indexCsv")
        );

        let plain = Callback::object(Greeter { greeted: 0 }, "index");
        assert_eq!(plain.hook_name_for(&FormatKind::Json, "Action"), None);
    }

    #[tokio::test]
    async fn test_clones_share_the_instance() {
        let callback = Callback::object(Greeter { greeted: 0 }, "helloAction");
        let copy = callback.clone();

        assert_eq!(callback.invoke().await.unwrap().render(), "hello #1");
        assert_eq!(copy.invoke().await.unwrap().render(), "hello #2");
        assert!(callback.instance().unwrap().ptr_eq(copy.instance().unwrap()));
    }

    #[tokio::test]
    async fn test_missing_method() {
        let callback = Callback::object(Greeter { greeted: 0 }, "helloHtml");
        let err = callback.invoke().await.unwrap_err();
        assert!(matches!(err, InvokeError::MissingMethod { .. }));
        assert!(err.is_invalid_callback());
    }

    #[tokio::test]
    async fn test_uninstantiated_and_empty_targets() {
        let class = Callback::class(ClassRef::plain("app::Thing"), "run");
        assert_eq!(class.class_name(), Some("app::Thing"));
        assert!(matches!(
            class.invoke().await,
            Err(InvokeError::Uninstantiated(name)) if name == "app::Thing"
        ));

        let empty = Callback::default();
        assert!(matches!(empty.invoke().await, Err(InvokeError::NoTarget)));
    }

    #[tokio::test]
    async fn test_function_target() {
        let function = Function::new("double", |arguments: Arguments| async move {
            let n = arguments
                .first()
                .and_then(|p| p.as_value())
                .and_then(|v| v.as_i64())
                .unwrap_or_default();
            serde_json::Value::from(n * 2)
        });
        let callback = Callback::function(function).with_arguments(vec![Payload::from(serde_json::json!(21))]);
        assert_eq!(callback.method(), "double");
        assert_eq!(callback.invoke().await.unwrap().render(), "42");

        let mut renamed = callback.clone();
        renamed.set_method("doubleJson");
        assert!(renamed.invoke().await.unwrap_err().is_invalid_callback());
    }
}
