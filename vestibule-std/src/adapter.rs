//! Callback normalization.

use vestibule_core::{BoxError, Callback, Context, DispatchError};

/// Make a callback on a controller class invokable.
///
/// When the target is an uninstantiated controller class, the controller is
/// constructed with `context` and the current request, the target replaced
/// by the instance, and `action_suffix` appended to the method name unless it
/// is already there. Any other callback is left as it is.
///
/// Errors from the controller constructor are returned unchanged.
pub fn transform_callback(
    callback: &mut Callback,
    context: &Context,
    action_suffix: &str,
) -> Result<(), BoxError> {
    let Some(class) = callback.class_ref().filter(|class| class.is_controller()).cloned() else {
        return Ok(());
    };
    let request = context.request().cloned().ok_or(DispatchError::MissingRequest)?;

    let instance = class.construct(context, request)?;
    callback.set_instance(instance);

    if !callback.method().ends_with(action_suffix) {
        let method = format!("{}{action_suffix}", callback.method());
        callback.set_method(method);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::EchoController;
    use vestibule_core::{AppError, ClassRef, Controller, Request, Target};

    fn context() -> Context {
        Context::for_request(Request::new("body".to_owned()))
    }

    #[test]
    fn test_controller_class_is_instantiated() {
        let mut callback = Callback::class(ClassRef::controller::<EchoController>(), "index");
        transform_callback(&mut callback, &context(), "Action").unwrap();

        assert_eq!(callback.method(), "indexAction");
        assert!(matches!(callback.target(), Target::Object(_)));
        assert!(callback.class_name().is_none());
        assert!(callback.is_instantiated());
    }

    #[test]
    fn test_suffix_is_not_doubled() {
        let mut callback = Callback::class(ClassRef::controller::<EchoController>(), "indexAction");
        transform_callback(&mut callback, &context(), "Action").unwrap();
        assert_eq!(callback.method(), "indexAction");
    }

    #[test]
    fn test_other_callbacks_pass_through() {
        let mut plain = Callback::class(ClassRef::plain("app::Helper"), "run");
        transform_callback(&mut plain, &context(), "Action").unwrap();
        assert_eq!(plain.method(), "run");
        assert_eq!(plain.class_name(), Some("app::Helper"));

        let mut empty = Callback::default();
        transform_callback(&mut empty, &Context::new(), "Action").unwrap();
        assert_eq!(empty.method(), "");
    }

    #[test]
    fn test_missing_request() {
        let mut callback = Callback::class(ClassRef::controller::<EchoController>(), "index");
        let err = transform_callback(&mut callback, &Context::new(), "Action").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DispatchError>(),
            Some(DispatchError::MissingRequest)
        ));
        assert_eq!(callback.method(), "index");
    }

    struct Refusing;

    impl vestibule_core::Actions for Refusing {
        fn invoke<'a>(
            &'a mut self,
            method: &'a str,
            _arguments: vestibule_core::Arguments,
        ) -> futures::future::BoxFuture<'a, Result<vestibule_core::Payload, vestibule_core::InvokeError>>
        {
            Box::pin(async move {
                Err(vestibule_core::InvokeError::MissingMethod {
                    target: "Refusing".into(),
                    method: method.into(),
                })
            })
        }

        fn has_action(&self, _method: &str) -> bool {
            false
        }
    }

    impl Controller for Refusing {
        fn new(_context: &Context, _request: std::sync::Arc<Request>) -> Result<Self, BoxError> {
            Err(AppError::new("controller unavailable", 503).into())
        }

        fn request(&self) -> &Request {
            unreachable!("never constructed")
        }
    }

    #[test]
    fn test_construction_errors_propagate_unchanged() {
        let mut callback = Callback::class(ClassRef::controller::<Refusing>(), "index");
        let err = transform_callback(&mut callback, &context(), "Action").unwrap_err();
        let app = err.downcast_ref::<AppError>().unwrap();
        assert_eq!(app.code(), 503);
        assert_eq!(callback.class_name(), Some(std::any::type_name::<Refusing>()));
    }
}
