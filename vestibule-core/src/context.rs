//! The request-scoped dispatch context.
//!
//! A [`Context`] is created for one request and passed by `&mut` reference
//! to every lifecycle stage. Stages communicate through it: the callback
//! stage stores the normalized callback, the result stage reads it back.
//!
//! The well-known entries have typed accessors:
//!
//! | key | accessor |
//! |---|---|
//! | `request` | [`Context::request`] |
//! | `callback` | [`Context::callback`] |
//! | `formatter` | [`Context::formatter`] |
//! | `response.class` | [`Context::response_factory`] |
//!
//! Anything else is stored as a named value ([`Context::set`]) or a named
//! parameter ([`Context::set_parameter`]).

use crate::{
    callback::Callback,
    formatter::Formatter,
    output::OutputBuffer,
    response::{PlainResponses, ResponseFactory},
};
use serde_json::Value;
use std::{any::Any, collections::HashMap, fmt, sync::Arc};

/// The request type handed to controllers.
pub type Request = http::Request<String>;

/// Well-known context keys.
pub mod keys {
    /// The current request.
    pub const REQUEST: &str = "request";
    /// The normalized callback.
    pub const CALLBACK: &str = "callback";
    /// The optional formatter.
    pub const FORMATTER: &str = "formatter";
    /// Parameter naming the active response factory.
    pub const RESPONSE_CLASS: &str = "response.class";
    /// Formatter value receiving captured output.
    pub const BUFFERED: &str = "buffered";
}

/// Request-scoped storage shared by the lifecycle stages.
pub struct Context {
    request: Option<Arc<Request>>,
    callback: Option<Callback>,
    formatter: Option<Box<dyn Formatter>>,
    response_factory: Arc<dyn ResponseFactory>,
    output: OutputBuffer,
    parameters: HashMap<String, Value>,
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Context {
    /// Create an empty context using [`PlainResponses`].
    pub fn new() -> Self {
        let mut context = Self {
            request: None,
            callback: None,
            formatter: None,
            response_factory: Arc::new(PlainResponses),
            output: OutputBuffer::new(),
            parameters: HashMap::new(),
            values: HashMap::new(),
        };
        context.record_response_class();
        context
    }

    /// Create a context for a request.
    pub fn for_request(request: Request) -> Self {
        let mut context = Self::new();
        context.set_request(request);
        context
    }

    /// The current request.
    pub fn request(&self) -> Option<&Arc<Request>> {
        self.request.as_ref()
    }

    /// Set the current request.
    pub fn set_request(&mut self, request: impl Into<Arc<Request>>) {
        self.request = Some(request.into());
    }

    /// The normalized callback, once the callback stage has run.
    pub fn callback(&self) -> Option<&Callback> {
        self.callback.as_ref()
    }

    /// Mutable access to the stored callback.
    pub fn callback_mut(&mut self) -> Option<&mut Callback> {
        self.callback.as_mut()
    }

    /// Store the callback.
    pub fn set_callback(&mut self, callback: Callback) {
        self.callback = Some(callback);
    }

    /// Returns `true` if a formatter is registered.
    pub fn has_formatter(&self) -> bool {
        self.formatter.is_some()
    }

    /// The formatter, if any.
    pub fn formatter(&self) -> Option<&dyn Formatter> {
        self.formatter.as_deref()
    }

    /// Mutable access to the formatter.
    pub fn formatter_mut(&mut self) -> Option<&mut (dyn Formatter + 'static)> {
        self.formatter.as_deref_mut()
    }

    /// Register a formatter.
    pub fn set_formatter(&mut self, formatter: impl Formatter) {
        self.formatter = Some(Box::new(formatter));
    }

    /// Register an already boxed formatter.
    pub fn set_boxed_formatter(&mut self, formatter: Box<dyn Formatter>) {
        self.formatter = Some(formatter);
    }

    /// Remove the formatter.
    pub fn take_formatter(&mut self) -> Option<Box<dyn Formatter>> {
        self.formatter.take()
    }

    /// The factory building responses created by the dispatch core.
    pub fn response_factory(&self) -> &dyn ResponseFactory {
        self.response_factory.as_ref()
    }

    /// Replace the response factory.
    ///
    /// The factory name is recorded under the `response.class` parameter.
    pub fn set_response_factory(&mut self, factory: impl ResponseFactory) {
        self.response_factory = Arc::new(factory);
        self.record_response_class();
    }

    fn record_response_class(&mut self) {
        let name = Value::String(self.response_factory.name().to_owned());
        self.parameters.insert(keys::RESPONSE_CLASS.to_owned(), name);
    }

    /// The output buffer of this request.
    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    /// A named parameter.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Set a named parameter.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.parameters.insert(name.into(), value.into());
    }

    /// All parameters.
    pub fn parameters(&self) -> &HashMap<String, Value> {
        &self.parameters
    }

    /// Store a named value.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// A named value of type `T`.
    ///
    /// Returns `None` if the key is unset or holds another type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|value| value.downcast_ref())
    }

    /// Mutable access to a named value of type `T`.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|value| value.downcast_mut())
    }

    /// Remove a named value. Returns `true` if it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Returns `true` if `key` is set, including the well-known entries.
    pub fn has(&self, key: &str) -> bool {
        match key {
            keys::REQUEST => self.request.is_some(),
            keys::CALLBACK => self.callback.is_some(),
            keys::FORMATTER => self.formatter.is_some(),
            _ => self.values.contains_key(key),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("request", &self.request.as_ref().map(|r| r.uri().to_string()))
            .field("callback", &self.callback)
            .field("formatter", &self.formatter.as_ref().map(|f| f.kind()))
            .field("response_factory", &self.response_factory.name())
            .field("parameters", &self.parameters)
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_values() {
        let mut context = Context::new();
        context.set("user_id", 42_u64);
        assert!(context.has("user_id"));
        assert_eq!(context.get::<u64>("user_id"), Some(&42));
        assert_eq!(context.get::<String>("user_id"), None);

        *context.get_mut::<u64>("user_id").unwrap() += 1;
        assert_eq!(context.get::<u64>("user_id"), Some(&43));

        assert!(context.remove("user_id"));
        assert!(!context.has("user_id"));
    }

    #[test]
    fn test_well_known_keys() {
        let mut context = Context::new();
        assert!(!context.has(keys::REQUEST));
        assert!(!context.has(keys::FORMATTER));

        context.set_request(Request::new(String::new()));
        assert!(context.has(keys::REQUEST));
        assert_eq!(
            context.parameter(keys::RESPONSE_CLASS),
            Some(&Value::String("response".into()))
        );
    }
}
