//! # vestibule - Request Dispatch Core
//!
//! `vestibule` sits between a resolved callback and the final response of a
//! request. It instantiates controller classes, invokes their entry points,
//! runs per-format hooks, captures stray output, and converts every error
//! into a response.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vestibule::prelude::*;
//!
//! struct PostsController {
//!     request: Arc<Request>,
//! }
//!
//! #[vestibule::actions]
//! impl PostsController {
//!     async fn index_action(&mut self) -> Result<Value, AppError> { ... }
//!     async fn index_json(&mut self, arguments: Arguments) -> Payload { ... }
//! }
//!
//! impl Controller for PostsController { ... }
//!
//! let kernel = Kernel::default();
//! let mut context = kernel.context(request);
//! context.set_formatter(JsonFormatter::new());
//!
//! let callback = Callback::class(ClassRef::controller::<PostsController>(), "index");
//! let response = kernel.handle(&mut context, callback).await;
//! ```

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use vestibule_core::{
    // Handlers
    Actions,
    // Errors
    AppError,
    Arguments,
    BoxError,
    // Callbacks
    Callback,
    // Events
    CallbackEvent,
    // Output capture
    CaptureScope,
    ClassRef,
    // Context
    Context,
    Controller,
    ControllerFactory,
    DEFAULT_REDIRECT_STATUS,
    DispatchError,
    DynHook,
    Event,
    ExceptionEvent,
    // Formatting
    FormatKind,
    Formatter,
    Function,
    // Hooks
    Hook,
    HookResult,
    InitEvent,
    Instance,
    IntoPayload,
    InvokeError,
    LifecycleEvent,
    OutputBuffer,
    // Results
    Payload,
    PlainResponses,
    Request,
    Response,
    ResponseFactory,
    ResultEvent,
    ScopeKind,
    Stage,
    Target,
    error_code,
    keys,
    // Naming
    model_name,
    singularize,
};

pub use futures::future::BoxFuture;

pub use vestibule_std::{
    adapter::transform_callback,
    config::{ConfigError, KernelConfig, ListenerConfig},
    kernel::Kernel,
    listener::{CoreListener, HookOutcome, clamp_status, run_format_hook},
    registry::{Dispatcher, DispatcherBuilder, Registry, RegistryBuilder},
};

/// Standard formatter implementations.
pub mod formatters {
    pub use vestibule_std::formatters::{JsonFormatter, TextFormatter};
}

/// Standard hook implementations.
pub mod hooks {
    pub use vestibule_std::hooks::LoggingHook;
}

/// Testing utilities.
pub mod testing {
    pub use vestibule_std::testing::{EchoController, RecordingHook, StubFormatter};
}

/// Prelude module - common imports for Vestibule.
///
/// # Usage
///
/// ```rust,ignore
/// use vestibule::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Handlers
        Actions,
        // Errors
        AppError,
        Arguments,
        BoxError,
        // Dispatch
        Callback,
        ClassRef,
        Context,
        Controller,
        FormatKind,
        Formatter,
        // Hooks
        Hook,
        HookResult,
        IntoPayload,
        Kernel,
        KernelConfig,
        Payload,
        Request,
        Response,
        formatters::{JsonFormatter, TextFormatter},
    };
}

#[cfg(feature = "macros")]
pub use vestibule_macros::actions;
