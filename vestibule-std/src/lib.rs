//! # vestibule-std
//!
//! Standard implementations for the Vestibule request dispatch core.
//!
//! This crate provides:
//! - **Core listener**: [`CoreListener`](listener::CoreListener), the default
//!   subscriber of all four lifecycle stages
//! - **Callback normalization**: [`transform_callback`](adapter::transform_callback)
//! - **Dynamic registration**: [`Registry`](registry::Registry) and
//!   [`Dispatcher`](registry::Dispatcher)
//! - **Request kernel**: [`Kernel`](kernel::Kernel)
//! - **Standard formatters**: JSON, Text
//! - **Standard hooks**: Logging
//! - **Configuration**: [`KernelConfig`](config::KernelConfig), loadable from TOML

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use vestibule_core;

// Modules
pub mod adapter;
pub mod config;
pub mod formatters;
pub mod hooks;
pub mod kernel;
pub mod listener;
pub mod registry;
pub mod testing;
