//! Listener and kernel configuration.
//!
//! Configuration is plain data with defaults for every field, so an empty
//! document is a valid configuration:
//!
//! ```toml
//! [listener]
//! action_suffix = "Action"
//! success_status = 200
//! fallback_status = 500
//! capture_output = true
//! buffered_key = "buffered"
//!
//! [parameters]
//! "app.name" = "blog"
//! ```

use http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use vestibule_core::keys;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A status code is outside the accepted range.
    #[error("`{field}` must be a status code in {min}..={max}, got {value}")]
    Status {
        /// The offending field.
        field: &'static str,
        /// The configured value.
        value: u16,
        /// Lowest accepted value.
        min: u16,
        /// Highest accepted value.
        max: u16,
    },

    /// The entry-point suffix is empty.
    #[error("`action_suffix` must not be empty")]
    EmptySuffix,
}

/// Settings of the core listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenerConfig {
    /// Suffix marking controller entry points.
    pub action_suffix: String,
    /// Status of responses wrapped from raw results.
    pub success_status: u16,
    /// Status used for errors whose code is not a valid status.
    pub fallback_status: u16,
    /// Whether the init stage opens a capture scope.
    pub capture_output: bool,
    /// Formatter value receiving captured output.
    pub buffered_key: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            action_suffix: "Action".to_owned(),
            success_status: 200,
            fallback_status: 500,
            capture_output: true,
            buffered_key: keys::BUFFERED.to_owned(),
        }
    }
}

impl ListenerConfig {
    /// Check the configured values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.action_suffix.is_empty() {
            return Err(ConfigError::EmptySuffix);
        }
        check_status("success_status", self.success_status, 200, 299)?;
        check_status("fallback_status", self.fallback_status, 500, 599)?;
        Ok(())
    }

    /// [`success_status`](Self::success_status) as a status code.
    pub fn success_status(&self) -> StatusCode {
        StatusCode::from_u16(self.success_status).unwrap_or(StatusCode::OK)
    }

    /// [`fallback_status`](Self::fallback_status) as a status code.
    pub fn fallback_status(&self) -> StatusCode {
        StatusCode::from_u16(self.fallback_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

fn check_status(field: &'static str, value: u16, min: u16, max: u16) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Status {
            field,
            value,
            min,
            max,
        })
    }
}

/// Settings of a [`Kernel`](crate::kernel::Kernel).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelConfig {
    /// Core listener settings.
    pub listener: ListenerConfig,
    /// Parameters copied into every new context.
    pub parameters: HashMap<String, Value>,
}

impl KernelConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: KernelConfig = toml::from_str(source)?;
        config.listener.validate()?;
        Ok(config)
    }
}
