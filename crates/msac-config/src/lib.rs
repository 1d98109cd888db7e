//! Shared configuration for the MSAC server.
//!
//! Values are layered by [`ortho_config`]: built-in defaults, then a TOML
//! configuration file (`--config-path` or `MSAC_CONFIG_PATH`), then `MSAC_*`
//! environment variables, then command-line flags. The resolved [`Config`]
//! describes where the server listens, what it advertises to clients in send
//! responses, how large a connection's receive buffer may grow, and how the
//! server logs.

mod defaults;
mod endpoint;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_ADVERTISED_OS, DEFAULT_ADVERTISED_VERSION, DEFAULT_BUFFER_CAPACITY, DEFAULT_HOST,
    DEFAULT_LOG_FILTER, DEFAULT_MAX_FILE_BYTES, DEFAULT_PORT, default_advertised_os,
    default_advertised_version, default_buffer_capacity, default_listen_endpoint,
    default_log_filter, default_log_filter_string, default_log_format, default_max_file_bytes,
};
pub use endpoint::{EndpointParseError, ListenEndpoint};
pub use logging::{LogFormat, LogFormatParseError};

/// Smallest receive buffer that can hold a minimal envelope.
pub const MIN_BUFFER_CAPACITY: usize = 64;

/// Resolved server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "MSAC")]
pub struct Config {
    /// TCP endpoint the server binds to.
    #[serde(default = "default_listen_endpoint")]
    #[ortho_config(default = default_listen_endpoint())]
    pub listen: ListenEndpoint,
    /// Operating system string echoed as `MSAC-OS`.
    #[serde(default = "default_advertised_os")]
    #[ortho_config(default = default_advertised_os())]
    pub advertised_os: String,
    /// Version string echoed as `MSAC-Version`.
    #[serde(default = "default_advertised_version")]
    #[ortho_config(default = default_advertised_version())]
    pub advertised_version: String,
    /// Capacity of each connection's receive buffer in bytes.
    #[serde(default = "default_buffer_capacity")]
    #[ortho_config(default = default_buffer_capacity())]
    pub buffer_capacity: usize,
    /// Largest Direct File Copy payload accepted, in bytes.
    #[serde(default = "default_max_file_bytes")]
    #[ortho_config(default = default_max_file_bytes())]
    pub max_file_bytes: usize,
    /// `tracing_subscriber::EnvFilter` expression.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen_endpoint(),
            advertised_os: default_advertised_os(),
            advertised_version: default_advertised_version(),
            buffer_capacity: default_buffer_capacity(),
            max_file_bytes: default_max_file_bytes(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Endpoint the server binds to.
    #[must_use]
    pub fn listen(&self) -> &ListenEndpoint {
        &self.listen
    }

    /// Operating system string advertised to clients.
    #[must_use]
    pub fn advertised_os(&self) -> &str {
        &self.advertised_os
    }

    /// Version string advertised to clients.
    #[must_use]
    pub fn advertised_version(&self) -> &str {
        &self.advertised_version
    }

    /// Receive buffer capacity per connection.
    #[must_use]
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Direct File Copy size ceiling.
    #[must_use]
    pub fn max_file_bytes(&self) -> usize {
        self.max_file_bytes
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Checks values the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BufferTooSmall`] when the receive buffer could
    /// never hold a complete envelope.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity < MIN_BUFFER_CAPACITY {
            return Err(ConfigError::BufferTooSmall {
                capacity: self.buffer_capacity,
                minimum: MIN_BUFFER_CAPACITY,
            });
        }
        Ok(())
    }
}

/// Semantic configuration errors detected after loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The receive buffer is too small to frame any envelope.
    #[error("buffer capacity {capacity} is below the minimum of {minimum} bytes")]
    BufferTooSmall {
        /// Configured capacity.
        capacity: usize,
        /// Smallest accepted capacity.
        minimum: usize,
    },
}
