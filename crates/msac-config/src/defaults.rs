use crate::endpoint::ListenEndpoint;
use crate::logging::LogFormat;

/// Default TCP port for the MSAC listener.
pub const DEFAULT_PORT: u16 = 10000;

/// Default bind address for the MSAC listener.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Operating system string advertised as `MSAC-OS` in send responses.
pub const DEFAULT_ADVERTISED_OS: &str = "windows 7";

/// Version string advertised as `MSAC-Version` in send responses.
pub const DEFAULT_ADVERTISED_VERSION: &str = "5.3.4";

/// Per-connection receive buffer capacity in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Largest Direct File Copy payload accepted, in bytes.
pub const DEFAULT_MAX_FILE_BYTES: usize = 16 * 1024 * 1024;

/// Default log filter expression used by the server.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Computes the default listen endpoint.
#[must_use]
pub fn default_listen_endpoint() -> ListenEndpoint {
    ListenEndpoint::tcp(DEFAULT_HOST, DEFAULT_PORT)
}

/// Owned default for the advertised operating system string.
#[must_use]
pub fn default_advertised_os() -> String {
    DEFAULT_ADVERTISED_OS.to_string()
}

/// Owned default for the advertised version string.
#[must_use]
pub fn default_advertised_version() -> String {
    DEFAULT_ADVERTISED_VERSION.to_string()
}

/// Default receive buffer capacity.
#[must_use]
pub const fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

/// Default Direct File Copy size ceiling.
#[must_use]
pub const fn default_max_file_bytes() -> usize {
    DEFAULT_MAX_FILE_BYTES
}

/// Default log filter expression used by the server.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the server.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
