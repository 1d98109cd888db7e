//! Process supervision: configuration, telemetry, server lifecycle and
//! shutdown signals.

mod errors;
mod launch;
mod loader;
mod shutdown;

pub use errors::LaunchError;
pub use launch::{run_daemon, run_daemon_with};
pub use loader::{ConfigLoader, StaticConfigLoader, SystemConfigLoader};
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
