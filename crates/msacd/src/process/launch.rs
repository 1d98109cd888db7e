//! Supervises server launch sequencing and shutdown.

use std::sync::Arc;

use tracing::info;

use crate::hooks::{MsacHooks, StructuredHooks};
use crate::server::{MsacServer, ServerSettings};
use crate::telemetry;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::loader::{ConfigLoader, SystemConfigLoader};
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Runs the server using the production collaborators.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(
        &SystemConfigLoader,
        Arc::new(StructuredHooks::new()),
        SystemShutdownSignal::new(),
    )
}

/// Runs the server with injected collaborators.
///
/// Loads and validates configuration, installs telemetry, starts the server
/// on a background thread, and blocks until `shutdown` fires.
pub fn run_daemon_with<L, S>(
    loader: &L,
    hooks: Arc<dyn MsacHooks>,
    shutdown: S,
) -> Result<(), LaunchError>
where
    L: ConfigLoader + ?Sized,
    S: ShutdownSignal,
{
    let config = loader.load()?;
    config.validate()?;
    telemetry::initialise(&config)?;
    info!(
        target: PROCESS_TARGET,
        listen = %config.listen(),
        "starting msac server"
    );

    let server = MsacServer::new(ServerSettings::from(&config), hooks);
    let handle = server.start()?;
    info!(
        target: PROCESS_TARGET,
        "server ready"
    );
    let waited = shutdown.wait();
    handle.shutdown();
    handle.join()?;
    waited?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
