//! Server façade: bind once, then serve clients until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{info, warn};

use msac_config::{Config, ListenEndpoint};

use crate::dispatch::{DispatchConnectionHandler, Router};
use crate::hooks::MsacHooks;
use crate::transport::{ListenerError, ListenerHandle, SocketListener};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Runtime parameters for an [`MsacServer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Endpoint to bind.
    pub listen: ListenEndpoint,
    /// Echoed as `MSAC-OS` in send responses.
    pub advertised_os: String,
    /// Echoed as `MSAC-Version` in send responses.
    pub advertised_version: String,
    /// Capacity of each connection's receive buffer.
    pub buffer_capacity: usize,
    /// Largest accepted Direct File Copy payload.
    pub max_file_bytes: usize,
}

impl From<&Config> for ServerSettings {
    fn from(config: &Config) -> Self {
        Self {
            listen: config.listen().clone(),
            advertised_os: config.advertised_os().to_string(),
            advertised_version: config.advertised_version().to_string(),
            buffer_capacity: config.buffer_capacity(),
            max_file_bytes: config.max_file_bytes(),
        }
    }
}

/// Errors returned when running a server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The endpoint could not be bound when the server was built.
    #[error("server is not ready: {source}")]
    NotReady {
        #[source]
        source: ListenerError,
    },
    /// The background accept thread panicked.
    #[error("server thread panicked")]
    ThreadPanic,
}

impl From<ListenerError> for ServerError {
    fn from(source: ListenerError) -> Self {
        match source {
            ListenerError::ThreadPanic => Self::ThreadPanic,
            source => Self::NotReady { source },
        }
    }
}

/// Requests shutdown of a running server from any thread.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Stops accepting new clients and closes the listening socket within
    /// one accept poll. A client being served is not interrupted; the loop
    /// returns once it disconnects.
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once shutdown has been requested.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Single-client MSAC server.
///
/// Construction binds the endpoint and never fails: a bind failure leaves the
/// server permanently not ready, which callers can check with
/// [`MsacServer::is_ready`] before running it.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use msac_config::Config;
/// use msacd::{MsacServer, ServerSettings, StructuredHooks};
///
/// let server = MsacServer::new(
///     ServerSettings::from(&Config::default()),
///     Arc::new(StructuredHooks::new()),
/// );
/// if server.is_ready() {
///     let handle = server.start().expect("start server");
///     handle.shutdown();
///     handle.join().expect("join server");
/// }
/// ```
#[derive(Debug)]
pub struct MsacServer {
    listener: Result<SocketListener, ListenerError>,
    handler: Arc<DispatchConnectionHandler>,
    shutdown: ShutdownHandle,
}

impl MsacServer {
    /// Binds `settings.listen` with a backlog of one.
    #[must_use]
    pub fn new(settings: ServerSettings, hooks: Arc<dyn MsacHooks>) -> Self {
        let listener = SocketListener::bind(&settings.listen);
        match &listener {
            Ok(bound) => info!(
                target: SERVER_TARGET,
                endpoint = %settings.listen,
                local_addr = ?bound.local_addr(),
                "server bound"
            ),
            Err(error) => warn!(
                target: SERVER_TARGET,
                endpoint = %settings.listen,
                %error,
                "server failed to bind; staying not ready"
            ),
        }
        let router = Router::new(&settings, hooks);
        Self {
            listener,
            handler: Arc::new(DispatchConnectionHandler::new(
                router,
                settings.buffer_capacity,
            )),
            shutdown: ShutdownHandle {
                flag: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    /// Returns `true` when the endpoint was bound.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.listener.is_ok()
    }

    /// The error that kept the server from binding, if any.
    #[must_use]
    pub fn bind_error(&self) -> Option<&ListenerError> {
        self.listener.as_ref().err()
    }

    /// Address actually bound; useful when the configured port is zero.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().ok().and_then(SocketListener::local_addr)
    }

    /// Returns a handle that stops [`MsacServer::run`] from another thread.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Serves clients on the calling thread until shutdown is requested.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotReady`] if binding failed.
    pub fn run(self) -> Result<(), ServerError> {
        let listener = self.listener?;
        listener.run(self.shutdown.flag, self.handler)?;
        Ok(())
    }

    /// Serves clients on a background thread.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotReady`] if binding failed.
    pub fn start(self) -> Result<ServerHandle, ServerError> {
        let listener = self.listener?;
        let inner = listener.start(self.shutdown.flag, self.handler)?;
        Ok(ServerHandle { inner })
    }
}

/// Handle to a server started with [`MsacServer::start`]. Dropping it
/// requests shutdown.
#[derive(Debug)]
pub struct ServerHandle {
    inner: ListenerHandle,
}

impl ServerHandle {
    /// Stops accepting new clients and closes the listening socket.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    /// Waits for the accept thread to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ThreadPanic`] if the thread panicked.
    pub fn join(self) -> Result<(), ServerError> {
        self.inner.join().map_err(ServerError::from)
    }
}
