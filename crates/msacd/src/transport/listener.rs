//! Listener implementation for the MSAC TCP endpoint.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use socket2::{Domain, Socket, Type};
use tracing::{debug, info, warn};

use msac_config::ListenEndpoint;

use super::{ConnectionHandler, LISTENER_TARGET, ListenerError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Pending connections the kernel queues while a client is being served.
const LISTEN_BACKLOG: i32 = 1;

/// Listener bound to a TCP endpoint.
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: ListenEndpoint,
    listener: TcpListener,
}

impl SocketListener {
    pub(crate) fn bind(endpoint: &ListenEndpoint) -> Result<Self, ListenerError> {
        let listener = bind_tcp(&endpoint.host, endpoint.port)?;
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
        })
    }

    pub(crate) fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr().ok()
    }

    /// Runs the accept loop on the calling thread until `shutdown` is set.
    /// The listening socket closes as soon as shutdown is observed; a client
    /// still being served is waited for before this returns.
    pub(crate) fn run(
        self,
        shutdown: Arc<AtomicBool>,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<(), ListenerError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        run_accept_loop(self, &shutdown, &handler);
        Ok(())
    }

    /// Runs the accept loop on a background thread.
    pub(crate) fn start(
        self,
        shutdown: Arc<AtomicBool>,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let shutdown_flag = Arc::clone(&shutdown);
        let handle = thread::spawn(move || run_accept_loop(self, &shutdown_flag, &handler));
        Ok(ListenerHandle {
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Handle to the background listener thread.
#[derive(Debug)]
pub(crate) struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(()) => Ok(()),
                Err(_) => Err(ListenerError::ThreadPanic),
            }
        } else {
            Ok(())
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

/// Client currently being served on its own thread.
struct ActiveClient {
    peer: SocketAddr,
    worker: thread::JoinHandle<()>,
}

impl ActiveClient {
    fn serve(handler: &Arc<dyn ConnectionHandler>, stream: TcpStream, peer: SocketAddr) -> Self {
        let handler = Arc::clone(handler);
        let worker = thread::spawn(move || handler.handle(stream));
        Self { peer, worker }
    }

    fn finish(self) {
        match self.worker.join() {
            Ok(()) => debug!(target: LISTENER_TARGET, peer = %self.peer, "client released"),
            Err(_) => warn!(
                target: LISTENER_TARGET,
                peer = %self.peer,
                "connection worker panicked"
            ),
        }
    }
}

fn run_accept_loop(
    listener: SocketListener,
    shutdown: &AtomicBool,
    handler: &Arc<dyn ConnectionHandler>,
) {
    let SocketListener { endpoint, listener } = listener;
    info!(
        target: LISTENER_TARGET,
        %endpoint,
        local_addr = ?listener.local_addr().ok(),
        "socket listener active"
    );
    let mut active = None::<ActiveClient>;
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        // One client at a time: nothing is accepted until the current worker ends.
        if let Some(client) = active.take() {
            if client.worker.is_finished() {
                client.finish();
            } else {
                active = Some(client);
                thread::sleep(ACCEPT_BACKOFF);
                continue;
            }
        }
        match accept_connection(&listener) {
            Ok(Some((stream, peer))) => {
                last_error = None;
                info!(target: LISTENER_TARGET, %peer, "client connected");
                active = Some(ActiveClient::serve(handler, stream, peer));
            }
            Ok(None) => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                    handler.accept_failed(error);
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    drop(listener);
    info!(
        target: LISTENER_TARGET,
        %endpoint,
        "socket listener stopped"
    );
    if let Some(client) = active {
        client.finish();
    }
}

fn accept_connection(listener: &TcpListener) -> Result<Option<(TcpStream, SocketAddr)>, io::Error> {
    match listener.accept() {
        Ok((stream, peer)) => {
            stream.set_nonblocking(false)?;
            Ok(Some((stream, peer)))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_string(),
            port,
            source,
        })?;
    let addr = addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_string(),
            port,
        })?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)
        .map_err(|source| ListenerError::Socket { addr, source })?;
    #[cfg(unix)]
    socket
        .set_reuse_address(true)
        .map_err(|source| ListenerError::Socket { addr, source })?;
    socket
        .bind(&addr.into())
        .map_err(|source| ListenerError::BindTcp { addr, source })?;
    socket
        .listen(LISTEN_BACKLOG)
        .map_err(|source| ListenerError::Listen { addr, source })?;
    Ok(socket.into())
}
