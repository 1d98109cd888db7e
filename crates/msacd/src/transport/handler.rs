//! Connection handling abstraction for the listener.

use std::io;
use std::net::TcpStream;

/// Handles accepted socket connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Serves a single connection to completion. The listener accepts no
    /// other client until this returns. Implementations should avoid
    /// panicking.
    fn handle(&self, stream: TcpStream);

    /// Called when `accept` fails with anything other than `WouldBlock`.
    fn accept_failed(&self, error: io::Error) {
        let _ = error;
    }
}
