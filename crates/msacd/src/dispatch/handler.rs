//! Connection handler that frames, decodes and dispatches MSAC envelopes.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, warn};

use crate::connection::{ConnectionBuffer, ConnectionError, next_frame};
use crate::envelope::MsacRequest;
use crate::transport::ConnectionHandler;

use super::router::{DISPATCH_TARGET, Router};

/// Serves one client until it disconnects or a connection error occurs.
///
/// Frames are processed strictly in arrival order: after each receive, every
/// complete envelope in the buffer is dispatched before the next read.
#[derive(Debug)]
pub(crate) struct DispatchConnectionHandler {
    router: Router,
    buffer_capacity: usize,
}

impl DispatchConnectionHandler {
    pub(crate) fn new(router: Router, buffer_capacity: usize) -> Self {
        Self {
            router,
            buffer_capacity,
        }
    }

    /// Runs the receive/frame/dispatch loop over `connection`.
    ///
    /// Returns `Ok(())` when the peer closes the socket. Bytes of an
    /// incomplete envelope left in the buffer at that point are discarded.
    pub(crate) fn serve<S: Read + Write>(
        &self,
        connection: &mut ConnectionBuffer<S>,
    ) -> Result<(), ConnectionError> {
        while connection.receive()? {
            while let Some(frame) = next_frame(connection)? {
                let request = MsacRequest::decode(&frame)?;
                self.router.route(&request, connection)?;
            }
        }
        if connection.available() > 0 {
            debug!(
                target: DISPATCH_TARGET,
                discarded = connection.available(),
                "peer closed mid-envelope"
            );
        }
        Ok(())
    }

    fn report(&self, error: &ConnectionError) {
        warn!(
            target: DISPATCH_TARGET,
            kind = ?error.kind(),
            %error,
            "closing connection after error"
        );
        self.router.hooks().on_connection_error(error);
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: TcpStream) {
        let mut connection = ConnectionBuffer::new(stream, self.buffer_capacity);
        // The buffer is dropped right after a panic, so no torn state is reused.
        let outcome = catch_unwind(AssertUnwindSafe(|| self.serve(&mut connection)))
            .unwrap_or_else(|payload| Err(ConnectionError::handler_panic(payload.as_ref())));
        match outcome {
            Ok(()) => debug!(target: DISPATCH_TARGET, "client disconnected"),
            Err(error) => self.report(&error),
        }
    }

    fn accept_failed(&self, error: io::Error) {
        self.report(&ConnectionError::Io(error));
    }
}
