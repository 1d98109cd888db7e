//! TCP listener for the MSAC endpoint.
//!
//! The transport binds the configured endpoint with a backlog of one and
//! serves accepted clients one at a time on the accept thread. A second
//! client waits in the kernel queue until the current one disconnects.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod listener_tests;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub(crate) use self::handler::ConnectionHandler;
pub(crate) use self::listener::{ListenerHandle, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
