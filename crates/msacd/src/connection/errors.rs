//! Per-connection error taxonomy.
//!
//! Any of these ends the current connection. The server reports the error
//! through the connection-error hook and goes back to accepting clients.

use std::any::Any;
use std::io;

use thiserror::Error;

/// Errors that terminate a single client connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The envelope is malformed or lacks a required element or attribute.
    #[error("malformed envelope: {message}")]
    Protocol { message: String },

    /// The buffer filled up without containing an envelope terminator.
    #[error("no envelope terminator within {capacity} buffered bytes")]
    FramingOverflow { capacity: usize },

    /// The peer closed the socket while more bytes were required.
    #[error("connection lost with {missing} payload bytes outstanding")]
    ConnectionLost { missing: usize },

    /// A field parsed but carries a value the server does not support.
    #[error("protocol violation: {message}")]
    ProtocolViolation { message: String },

    /// A caller tried to consume more bytes than the buffer holds.
    #[error("cannot consume {requested} bytes; only {available} buffered")]
    BufferUnderrun { requested: usize, available: usize },

    /// The unique tag could not be rendered.
    #[error("failed to format unique tag: {0}")]
    Timestamp(#[from] time::error::Format),

    /// Socket read or write failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serving the connection panicked, usually inside a host hook.
    #[error("connection handler panicked: {message}")]
    HandlerPanic { message: String },
}

/// Fieldless view of [`ConnectionError`] for matching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// See [`ConnectionError::Protocol`].
    Protocol,
    /// See [`ConnectionError::FramingOverflow`].
    FramingOverflow,
    /// See [`ConnectionError::ConnectionLost`].
    ConnectionLost,
    /// See [`ConnectionError::ProtocolViolation`].
    ProtocolViolation,
    /// See [`ConnectionError::BufferUnderrun`].
    BufferUnderrun,
    /// See [`ConnectionError::Timestamp`].
    Timestamp,
    /// See [`ConnectionError::Io`].
    Io,
    /// See [`ConnectionError::HandlerPanic`].
    HandlerPanic,
}

impl ConnectionError {
    /// Returns the error's kind.
    #[must_use]
    pub fn kind(&self) -> ConnectionErrorKind {
        match self {
            Self::Protocol { .. } => ConnectionErrorKind::Protocol,
            Self::FramingOverflow { .. } => ConnectionErrorKind::FramingOverflow,
            Self::ConnectionLost { .. } => ConnectionErrorKind::ConnectionLost,
            Self::ProtocolViolation { .. } => ConnectionErrorKind::ProtocolViolation,
            Self::BufferUnderrun { .. } => ConnectionErrorKind::BufferUnderrun,
            Self::Timestamp(_) => ConnectionErrorKind::Timestamp,
            Self::Io(_) => ConnectionErrorKind::Io,
            Self::HandlerPanic { .. } => ConnectionErrorKind::HandlerPanic,
        }
    }

    /// Creates a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a protocol violation error.
    pub fn violation(message: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
        }
    }

    /// Creates a handler panic error from a `catch_unwind` payload.
    pub fn handler_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| payload.downcast_ref::<&str>().copied())
            .unwrap_or("unknown panic");
        Self::HandlerPanic {
            message: message.to_string(),
        }
    }

    /// Creates a missing-attribute protocol error.
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Self::protocol(format!("<{element}> is missing required attribute '{attribute}'"))
    }

    /// Creates a missing-element protocol error.
    pub fn missing_element(parent: &str, element: &str) -> Self {
        Self::protocol(format!("<{parent}> has no <{element}> child"))
    }
}
