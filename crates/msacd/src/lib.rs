//! MSAC server for HD Radio data services.
//!
//! A broadcast automation client connects over TCP and sends XML envelopes,
//! each terminated by `</HDRadio-Envelope>`. The server frames the byte
//! stream, decodes each envelope, acts on its `msgType` opcode, notifies the
//! host application through [`MsacHooks`], and answers with a response
//! envelope. Exactly one client is served at a time; the listen backlog is
//! one.
//!
//! Four opcodes are understood:
//!
//! - `Direct File Copy` carries a raw file payload immediately after the
//!   envelope. The payload may already be partly buffered when the envelope
//!   is framed, so it is drained from the connection buffer before the rest
//!   is read straight from the socket.
//! - `Async Send` and `Sync Pre Send` announce an image for transmission. The
//!   server assigns a 16-bit lot identifier and a timestamp tag.
//! - `PSD Send` updates the now-playing text and its extended header.
//!
//! Any connection error closes only the offending client; the server then
//! returns to accepting. Binding failures leave the server not ready rather
//! than failing construction. See [`MsacServer`].

mod connection;
mod dispatch;
mod entities;
mod envelope;
mod hooks;
mod process;
mod server;
pub mod telemetry;
mod transport;

pub use connection::{ConnectionError, ConnectionErrorKind};
pub use entities::{LotIdAllocator, OutgoingImage, PsdRecord, SendKind, XhdrRecord, unique_tag};
pub use envelope::Attributes;
pub use hooks::{MsacHooks, StructuredHooks};
pub use process::{
    ConfigLoader, LaunchError, ShutdownError, ShutdownSignal, StaticConfigLoader,
    SystemConfigLoader, SystemShutdownSignal, run_daemon, run_daemon_with,
};
pub use server::{MsacServer, ServerError, ServerHandle, ServerSettings, ShutdownHandle};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
