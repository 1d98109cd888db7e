//! Request dispatch for MSAC connections.
//!
//! The connection handler drives one client at a time: it fills the
//! connection buffer, peels complete envelopes off the front, decodes each
//! one and hands it to the router. The router picks a handler by the
//! `Msg-Info/@msgType` opcode:
//!
//! | opcode             | handler              | raw payload |
//! |--------------------|----------------------|-------------|
//! | `Direct File Copy` | `direct_file_copy`   | yes         |
//! | `Async Send`       | `send`               | no          |
//! | `Sync Pre Send`    | `send`               | no          |
//! | `PSD Send`         | `psd`                | no          |
//!
//! Every handler notifies the hooks before its response is written. Unknown
//! opcodes produce neither a notification nor a response.

mod direct_file_copy;
mod handler;
mod psd;
mod router;
mod send;

pub(crate) use self::handler::DispatchConnectionHandler;
pub(crate) use self::router::{DISPATCH_TARGET, Opcode, Router};
