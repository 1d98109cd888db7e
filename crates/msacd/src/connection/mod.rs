//! Per-connection byte handling.
//!
//! Each accepted client owns a [`ConnectionBuffer`]: a fixed-capacity FIFO
//! that accumulates socket reads until the frame extractor finds a complete
//! envelope. Valid bytes always start at index zero; consuming a prefix shifts
//! the remainder down. The one opcode with a raw payload drains the FIFO first
//! and then reads the rest straight off the socket (see [`read_payload`]).

mod buffer;
mod direct;
mod errors;
mod frame;
#[cfg(test)]
pub(crate) mod test_utils;

pub use self::buffer::ConnectionBuffer;
pub use self::direct::read_payload;
pub use self::errors::{ConnectionError, ConnectionErrorKind};
pub use self::frame::{ENVELOPE_END, find_delimiter, next_frame};
