//! Envelope framing over the receive buffer.
//!
//! Requests carry no length prefix. A frame runs from the front of the
//! buffer through the first literal `</HDRadio-Envelope>`.

use super::buffer::ConnectionBuffer;
use super::errors::ConnectionError;

/// Closing tag that terminates every envelope on the wire.
pub const ENVELOPE_END: &[u8] = b"</HDRadio-Envelope>";

/// Returns the index of the first byte of the first [`ENVELOPE_END`] in
/// `haystack`, or `None` if it does not occur in full.
#[must_use]
pub fn find_delimiter(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(ENVELOPE_END.len())
        .position(|window| window == ENVELOPE_END)
}

/// Removes the next complete frame (delimiter included) from the buffer.
///
/// Returns `Ok(None)` when more bytes are needed.
///
/// # Errors
///
/// Returns [`ConnectionError::FramingOverflow`] when the buffer is full and
/// still holds no delimiter.
pub fn next_frame<S>(buffer: &mut ConnectionBuffer<S>) -> Result<Option<Vec<u8>>, ConnectionError> {
    match find_delimiter(buffer.buffered()) {
        Some(start) => buffer.consume(start + ENVELOPE_END.len()).map(Some),
        None if buffer.is_full() => Err(ConnectionError::FramingOverflow {
            capacity: buffer.capacity(),
        }),
        None => Ok(None),
    }
}
