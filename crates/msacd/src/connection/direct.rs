//! Raw payload reads for Direct File Copy.

use std::io::Read;

use super::buffer::ConnectionBuffer;
use super::errors::ConnectionError;

/// Reads a `size`-byte payload that directly follows the current frame.
///
/// Bytes already sitting in the buffer belong to the payload and are drained
/// first; the remainder is read from the stream without passing through the
/// buffer, so payloads larger than the buffer capacity are fine.
///
/// # Errors
///
/// Returns [`ConnectionError::ConnectionLost`] if the peer closes before the
/// payload is complete, or [`ConnectionError::Io`] if a read fails.
pub fn read_payload<S: Read>(
    buffer: &mut ConnectionBuffer<S>,
    size: usize,
) -> Result<Vec<u8>, ConnectionError> {
    let mut payload = vec![0_u8; size];
    let already = size.min(buffer.available());
    let (buffered, remaining) = payload.split_at_mut(already);
    buffer.consume_into(buffered)?;
    buffer.read_direct(remaining)?;
    Ok(payload)
}
