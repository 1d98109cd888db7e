//! Fixed-capacity receive FIFO bound to one client stream.

use std::io::{self, Read, Write};

use super::errors::ConnectionError;

/// Receive buffer and stream for one client connection.
///
/// Valid bytes occupy `buffer[..available]`. [`consume_into`] copies a prefix
/// out and shifts the rest down to index zero, so scans always start at the
/// front of the buffer.
///
/// [`consume_into`]: Self::consume_into
#[derive(Debug)]
pub struct ConnectionBuffer<S> {
    stream: S,
    buffer: Box<[u8]>,
    available: usize,
}

impl<S> ConnectionBuffer<S> {
    /// Wraps a stream with an empty buffer of `capacity` bytes.
    pub fn new(stream: S, capacity: usize) -> Self {
        Self {
            stream,
            buffer: vec![0_u8; capacity].into_boxed_slice(),
            available: 0,
        }
    }

    /// Total buffer capacity.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of buffered, not yet consumed bytes.
    pub fn available(&self) -> usize {
        self.available
    }

    /// Returns `true` when no free space remains.
    pub fn is_full(&self) -> bool {
        self.available == self.buffer.len()
    }

    /// The buffered bytes, oldest first.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer[..self.available]
    }

    /// Borrows the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Copies the first `target.len()` buffered bytes into `target` and
    /// compacts the remainder to the front of the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::BufferUnderrun`] when fewer bytes are
    /// buffered than requested. The buffer is left untouched in that case.
    pub fn consume_into(&mut self, target: &mut [u8]) -> Result<(), ConnectionError> {
        let length = target.len();
        if length > self.available {
            return Err(ConnectionError::BufferUnderrun {
                requested: length,
                available: self.available,
            });
        }
        target.copy_from_slice(&self.buffer[..length]);
        self.buffer.copy_within(length..self.available, 0);
        self.available -= length;
        Ok(())
    }

    /// Removes and returns the first `length` buffered bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::BufferUnderrun`] when fewer bytes are
    /// buffered than requested.
    pub fn consume(&mut self, length: usize) -> Result<Vec<u8>, ConnectionError> {
        let mut consumed = vec![0_u8; length];
        self.consume_into(&mut consumed)?;
        Ok(consumed)
    }
}

impl<S: Read> ConnectionBuffer<S> {
    /// Performs one blocking read into the free tail of the buffer.
    ///
    /// Returns `Ok(false)` when the peer closed the connection and `Ok(true)`
    /// when at least one byte was appended.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::FramingOverflow`] if the buffer is already
    /// full, or [`ConnectionError::Io`] if the read fails.
    pub fn receive(&mut self) -> Result<bool, ConnectionError> {
        if self.is_full() {
            // A zero-length read would be indistinguishable from EOF.
            return Err(ConnectionError::FramingOverflow {
                capacity: self.capacity(),
            });
        }
        let read = read_with_retry(&mut self.stream, &mut self.buffer[self.available..])?;
        if read == 0 {
            return Ok(false);
        }
        self.available += read;
        Ok(true)
    }

    /// Fills `target` straight from the stream, bypassing the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::ConnectionLost`] if the peer closes before
    /// `target` is full, or [`ConnectionError::Io`] if a read fails.
    pub fn read_direct(&mut self, target: &mut [u8]) -> Result<(), ConnectionError> {
        let mut filled = 0;
        while filled < target.len() {
            let read = read_with_retry(&mut self.stream, &mut target[filled..])?;
            if read == 0 {
                return Err(ConnectionError::ConnectionLost {
                    missing: target.len() - filled,
                });
            }
            filled += read;
        }
        Ok(())
    }
}

impl<S: Write> ConnectionBuffer<S> {
    /// Writes a complete response to the stream.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Io`] if the write or flush fails.
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), ConnectionError> {
        self.stream.write_all(bytes)?;
        self.stream.flush()?;
        Ok(())
    }
}

/// Reads from the stream, retrying on interrupts.
fn read_with_retry<R: Read>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::super::ConnectionErrorKind;
    use super::super::test_utils::ScriptedStream;
    use super::*;

    fn buffer_with(chunks: &[&[u8]], capacity: usize) -> ConnectionBuffer<ScriptedStream> {
        ConnectionBuffer::new(ScriptedStream::new(chunks), capacity)
    }

    #[test]
    fn receive_appends_each_read() {
        let mut buffer = buffer_with(&[b"AB", b"CD"], 16);
        assert!(buffer.receive().expect("first read"));
        assert!(buffer.receive().expect("second read"));
        assert_eq!(buffer.buffered(), b"ABCD");
        assert_eq!(buffer.available(), 4);
    }

    #[test]
    fn receive_reports_peer_close() {
        let mut buffer = buffer_with(&[], 16);
        assert!(!buffer.receive().expect("eof read"));
        assert_eq!(buffer.available(), 0);
    }

    #[test]
    fn receive_never_reads_past_capacity() {
        let mut buffer = buffer_with(&[b"0123456789"], 4);
        assert!(buffer.receive().expect("read"));
        assert_eq!(buffer.buffered(), b"0123");
        assert!(buffer.is_full());
        let error = buffer.receive().expect_err("full buffer cannot receive");
        assert_eq!(error.kind(), ConnectionErrorKind::FramingOverflow);
    }

    #[test]
    fn consume_preserves_order_of_remaining_bytes() {
        let mut buffer = buffer_with(&[b"AB", b"CD"], 16);
        buffer.receive().expect("first read");
        buffer.receive().expect("second read");

        assert_eq!(buffer.consume(2).expect("consume"), b"AB");

        let mut fresh = buffer_with(&[b"CD"], 16);
        fresh.receive().expect("fresh read");
        assert_eq!(buffer.buffered(), fresh.buffered());
        assert_eq!(buffer.available(), fresh.available());
    }

    #[test]
    fn consume_then_receive_appends_after_remainder() {
        let mut buffer = buffer_with(&[b"ABC", b"DE"], 8);
        buffer.receive().expect("first read");
        assert_eq!(buffer.consume(1).expect("consume"), b"A");
        buffer.receive().expect("second read");
        assert_eq!(buffer.buffered(), b"BCDE");
    }

    #[rstest]
    #[case(0, 3)]
    #[case(5, 1)]
    fn consume_beyond_available_fails(#[case] buffered: usize, #[case] extra: usize) {
        let data = vec![b'x'; buffered];
        let mut buffer = buffer_with(&[&data], 16);
        if buffered > 0 {
            buffer.receive().expect("read");
        }
        let error = buffer
            .consume(buffered + extra)
            .expect_err("underrun should fail");
        assert!(matches!(
            error,
            ConnectionError::BufferUnderrun { requested, available }
                if requested == buffered + extra && available == buffered
        ));
        assert_eq!(buffer.available(), buffered);
    }

    #[test]
    fn read_direct_bypasses_buffer() {
        let mut buffer = buffer_with(&[b"head", b"tail"], 16);
        buffer.receive().expect("read");
        let mut payload = [0_u8; 4];
        buffer.read_direct(&mut payload).expect("direct read");
        assert_eq!(&payload, b"tail");
        assert_eq!(buffer.buffered(), b"head");
    }

    #[test]
    fn read_direct_reports_lost_connection() {
        let mut buffer = buffer_with(&[b"ab"], 16);
        let mut payload = [0_u8; 5];
        let error = buffer
            .read_direct(&mut payload)
            .expect_err("short stream should fail");
        assert!(matches!(error, ConnectionError::ConnectionLost { missing: 3 }));
    }

    #[test]
    fn send_writes_whole_response() {
        let mut buffer = buffer_with(&[], 16);
        buffer.send(b"<reply/>").expect("send");
        assert_eq!(buffer.get_ref().written(), b"<reply/>");
    }
}
