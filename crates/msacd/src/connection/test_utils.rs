//! Test helpers for the connection module.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// In-memory stream that replays scripted read chunks.
///
/// Each call to `read` returns at most one chunk, so tests control exactly
/// how bytes are split across socket reads. Once the script is exhausted,
/// reads return zero (peer closed). Writes are captured.
#[derive(Debug, Default)]
pub(crate) struct ScriptedStream {
    chunks: VecDeque<Vec<u8>>,
    written: Vec<u8>,
    reads: usize,
}

impl ScriptedStream {
    pub(crate) fn new(chunks: &[&[u8]]) -> Self {
        Self {
            chunks: chunks.iter().map(|chunk| chunk.to_vec()).collect(),
            written: Vec::new(),
            reads: 0,
        }
    }

    /// Bytes written so far.
    pub(crate) fn written(&self) -> &[u8] {
        &self.written
    }

    /// Number of `read` calls served, including the final EOF.
    pub(crate) fn reads(&self) -> usize {
        self.reads
    }
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        let Some(mut chunk) = self.chunks.pop_front() else {
            return Ok(0);
        };
        let count = chunk.len().min(buf.len());
        buf[..count].copy_from_slice(&chunk[..count]);
        if count < chunk.len() {
            self.chunks.push_front(chunk.split_off(count));
        }
        Ok(count)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
