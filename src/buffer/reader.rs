//! Forward-only readers over immutable sources

use super::source::ByteSource;
use std::io::Read;

/// A single-pass reader over a source's chunks, in order
///
/// Each `open_stream()` call creates a fresh reader with its own cursor, so
/// any number of readers can traverse the same source concurrently. The
/// reader borrows the source; it never copies until asked to read.
#[derive(Debug)]
pub struct SourceReader<'a> {
    source: &'a ByteSource,
    chunk: usize,
    pos: usize,
}

impl<'a> SourceReader<'a> {
    pub(crate) fn new(source: &'a ByteSource) -> Self {
        Self {
            source,
            chunk: 0,
            pos: 0,
        }
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        let chunks = self.source.chunks();
        let ahead: usize = chunks[self.chunk.min(chunks.len())..]
            .iter()
            .map(|c| c.len())
            .sum();
        ahead - self.pos
    }
}

impl Read for SourceReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let chunks = self.source.chunks();
        let mut written = 0;
        while written < buf.len() && self.chunk < chunks.len() {
            let data = chunks[self.chunk].as_slice();
            let n = (data.len() - self.pos).min(buf.len() - written);
            buf[written..written + n].copy_from_slice(&data[self.pos..self.pos + n]);
            written += n;
            self.pos += n;
            if self.pos == data.len() {
                self.chunk += 1;
                self.pos = 0;
            }
        }
        Ok(written)
    }
}
