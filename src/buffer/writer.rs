//! Push-based output accumulator
//!
//! A `SourceWriter` collects writes into chunks under a loader
//! configuration and produces one immutable source when closed. The state
//! machine is OPEN → CLOSED with exactly one transition; repeated close is
//! a no-op and writes after close fail with `Error::Closed`.

use super::loader::LoaderConfig;
use super::source::{ByteSource, Chunk};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::mem;
use tracing::debug;

/// Mutable, single-use builder of one immutable source
///
/// All state sits behind one lock, so concurrent writers and closers
/// serialize; ownership of the in-progress buffer transfers to the
/// finalized source on close and is never aliased afterward.
#[derive(Debug)]
pub struct SourceWriter {
    state: Mutex<State>,
}

#[derive(Debug)]
enum State {
    Open(Open),
    Closed { written: usize },
}

#[derive(Debug)]
struct Open {
    config: LoaderConfig,
    buf: Vec<u8>,
    chunks: Vec<Chunk>,
    written: usize,
}

impl Open {
    /// Append one byte, checking the bound before exceeding it
    ///
    /// Every write funnels through here: the single overflow-check choke
    /// point trades bulk throughput for a strict maximum-size contract.
    fn push(&mut self, byte: u8) -> Result<()> {
        if self.written == self.config.max_size() {
            return Err(Error::Overflow(self.config.max_size()));
        }
        self.buf.push(byte);
        self.written += 1;
        if self.buf.len() == self.config.chunk_size() {
            let full = mem::replace(
                &mut self.buf,
                Vec::with_capacity(self.config.chunk_size()),
            );
            self.chunks.push(Chunk::from_vec(self.config.kind(), full));
        }
        Ok(())
    }
}

impl SourceWriter {
    /// Open a new accumulator under the given configuration
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            state: Mutex::new(State::Open(Open {
                config,
                buf: Vec::with_capacity(config.chunk_size()),
                chunks: Vec::new(),
                written: 0,
            })),
        }
    }

    /// Append a single byte
    pub fn push(&self, byte: u8) -> Result<()> {
        match &mut *self.state.lock() {
            State::Open(open) => open.push(byte),
            State::Closed { .. } => Err(Error::Closed),
        }
    }

    /// Append a slice, decomposed into single-byte appends
    pub fn write_bytes(&self, data: &[u8]) -> Result<()> {
        match &mut *self.state.lock() {
            State::Open(open) => {
                for &byte in data {
                    open.push(byte)?;
                }
                Ok(())
            }
            State::Closed { .. } => Err(Error::Closed),
        }
    }

    /// Total bytes accepted so far
    pub fn bytes_written(&self) -> usize {
        match &*self.state.lock() {
            State::Open(open) => open.written,
            State::Closed { written } => *written,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(&*self.state.lock(), State::Closed { .. })
    }

    /// Transition to CLOSED and produce the source
    ///
    /// The first close finalizes the in-progress buffer (trimmed to its
    /// actual length), combines it with the finished chunks and returns
    /// `Some(source)` — the matching empty singleton when nothing was
    /// written. Every later close is a no-op returning `None`.
    pub fn close(&self) -> Option<ByteSource> {
        let mut state = self.state.lock();
        let open = match &*state {
            State::Closed { .. } => return None,
            State::Open(open) => open,
        };
        let written = open.written;
        let mut open = match mem::replace(&mut *state, State::Closed { written }) {
            State::Open(open) => open,
            State::Closed { .. } => unreachable!("state checked above"),
        };

        if !open.buf.is_empty() {
            let tail = mem::take(&mut open.buf);
            open.chunks.push(Chunk::from_vec(open.config.kind(), tail));
        }
        let source = ByteSource::from_chunks(open.config.kind(), open.chunks);
        let source = if open.config.merge_after_load() {
            source.merge()
        } else {
            source
        };

        debug!(
            written,
            chunks = source.chunk_count(),
            kind = ?open.config.kind(),
            "writer closed"
        );
        Some(source)
    }
}

impl Write for SourceWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::source::StorageKind;

    fn config(kind: StorageKind, max: usize, chunk: usize) -> LoaderConfig {
        LoaderConfig::new(kind, max, chunk).expect("valid test config")
    }

    #[test]
    fn test_writer_builds_chunked_source() -> Result<()> {
        let writer = SourceWriter::new(config(StorageKind::Heap, 1024, 4));
        writer.write_bytes(b"abcdefghij")?;
        assert_eq!(writer.bytes_written(), 10);

        let source = writer.close().expect("first close produces a source");
        assert_eq!(source.len(), 10);
        assert_eq!(source.chunk_count(), 3);
        assert_eq!(source.chunk_size(), 4);
        assert_eq!(source.read(), b"abcdefghij");
        Ok(())
    }

    #[test]
    fn test_writer_empty_close_returns_singleton() {
        for kind in [StorageKind::Heap, StorageKind::Direct] {
            let writer = SourceWriter::new(config(kind, 64, 16));
            let source = writer.close().expect("first close");
            assert_eq!(source, ByteSource::empty(kind));
            assert_eq!(source.chunk_count(), 0);
        }
    }

    #[test]
    fn test_writer_overflow_is_proactive() -> Result<()> {
        let writer = SourceWriter::new(config(StorageKind::Heap, 4, 2));
        writer.write_bytes(b"abcd")?;

        // The fifth byte is rejected before being accepted
        let err = writer.push(b'e').unwrap_err();
        assert!(matches!(err, Error::Overflow(4)));
        assert_eq!(writer.bytes_written(), 4);

        // The accepted bytes still close into a valid source
        let source = writer.close().expect("close after overflow");
        assert_eq!(source.read(), b"abcd");
        Ok(())
    }

    #[test]
    fn test_writer_close_is_idempotent() -> Result<()> {
        let writer = SourceWriter::new(config(StorageKind::Direct, 64, 16));
        writer.write_bytes(b"data")?;

        assert!(writer.close().is_some());
        assert!(writer.close().is_none());
        assert!(writer.close().is_none());
        assert!(writer.is_closed());
        assert_eq!(writer.bytes_written(), 4);
        Ok(())
    }

    #[test]
    fn test_writer_rejects_writes_after_close() {
        let writer = SourceWriter::new(config(StorageKind::Heap, 64, 16));
        writer.close();

        assert!(matches!(writer.push(1), Err(Error::Closed)));
        assert!(matches!(writer.write_bytes(b"x"), Err(Error::Closed)));
    }

    #[test]
    fn test_writer_merge_after_load() -> Result<()> {
        let cfg = config(StorageKind::Heap, 64, 4).with_merge_after_load(true);
        let writer = SourceWriter::new(cfg);
        writer.write_bytes(b"0123456789")?;

        let source = writer.close().expect("close");
        assert_eq!(source.chunk_count(), 1);
        assert_eq!(source.read(), b"0123456789");
        Ok(())
    }

    #[test]
    fn test_writer_io_write_interop() -> Result<()> {
        let mut writer = SourceWriter::new(config(StorageKind::Heap, 64, 8));
        std::io::Write::write_all(&mut writer, b"through io::Write").unwrap();

        let source = writer.close().expect("close");
        assert_eq!(source.read(), b"through io::Write");
        Ok(())
    }

    #[test]
    fn test_writer_serializes_concurrent_writers() {
        use std::sync::Arc;

        let writer = Arc::new(SourceWriter::new(config(StorageKind::Heap, 4096, 64)));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let writer = Arc::clone(&writer);
            handles.push(std::thread::spawn(move || {
                writer.write_bytes(&[1u8; 256]).expect("within bounds");
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let source = writer.close().expect("close");
        assert_eq!(source.len(), 1024);
        assert!(source.read().iter().all(|&b| b == 1));
    }
}
