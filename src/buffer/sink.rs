//! Sink: a FIFO queue of completed writes
//!
//! A sink wraps one loader configuration and collects the sources produced
//! by its streams. Queue entries appear only as the side effect of closing
//! a stream obtained from the sink; there is no external insertion path.

use super::loader::LoaderConfig;
use super::source::ByteSource;
use super::writer::SourceWriter;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
struct SinkInner {
    config: LoaderConfig,
    queue: Mutex<VecDeque<ByteSource>>,
}

/// Aggregates independent writes into a queue of immutable sources
///
/// Cloning the handle shares the underlying queue; the queue itself is
/// consume-only from the outside.
#[derive(Debug, Clone)]
pub struct SourceSink {
    inner: Arc<SinkInner>,
}

impl SourceSink {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                config,
                queue: Mutex::new(VecDeque::new()),
            }),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    /// Open a new write stream tied to this sink
    ///
    /// Closing the stream appends its source to the queue, in
    /// write-completion order.
    pub fn open_stream(&self) -> SinkStream {
        SinkStream {
            writer: SourceWriter::new(self.inner.config),
            sink: Arc::clone(&self.inner),
        }
    }

    /// Consume the oldest completed source, if any
    pub fn try_next(&self) -> Option<ByteSource> {
        self.inner.queue.lock().pop_front()
    }

    /// Number of completed sources waiting in the queue
    pub fn len(&self) -> usize {
        self.inner.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.queue.lock().is_empty()
    }
}

/// One write stream of a sink
///
/// A single-use accumulator whose close enqueues the result. An abandoned
/// stream (dropped without close) enqueues nothing; its partial progress
/// is discarded.
#[derive(Debug)]
pub struct SinkStream {
    writer: SourceWriter,
    sink: Arc<SinkInner>,
}

impl SinkStream {
    /// Append a single byte
    pub fn push(&self, byte: u8) -> Result<()> {
        self.writer.push(byte)
    }

    /// Append a slice
    pub fn write_bytes(&self, data: &[u8]) -> Result<()> {
        self.writer.write_bytes(data)
    }

    /// Total bytes accepted so far
    pub fn bytes_written(&self) -> usize {
        self.writer.bytes_written()
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_closed()
    }

    /// Close the stream, appending its source to the sink's queue
    ///
    /// Only the first close enqueues; later calls are no-ops.
    pub fn close(&self) {
        if let Some(source) = self.writer.close() {
            debug!(size = source.len(), "sink stream completed");
            self.sink.queue.lock().push_back(source);
        }
    }
}

impl Write for SinkStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
