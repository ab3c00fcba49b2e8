//! Bounded streaming ingestion
//!
//! The loader turns an external byte reader of unknown length into an
//! immutable source while enforcing a maximum-size contract, choosing
//! chunk boundaries as it goes. An already-built source can be re-chunked
//! or relocated through the same configuration without streaming.

use super::source::{ByteSource, Chunk, StorageKind, MAX_SOURCE_SIZE};
use super::transform::Transform;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read};
use std::sync::Arc;
use tracing::{debug, trace};

/// Default chunk boundary for loads that do not specify one
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Immutable loader configuration
///
/// A plain value: equality and hashing are by field, and every `with_*`
/// update returns a new config (or `self` when nothing changes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoaderConfig {
    kind: StorageKind,
    max_size: usize,
    chunk_size: usize,
    merge_after_load: bool,
}

impl LoaderConfig {
    /// Create a validated configuration
    ///
    /// `max_size` and `chunk_size` must be positive; `max_size` must fit
    /// the 32-bit size contract.
    pub fn new(kind: StorageKind, max_size: usize, chunk_size: usize) -> Result<Self> {
        Self::validate(max_size, chunk_size)?;
        Ok(Self {
            kind,
            max_size,
            chunk_size,
            merge_after_load: false,
        })
    }

    fn validate(max_size: usize, chunk_size: usize) -> Result<()> {
        if max_size == 0 {
            return Err(Error::InvalidConfiguration(
                "maximum size must be > 0".into(),
            ));
        }
        if max_size > MAX_SOURCE_SIZE {
            return Err(Error::InvalidConfiguration(format!(
                "maximum size {} exceeds the {} byte source bound",
                max_size, MAX_SOURCE_SIZE
            )));
        }
        if chunk_size == 0 {
            return Err(Error::InvalidConfiguration(
                "chunk size must be > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn merge_after_load(&self) -> bool {
        self.merge_after_load
    }

    /// New config with a different storage kind, or `self` if unchanged
    pub fn with_kind(self, kind: StorageKind) -> Self {
        Self { kind, ..self }
    }

    /// New config with a different maximum size, or `self` if unchanged
    pub fn with_max_size(self, max_size: usize) -> Result<Self> {
        if max_size == self.max_size {
            return Ok(self);
        }
        Self::validate(max_size, self.chunk_size)?;
        Ok(Self { max_size, ..self })
    }

    /// New config with a different chunk size, or `self` if unchanged
    pub fn with_chunk_size(self, chunk_size: usize) -> Result<Self> {
        if chunk_size == self.chunk_size {
            return Ok(self);
        }
        Self::validate(self.max_size, chunk_size)?;
        Ok(Self { chunk_size, ..self })
    }

    /// New config with the merge-after-load flag set, or `self` if unchanged
    pub fn with_merge_after_load(self, merge_after_load: bool) -> Self {
        Self {
            merge_after_load,
            ..self
        }
    }
}

/// Streaming loader: configuration plus an optional input transform
pub struct Loader {
    config: LoaderConfig,
    transform: Option<Arc<dyn Transform>>,
}

impl Loader {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            transform: None,
        }
    }

    /// Install a transform between the raw input and chunk accumulation
    pub fn with_transform(mut self, transform: Arc<dyn Transform>) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Stream a reader into an immutable source
    ///
    /// Chunks are allocated at `min(chunk_size, max_size - loaded)`; a
    /// short read trims the chunk and ends the load. When the input fills
    /// `max_size` exactly, a one-extra-byte probe distinguishes an exact
    /// fit from overflow; on overflow no source is returned. The probe
    /// byte, if any, is consumed and discarded.
    pub fn load<R: Read>(&self, reader: R) -> Result<ByteSource> {
        let mut input: Box<dyn Read + '_> = Box::new(reader);
        if let Some(transform) = &self.transform {
            input = transform.wrap(input)?;
        }

        let max_size = self.config.max_size;
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut loaded = 0usize;

        loop {
            let want = self.config.chunk_size.min(max_size - loaded);
            if want == 0 {
                // Filled exactly at max_size: probe for one more byte
                let mut probe = [0u8; 1];
                if read_full(&mut input, &mut probe)? > 0 {
                    debug!(max_size, "input continues past the configured maximum");
                    return Err(Error::Overflow(max_size));
                }
                break;
            }

            let mut buf = vec![0u8; want];
            let n = read_full(&mut input, &mut buf)?;
            if n == 0 {
                break;
            }
            buf.truncate(n);
            loaded += n;
            trace!(chunk = chunks.len(), size = n, "chunk loaded");
            chunks.push(Chunk::from_vec(self.config.kind, buf));
            if n < want {
                // Short read: end of input
                break;
            }
        }

        debug!(
            loaded,
            chunks = chunks.len(),
            kind = ?self.config.kind,
            "streaming load complete"
        );

        let source = ByteSource::from_chunks(self.config.kind, chunks);
        if self.config.merge_after_load {
            Ok(source.merge())
        } else {
            Ok(source)
        }
    }

    /// Convert an existing source under this configuration
    ///
    /// Skips streaming: after validating the size against `max_size`, the
    /// source is relocated/re-chunked (or merged) directly. With a
    /// transform configured the fast path would bypass it, so the source
    /// is streamed through `load` instead.
    pub fn load_source(&self, source: ByteSource) -> Result<ByteSource> {
        if self.transform.is_some() {
            return self.load(source.open_stream());
        }
        if source.len() > self.config.max_size {
            return Err(Error::Overflow(self.config.max_size));
        }
        if self.config.merge_after_load {
            Ok(match self.config.kind {
                StorageKind::Heap => source.to_heap(true),
                StorageKind::Direct => source.to_direct(true),
            })
        } else {
            match self.config.kind {
                StorageKind::Heap => source.to_heap_chunked(self.config.chunk_size),
                StorageKind::Direct => source.to_direct_chunked(self.config.chunk_size),
            }
        }
    }
}

/// Read until the buffer fills or the input ends; returns bytes read
fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
