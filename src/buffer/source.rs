//! The source variant family
//!
//! A `ByteSource` is an immutable in-memory byte container. It is empty,
//! a single contiguous chunk, or an ordered group of chunks, and lives
//! either in heap or in direct (off-heap) memory. All "modifying"
//! operations consume the source and return a new one, or hand back the
//! same value when nothing changes.

use super::direct::DirectChunk;
use super::group::ChunkGroup;
use super::heap::HeapChunk;
use super::loader::{Loader, LoaderConfig};
use super::reader::SourceReader;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::slice;

/// Upper bound on any source size: totals must fit a 32-bit count
pub const MAX_SOURCE_SIZE: usize = u32::MAX as usize;

/// Where a source's bytes live
///
/// Exactly one kind holds for every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Managed heap memory
    Heap,
    /// Off-heap memory with explicit lifetime handling
    Direct,
}

impl StorageKind {
    pub fn is_heap(self) -> bool {
        matches!(self, StorageKind::Heap)
    }

    pub fn is_direct(self) -> bool {
        matches!(self, StorageKind::Direct)
    }
}

/// One contiguous storage unit within a source
#[derive(Debug, Clone)]
pub enum Chunk {
    Heap(HeapChunk),
    Direct(DirectChunk),
}

impl Chunk {
    /// Build a chunk of the given kind from an owned vector
    ///
    /// Heap chunks take ownership without copying; direct chunks perform
    /// one bulk copy into a fresh off-heap region. Callers route empty
    /// input to the empty singletons instead of minting a chunk.
    pub(crate) fn from_vec(kind: StorageKind, data: Vec<u8>) -> Self {
        debug_assert!(!data.is_empty(), "empty sources use the empty singleton");
        match kind {
            StorageKind::Heap => Chunk::Heap(HeapChunk::from_vec(data)),
            StorageKind::Direct => Chunk::Direct(DirectChunk::from_slice(&data)),
        }
    }

    /// Size of this chunk in bytes
    pub fn len(&self) -> usize {
        match self {
            Chunk::Heap(c) => c.len(),
            Chunk::Direct(c) => c.len(),
        }
    }

    /// Storage kind of this chunk
    pub fn kind(&self) -> StorageKind {
        match self {
            Chunk::Heap(_) => StorageKind::Heap,
            Chunk::Direct(_) => StorageKind::Direct,
        }
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            Chunk::Heap(c) => c.as_slice(),
            Chunk::Direct(c) => c.as_slice(),
        }
    }

    /// Owned copy of the chunk contents
    pub fn read(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    /// Move this chunk to the requested storage kind
    ///
    /// Identity when the kind already matches; otherwise allocates a new
    /// destination-kind region and performs one bulk copy.
    pub(crate) fn relocate(self, kind: StorageKind) -> Chunk {
        if self.kind() == kind {
            return self;
        }
        match kind {
            StorageKind::Heap => Chunk::Heap(HeapChunk::from_slice(self.as_slice())),
            StorageKind::Direct => Chunk::Direct(DirectChunk::from_slice(self.as_slice())),
        }
    }
}

/// Immutable in-memory byte container
///
/// The closed set of variants: empty, single-chunk, multi-chunk, each
/// heap- or direct-resident. Conversion sites match exhaustively so no
/// combination is ever left unhandled.
#[derive(Debug, Clone)]
pub enum ByteSource {
    /// Zero bytes, tagged with a storage kind
    Empty(StorageKind),
    /// One contiguous chunk
    Single(Chunk),
    /// An ordered group of two or more homogeneous chunks
    Chunked(ChunkGroup),
}

impl ByteSource {
    /// The shared heap-tagged empty source
    pub const EMPTY_HEAP: ByteSource = ByteSource::Empty(StorageKind::Heap);

    /// The shared direct-tagged empty source
    pub const EMPTY_DIRECT: ByteSource = ByteSource::Empty(StorageKind::Direct);

    /// The shared empty source for a storage kind
    pub fn empty(kind: StorageKind) -> ByteSource {
        match kind {
            StorageKind::Heap => Self::EMPTY_HEAP,
            StorageKind::Direct => Self::EMPTY_DIRECT,
        }
    }

    /// Copy a slice into a new single-chunk source of the given kind
    pub fn from_slice(kind: StorageKind, data: &[u8]) -> ByteSource {
        debug_assert!(data.len() <= MAX_SOURCE_SIZE);
        if data.is_empty() {
            return Self::empty(kind);
        }
        match kind {
            StorageKind::Heap => ByteSource::Single(Chunk::Heap(HeapChunk::from_slice(data))),
            StorageKind::Direct => ByteSource::Single(Chunk::Direct(DirectChunk::from_slice(data))),
        }
    }

    /// Wrap an owned vector as a single-chunk source
    ///
    /// Copy-free for the heap kind; one bulk copy for the direct kind.
    pub fn from_vec(kind: StorageKind, data: Vec<u8>) -> ByteSource {
        debug_assert!(data.len() <= MAX_SOURCE_SIZE);
        if data.is_empty() {
            return Self::empty(kind);
        }
        ByteSource::Single(Chunk::from_vec(kind, data))
    }

    /// Assemble the 0 / 1 / many-chunk result of a load or write
    pub(crate) fn from_chunks(kind: StorageKind, mut chunks: Vec<Chunk>) -> ByteSource {
        match chunks.len() {
            0 => Self::empty(kind),
            1 => ByteSource::Single(chunks.pop().expect("one chunk present")),
            _ => ByteSource::Chunked(ChunkGroup::new(chunks)),
        }
    }

    /// Total size in bytes
    pub fn len(&self) -> usize {
        match self {
            ByteSource::Empty(_) => 0,
            ByteSource::Single(c) => c.len(),
            ByteSource::Chunked(g) => g.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage kind of this source
    pub fn kind(&self) -> StorageKind {
        match self {
            ByteSource::Empty(kind) => *kind,
            ByteSource::Single(c) => c.kind(),
            ByteSource::Chunked(g) => g.kind(),
        }
    }

    pub fn is_heap(&self) -> bool {
        self.kind().is_heap()
    }

    pub fn is_direct(&self) -> bool {
        self.kind().is_direct()
    }

    /// Number of chunks: 0 for empty, 1 for single, ≥2 for chunked
    pub fn chunk_count(&self) -> usize {
        match self {
            ByteSource::Empty(_) => 0,
            ByteSource::Single(_) => 1,
            ByteSource::Chunked(g) => g.chunk_count(),
        }
    }

    /// Representative chunk size
    ///
    /// The first chunk's size; only the final chunk produced by a
    /// streaming load may be shorter.
    pub fn chunk_size(&self) -> usize {
        match self {
            ByteSource::Empty(_) => 0,
            ByteSource::Single(c) => c.len(),
            ByteSource::Chunked(g) => g.chunk_size(),
        }
    }

    pub(crate) fn chunks(&self) -> &[Chunk] {
        match self {
            ByteSource::Empty(_) => &[],
            ByteSource::Single(c) => slice::from_ref(c),
            ByteSource::Chunked(g) => g.chunks(),
        }
    }

    /// Owned copy of the full contents, never an alias into backing storage
    pub fn read(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for chunk in self.chunks() {
            out.extend_from_slice(chunk.as_slice());
        }
        out
    }

    /// Open a fresh forward-only reader over this source
    ///
    /// Every call returns an independent cursor, so concurrent readers
    /// over the same source never interfere.
    pub fn open_stream(&self) -> SourceReader<'_> {
        SourceReader::new(self)
    }

    /// Push the full contents into a writer; returns bytes written
    pub fn copy_to<W: Write>(&self, writer: &mut W) -> Result<usize> {
        for chunk in self.chunks() {
            writer.write_all(chunk.as_slice())?;
        }
        Ok(self.len())
    }

    /// Bulk-copy into a destination slice, stopping early when it fills
    ///
    /// Returns the number of bytes actually written.
    pub fn copy_into(&self, dest: &mut [u8]) -> usize {
        let mut written = 0;
        for chunk in self.chunks() {
            if written == dest.len() {
                break;
            }
            let data = chunk.as_slice();
            let n = data.len().min(dest.len() - written);
            dest[written..written + n].copy_from_slice(&data[..n]);
            written += n;
        }
        written
    }

    /// Reduce to the single-chunk equivalent
    ///
    /// Copy-free when the source already has at most one chunk.
    pub fn merge(self) -> ByteSource {
        match self {
            ByteSource::Empty(_) | ByteSource::Single(_) => self,
            ByteSource::Chunked(g) => {
                let kind = g.kind();
                ByteSource::Single(Chunk::from_vec(kind, g.read()))
            }
        }
    }

    /// Re-chunk so every chunk is at least `min_chunk_size` bytes
    ///
    /// Returns `self` when `min_chunk_size` does not exceed the current
    /// representative chunk size; collapses to one chunk when it reaches
    /// the total size; otherwise performs a fresh bounded copy pass with
    /// the loader's algorithm, so only the final chunk may come out
    /// shorter than requested.
    pub fn rechunk(self, min_chunk_size: usize) -> Result<ByteSource> {
        if min_chunk_size == 0 {
            return Err(Error::InvalidConfiguration(
                "minimum chunk size must be > 0".into(),
            ));
        }
        match &self {
            ByteSource::Empty(_) | ByteSource::Single(_) => Ok(self),
            ByteSource::Chunked(g) => {
                if min_chunk_size <= g.chunk_size() {
                    return Ok(self);
                }
                if min_chunk_size >= g.len() {
                    return Ok(self.merge());
                }
                let config = LoaderConfig::new(self.kind(), self.len(), min_chunk_size)?;
                let rechunked = Loader::new(config).load(self.open_stream())?;
                Ok(rechunked)
            }
        }
    }

    /// Relocate to heap storage, optionally merging to one chunk
    ///
    /// Identity when already heap-resident and no merge is requested;
    /// chunk boundaries are preserved when not merging.
    pub fn to_heap(self, merge: bool) -> ByteSource {
        self.relocate(StorageKind::Heap, merge)
    }

    /// Relocate to direct storage, optionally merging to one chunk
    pub fn to_direct(self, merge: bool) -> ByteSource {
        self.relocate(StorageKind::Direct, merge)
    }

    /// Relocate to heap storage and re-chunk to the given chunk size
    pub fn to_heap_chunked(self, chunk_size: usize) -> Result<ByteSource> {
        self.relocate_chunked(StorageKind::Heap, chunk_size)
    }

    /// Relocate to direct storage and re-chunk to the given chunk size
    pub fn to_direct_chunked(self, chunk_size: usize) -> Result<ByteSource> {
        self.relocate_chunked(StorageKind::Direct, chunk_size)
    }

    fn relocate(self, kind: StorageKind, merge: bool) -> ByteSource {
        if self.kind() == kind {
            return if merge { self.merge() } else { self };
        }
        match self {
            ByteSource::Empty(_) => Self::empty(kind),
            ByteSource::Single(c) => ByteSource::Single(c.relocate(kind)),
            ByteSource::Chunked(g) => {
                if merge {
                    ByteSource::Single(Chunk::from_vec(kind, g.read()))
                } else {
                    let chunks = g
                        .into_chunks()
                        .into_iter()
                        .map(|c| c.relocate(kind))
                        .collect();
                    ByteSource::Chunked(ChunkGroup::new(chunks))
                }
            }
        }
    }

    /// Relocation with rebuilt chunk boundaries
    ///
    /// When the kind already matches this is a plain `rechunk`; when it
    /// changes, the bytes are streamed once through the loader so the copy
    /// that relocation needs anyway also establishes the new boundaries.
    fn relocate_chunked(self, kind: StorageKind, chunk_size: usize) -> Result<ByteSource> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfiguration(
                "chunk size must be > 0".into(),
            ));
        }
        if self.is_empty() {
            return Ok(Self::empty(kind));
        }
        if self.kind() == kind {
            return self.rechunk(chunk_size);
        }
        let config = LoaderConfig::new(kind, self.len(), chunk_size)?;
        Loader::new(config).load(self.open_stream())
    }
}

/// Value equality: same storage kind, same bytes
///
/// Chunk layout is a representation detail of an immutable value and does
/// not participate; layout assertions go through `chunk_count`.
impl PartialEq for ByteSource {
    fn eq(&self, other: &Self) -> bool {
        if self.kind() != other.kind() || self.len() != other.len() {
            return false;
        }
        self.read() == other.read()
    }
}

impl Eq for ByteSource {}
