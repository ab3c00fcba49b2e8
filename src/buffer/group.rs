//! Ordered chunk collection backing multi-chunk sources

use super::source::{Chunk, StorageKind, MAX_SOURCE_SIZE};

/// An ordered group of two or more homogeneous chunks
///
/// Chunks are owned exclusively by the group, never shared across two live
/// groups and never mutated after construction. Iteration order equals
/// insertion order and is never reordered.
///
/// The representative chunk size is the first chunk's size; by construction
/// only the final chunk of a streaming load may be shorter, so the first
/// chunk is the threshold used for merge decisions.
#[derive(Debug, Clone)]
pub struct ChunkGroup {
    chunks: Vec<Chunk>,
    total: usize,
}

impl ChunkGroup {
    /// Build a group from at least two chunks
    ///
    /// Preconditions (validated by the callers, not re-checked here): ≥2
    /// chunks, homogeneous storage kind, each chunk within the 32-bit size
    /// bound.
    pub(crate) fn new(chunks: Vec<Chunk>) -> Self {
        debug_assert!(chunks.len() >= 2, "groups hold at least two chunks");
        debug_assert!(
            chunks.windows(2).all(|w| w[0].kind() == w[1].kind()),
            "groups are homogeneous"
        );
        let total = chunks.iter().map(Chunk::len).sum();
        debug_assert!(total <= MAX_SOURCE_SIZE);
        Self { chunks, total }
    }

    /// Total size in bytes, derived from the chunks
    ///
    /// Always positive: a group holds at least two chunks and sources
    /// never mint empty chunks.
    pub fn len(&self) -> usize {
        self.total
    }

    /// Storage kind shared by every chunk in the group
    pub fn kind(&self) -> StorageKind {
        self.chunks[0].kind()
    }

    /// Number of chunks in the group
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Representative chunk size (the first chunk's size)
    pub fn chunk_size(&self) -> usize {
        self.chunks[0].len()
    }

    pub(crate) fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub(crate) fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }

    /// Owned copy of the concatenated contents, in chunk order
    pub fn read(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total);
        for chunk in &self.chunks {
            out.extend_from_slice(chunk.as_slice());
        }
        out
    }
}
