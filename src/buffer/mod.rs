//! Chunked byte buffers
//!
//! Immutable in-memory byte containers that are heap- or direct-resident,
//! contiguous or split into chunks, built by bounded-size streaming ingestion
//! and convertible between representations with minimal copying.
//!
//! # Architecture
//!
//! ```text
//! ByteSource (immutable)
//!   ├─→ Empty(Heap | Direct)       → shared const singletons, zero chunks
//!   ├─→ Single(Chunk)              → one contiguous region
//!   └─→ Chunked(ChunkGroup)        → ordered, homogeneous, ≥2 chunks
//!
//! Loader (config + streaming algorithm)
//!   └─→ reader → [Transform] → chunk accumulation → ByteSource
//!
//! SourceWriter (OPEN → CLOSED, exactly once)
//!   └─→ push-based writes → close() → ByteSource
//!
//! SourceSink
//!   └─→ open_stream() ... close() → FIFO queue of ByteSource
//! ```
//!
//! Completed sources never change and are safe for unsynchronized concurrent
//! reads; every `open_stream()` call returns an independent cursor. Writers
//! and sinks serialize their mutable state behind a lock.

pub mod bench;
pub mod direct;
pub mod group;
pub mod heap;
pub mod loader;
pub mod reader;
pub mod sink;
pub mod source;
pub mod transform;
pub mod writer;

pub use direct::DirectChunk;
pub use group::ChunkGroup;
pub use heap::HeapChunk;
pub use loader::{Loader, LoaderConfig};
pub use reader::SourceReader;
pub use sink::{SinkStream, SourceSink};
pub use source::{ByteSource, Chunk, StorageKind, MAX_SOURCE_SIZE};
pub use transform::{Transform, ZstdCompress, ZstdDecompress};
pub use writer::SourceWriter;
