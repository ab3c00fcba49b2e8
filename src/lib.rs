// chunkbuf - Memory-bounded chunked byte buffers
// Immutable heap/direct byte sources built by bounded streaming ingestion

#![warn(rust_2018_idioms)]

pub mod buffer;

// Re-exports for convenience
pub use buffer::{
    ByteSource, Loader, LoaderConfig, SinkStream, SourceReader, SourceSink, SourceWriter,
    StorageKind, Transform,
};

/// chunkbuf error types
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Overflow: configured maximum of {0} bytes exceeded")]
        Overflow(usize),

        #[error("Invalid configuration: {0}")]
        InvalidConfiguration(String),

        #[error("Stream is closed")]
        Closed,

        #[error("I/O error: {0}")]
        Io(#[from] std::io::Error),
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
