//! Pluggable byte-stream transforms for loading
//!
//! A transform sits between the raw input reader and chunk accumulation,
//! operating on the byte stream rather than per chunk. The trait is the
//! collaborator seam; the shipped implementations are thin wrappers over
//! the `zstd` streaming codecs.

use std::io::{self, Read};

/// A stateless capability applied to the input stream during loading
pub trait Transform: Send + Sync {
    /// Wrap the raw input reader
    ///
    /// The bytes flowing out of the returned reader are what the loader
    /// accumulates into chunks.
    fn wrap<'a>(&self, input: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>>;
}

/// Compresses the input stream with zstd while loading
#[derive(Debug, Clone, Copy)]
pub struct ZstdCompress {
    level: i32,
}

impl ZstdCompress {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCompress {
    fn default() -> Self {
        Self { level: 3 }
    }
}

impl Transform for ZstdCompress {
    fn wrap<'a>(&self, input: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>> {
        let encoder = zstd::stream::read::Encoder::new(input, self.level)?;
        Ok(Box::new(encoder))
    }
}

/// Decompresses a zstd input stream while loading
#[derive(Debug, Clone, Copy, Default)]
pub struct ZstdDecompress;

impl Transform for ZstdDecompress {
    fn wrap<'a>(&self, input: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>> {
        let decoder = zstd::stream::read::Decoder::new(input)?;
        Ok(Box::new(decoder))
    }
}
