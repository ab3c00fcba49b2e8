//! Heap-resident single chunk

use bytes::Bytes;
use std::fmt;

/// A single contiguous byte region in managed heap memory
///
/// Immutable after construction. Cloning is cheap (the backing `Bytes` is
/// reference-counted), but `read()` always hands out an owned copy so no
/// caller ever holds an alias into the backing storage.
#[derive(Clone)]
pub struct HeapChunk {
    data: Bytes,
}

impl HeapChunk {
    /// Wrap an owned byte vector without copying
    ///
    /// Zero-length input is a valid zero-length chunk; sources normalize
    /// empty chunks to the empty singletons.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data: Bytes::from(data),
        }
    }

    /// Copy a slice into a new heap chunk
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            data: Bytes::copy_from_slice(data),
        }
    }

    /// Size of this chunk in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Borrow the chunk contents
    ///
    /// Internal read primitive; public accessors copy instead.
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Owned copy of the chunk contents
    pub fn read(&self) -> Vec<u8> {
        self.data.to_vec()
    }
}

impl fmt::Debug for HeapChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeapChunk(len={})", self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_chunk_read_is_a_copy() {
        let chunk = HeapChunk::from_slice(b"hello");
        let mut copy = chunk.read();
        copy[0] = b'H';

        // The chunk itself is untouched
        assert_eq!(chunk.read(), b"hello");
        assert_eq!(chunk.len(), 5);
    }

    #[test]
    fn test_heap_chunk_from_vec_no_copy() {
        let chunk = HeapChunk::from_vec(vec![1, 2, 3, 4]);
        assert_eq!(chunk.len(), 4);
        assert_eq!(chunk.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_heap_chunk_zero_length_is_safe() {
        let chunk = HeapChunk::from_slice(b"");
        assert_eq!(chunk.len(), 0);
        assert_eq!(chunk.read(), Vec::<u8>::new());
    }

    #[test]
    fn test_heap_chunk_clone_shares_storage() {
        let chunk = HeapChunk::from_slice(b"shared");
        let clone = chunk.clone();
        assert_eq!(chunk.read(), clone.read());
    }
}
