//! Direct (off-heap) single chunk

use std::alloc::{alloc, dealloc, Layout};
use std::fmt;
use std::ptr::NonNull;
use std::slice;

/// A single contiguous byte region in off-heap memory
///
/// The region is allocated outside any pooling or collection machinery and
/// is exclusively owned by this chunk; it is released when the chunk is
/// dropped. The contents are never written after construction, so shared
/// references may read the region from any thread.
pub struct DirectChunk {
    ptr: NonNull<u8>,
    len: usize,
}

// The region is immutable after construction and exclusively owned,
// so moving or sharing the handle across threads is sound.
unsafe impl Send for DirectChunk {}
unsafe impl Sync for DirectChunk {}

impl DirectChunk {
    /// Allocate an off-heap region and copy a slice into it
    ///
    /// A zero-length slice yields a zero-length chunk without touching the
    /// allocator; sources normalize empty chunks to the empty singletons.
    pub fn from_slice(data: &[u8]) -> Self {
        if data.is_empty() {
            // Zero-size requests are undefined for the global allocator;
            // a well-aligned dangling pointer stands in and Drop skips it.
            return Self {
                ptr: NonNull::dangling(),
                len: 0,
            };
        }
        let layout = Layout::array::<u8>(data.len()).expect("chunk sizes fit a 32-bit count");
        // SAFETY: layout has non-zero size (asserted above).
        let raw = unsafe { alloc(layout) };
        let ptr = match NonNull::new(raw) {
            Some(p) => p,
            None => std::alloc::handle_alloc_error(layout),
        };
        // SAFETY: the region was just allocated with data.len() bytes and
        // does not overlap the source slice.
        unsafe {
            ptr.as_ptr().copy_from_nonoverlapping(data.as_ptr(), data.len());
        }
        Self {
            ptr,
            len: data.len(),
        }
    }

    /// Size of this chunk in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Borrow the chunk contents
    ///
    /// Each borrow is an independent read-only view; cursor state lives in
    /// the caller, never in the chunk.
    pub(crate) fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr/len describe an initialized, exclusively owned region
        // that is never mutated after construction; for len == 0 the pointer
        // is dangling but well-aligned, which from_raw_parts permits.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Owned copy of the chunk contents
    pub fn read(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }
}

impl Clone for DirectChunk {
    /// Deep copy: allocates a fresh off-heap region
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }
}

impl Drop for DirectChunk {
    fn drop(&mut self) {
        if self.len == 0 {
            // Nothing was allocated for a zero-length chunk
            return;
        }
        let layout = Layout::array::<u8>(self.len).expect("layout was valid at allocation");
        // SAFETY: ptr was allocated with this exact layout and is dropped
        // exactly once.
        unsafe { dealloc(self.ptr.as_ptr(), layout) }
    }
}

impl fmt::Debug for DirectChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirectChunk(len={})", self.len)
    }
}
