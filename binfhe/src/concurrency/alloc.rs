use math::error::{Error, Result};

/// Byte alignment of every buffer handed out by an [Allocator].
pub const DEFAULT_ALIGN: usize = 64;

const WORDS_PER_LINE: usize = DEFAULT_ALIGN / size_of::<u64>();

/// The allocator service: zeroed, cache-line aligned word buffers, requested
/// local to a memory domain. The core never picks `node` itself; it forwards
/// the domain of the calling worker.
pub trait Allocator: Send + Sync {
    fn alloc_aligned(&self, words: usize, node: usize) -> Result<AlignedBuffer>;
}

/// Heap allocator ignoring `node`. Fails with [Error::AllocationFailure]
/// when the request cannot be reserved.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn alloc_aligned(&self, words: usize, node: usize) -> Result<AlignedBuffer> {
        AlignedBuffer::zeroed(words, node)
    }
}

/// A zeroed u64 buffer whose first word sits on a [DEFAULT_ALIGN] boundary.
///
/// The backing vector is over-allocated by one cache line and the view
/// starts at the first aligned word, so no unsafe code is involved.
#[derive(Debug)]
pub struct AlignedBuffer {
    raw: Vec<u64>,
    offset: usize,
    len: usize,
    node: usize,
}

impl AlignedBuffer {
    pub fn zeroed(words: usize, node: usize) -> Result<Self> {
        let total: usize = words
            .checked_add(WORDS_PER_LINE)
            .ok_or_else(|| Error::AllocationFailure(format!("{} words overflow", words)))?;
        let mut raw: Vec<u64> = Vec::new();
        raw.try_reserve_exact(total).map_err(|e| {
            Error::AllocationFailure(format!("{} words on node {}: {}", words, node, e))
        })?;
        raw.resize(total, 0);
        let misalign: usize = (raw.as_ptr() as usize) % DEFAULT_ALIGN;
        let offset: usize = if misalign == 0 {
            0
        } else {
            (DEFAULT_ALIGN - misalign) / size_of::<u64>()
        };
        Ok(Self {
            raw,
            offset,
            len: words,
            node,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node(&self) -> usize {
        self.node
    }

    /// Copies the content into a fresh buffer requested from `alloc` on `node`.
    pub fn replicate(&self, alloc: &dyn Allocator, node: usize) -> Result<Self> {
        let mut copy: AlignedBuffer = alloc.alloc_aligned(self.len, node)?;
        copy.as_mut().copy_from_slice(self.as_ref());
        Ok(copy)
    }
}

impl AsRef<[u64]> for AlignedBuffer {
    fn as_ref(&self) -> &[u64] {
        &self.raw[self.offset..self.offset + self.len]
    }
}

impl AsMut<[u64]> for AlignedBuffer {
    fn as_mut(&mut self) -> &mut [u64] {
        &mut self.raw[self.offset..self.offset + self.len]
    }
}

impl Clone for AlignedBuffer {
    fn clone(&self) -> Self {
        // The copy is re-aligned rather than keeping the source offset.
        let mut raw: Vec<u64> = vec![0; self.len + WORDS_PER_LINE];
        let misalign: usize = (raw.as_ptr() as usize) % DEFAULT_ALIGN;
        let offset: usize = if misalign == 0 {
            0
        } else {
            (DEFAULT_ALIGN - misalign) / size_of::<u64>()
        };
        raw[offset..offset + self.len].copy_from_slice(self.as_ref());
        Self {
            raw,
            offset,
            len: self.len,
            node: self.node,
        }
    }
}

impl PartialEq for AlignedBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}

impl Eq for AlignedBuffer {}

#[cfg(test)]
mod tests {
    use super::{AlignedBuffer, Allocator, SystemAllocator, DEFAULT_ALIGN};
    use math::error::Error;

    #[test]
    fn buffers_are_aligned_and_zeroed() {
        for words in [0usize, 1, 7, 8, 1000] {
            let buf: AlignedBuffer = SystemAllocator.alloc_aligned(words, 0).unwrap();
            assert_eq!(buf.len(), words);
            assert_eq!(buf.as_ref().as_ptr() as usize % DEFAULT_ALIGN, 0);
            assert!(buf.as_ref().iter().all(|x| *x == 0));
        }
    }

    #[test]
    fn clones_stay_aligned() {
        let mut buf: AlignedBuffer = AlignedBuffer::zeroed(33, 1).unwrap();
        buf.as_mut()[5] = 42;
        let copy: AlignedBuffer = buf.clone();
        assert_eq!(copy, buf);
        assert_eq!(copy.as_ref().as_ptr() as usize % DEFAULT_ALIGN, 0);
        let replica: AlignedBuffer = buf.replicate(&SystemAllocator, 3).unwrap();
        assert_eq!(replica.node(), 3);
        assert_eq!(replica.as_ref()[5], 42);
    }

    #[test]
    fn oversized_requests_fail_cleanly() {
        assert!(matches!(
            AlignedBuffer::zeroed(usize::MAX / 4, 0),
            Err(Error::AllocationFailure(_))
        ));
    }
}
