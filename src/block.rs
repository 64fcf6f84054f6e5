//! Contains the ``ByteBlock`` struct, an immutable view over a shared, contiguous run of bytes.
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use bytemuck::Pod;

use crate::error::{WavChunksError, WavChunksResult};

/// An immutable block of bytes.
///
/// The bytes live behind an ``Arc`` so that ``slice`` can hand out new blocks over the same
/// allocation without copying. ``copy`` is the only way to get an independent duplicate.
#[derive(Clone)]
pub struct ByteBlock {
    data: Arc<[u8]>,
    start: usize,
    len: usize,
}

impl ByteBlock {
    /// Allocates a zero-filled block of ``size`` bytes.
    ///
    /// Fails with ``InvalidInput`` when ``size`` is zero, there is nothing to back the block.
    pub fn allocate(size: usize) -> WavChunksResult<Self> {
        if size == 0 {
            return Err(WavChunksError::InvalidInput(
                "Missing input data, cannot allocate an empty block".into(),
            ));
        }
        Ok(ByteBlock::from(vec![0u8; size]))
    }

    /// Creates a block from any slice of plain-old-data values, e.g. ``&[u16]`` or ``&[f32]``.
    /// The values are laid out in native byte order, as they are in memory.
    pub fn from_pod<T: Pod>(values: &[T]) -> Self {
        ByteBlock::from(bytemuck::cast_slice::<T, u8>(values))
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..self.start + self.len]
    }

    /// Returns a new block over ``[position, position + length)``. ``None`` means "to the end".
    ///
    /// Out of range positions and lengths are clamped to the block. The returned block shares
    /// the underlying allocation.
    pub fn slice(&self, position: usize, length: Option<usize>) -> ByteBlock {
        let start = position.min(self.len);
        let length = length.unwrap_or(self.len).min(self.len - start);
        if start == 0 && length == self.len {
            return self.clone();
        }
        ByteBlock {
            data: Arc::clone(&self.data),
            start: self.start + start,
            len: length,
        }
    }

    /// Returns a deep, independent copy of the block.
    pub fn copy(&self) -> ByteBlock {
        ByteBlock::from(self.as_slice())
    }

    /// Byte-wise comparison of ``other`` against this block, starting at ``offset``.
    ///
    /// Returns false if ``other`` is empty or if this block runs out before ``other`` does.
    pub fn compare(&self, other: &[u8], offset: usize) -> bool {
        if other.is_empty() {
            return false;
        }
        let local = self.slice(offset, Some(other.len()));
        local.len() == other.len() && local.as_slice() == other
    }
}

impl Deref for ByteBlock {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl AsRef<[u8]> for ByteBlock {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for ByteBlock {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for ByteBlock {}

impl From<Vec<u8>> for ByteBlock {
    fn from(data: Vec<u8>) -> Self {
        let len = data.len();
        ByteBlock {
            data: Arc::from(data),
            start: 0,
            len,
        }
    }
}

impl From<Box<[u8]>> for ByteBlock {
    fn from(data: Box<[u8]>) -> Self {
        let len = data.len();
        ByteBlock {
            data: Arc::from(data),
            start: 0,
            len,
        }
    }
}

impl From<&[u8]> for ByteBlock {
    fn from(data: &[u8]) -> Self {
        ByteBlock::from(data.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for ByteBlock {
    fn from(data: [u8; N]) -> Self {
        ByteBlock::from(data.to_vec())
    }
}

impl From<&str> for ByteBlock {
    fn from(data: &str) -> Self {
        ByteBlock::from(data.as_bytes())
    }
}

impl Debug for ByteBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let preview = &self.as_slice()[..self.len.min(16)];
        f.debug_struct("ByteBlock")
            .field("len", &self.len)
            .field("head", &preview)
            .finish()
    }
}

impl Display for ByteBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ByteBlock({} bytes)", self.len)
    }
}
