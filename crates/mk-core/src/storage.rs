use std::fmt;
use std::ops::{Deref, DerefMut};

/// Alignment, in bytes, that the aligned vector paths expect.
pub const CACHE_LINE: usize = 64;

const LINE_FLOATS: usize = CACHE_LINE / std::mem::size_of::<f32>();

/// One cache line worth of floats.
#[derive(Clone, Copy)]
#[repr(C, align(64))]
pub(crate) struct CacheLine(pub(crate) [f32; LINE_FLOATS]);

impl CacheLine {
    pub(crate) const ZERO: CacheLine = CacheLine([0.0; LINE_FLOATS]);
}

/// Byte offset of `ptr` past the nearest lower [`CACHE_LINE`] boundary.
///
/// Returns 0 for an aligned pointer.
#[inline]
pub fn align_offset<T>(ptr: *const T) -> usize {
    ptr as usize % CACHE_LINE
}

/// Owned, zero-initialised `f32` storage whose first element sits on a
/// [`CACHE_LINE`] boundary.
///
/// Callers use it to satisfy the alignment contracts of the fast vector
/// paths; the multiply kernels use it for large scratch columns.
#[derive(Clone)]
pub struct AlignedBuffer {
    lines: Vec<CacheLine>,
    len: usize,
}

impl AlignedBuffer {
    /// Create a zero-filled buffer of `len` elements.
    pub fn zeros(len: usize) -> Self {
        let n_lines = len.div_ceil(LINE_FLOATS);
        AlignedBuffer {
            lines: vec![CacheLine::ZERO; n_lines],
            len,
        }
    }

    /// Create a buffer holding a copy of `data`.
    pub fn from_slice(data: &[f32]) -> Self {
        let mut buf = Self::zeros(data.len());
        buf.copy_from_slice(data);
        buf
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[f32] {
        // SAFETY: `lines` owns at least `len` contiguous, initialised f32s and
        // `CacheLine` is `repr(C)` over an f32 array. For an empty Vec the
        // dangling pointer is still non-null and aligned.
        unsafe { std::slice::from_raw_parts(self.lines.as_ptr().cast::<f32>(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        // SAFETY: see `as_slice`; `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.lines.as_mut_ptr().cast::<f32>(), self.len) }
    }

    /// Copy the contents into a plain `Vec`.
    pub fn to_vec(&self) -> Vec<f32> {
        self.as_slice().to_vec()
    }
}

impl Deref for AlignedBuffer {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        self.as_slice()
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut [f32] {
        self.as_mut_slice()
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl PartialEq for AlignedBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let b = AlignedBuffer::zeros(5);
        assert_eq!(b.len(), 5);
        assert!(!b.is_empty());
        assert_eq!(b.as_slice(), &[0.0; 5]);
    }

    #[test]
    fn test_from_slice() {
        let b = AlignedBuffer::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(b.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_alignment() {
        for len in [0, 1, 15, 16, 17, 1000] {
            let b = AlignedBuffer::zeros(len);
            assert_eq!(align_offset(b.as_ptr()), 0, "len={}", len);
        }
    }

    #[test]
    fn test_align_offset_of_subslice() {
        let b = AlignedBuffer::zeros(32);
        assert_eq!(align_offset(b[1..].as_ptr()), 4);
        assert_eq!(align_offset(b[16..].as_ptr()), 0);
    }

    #[test]
    fn test_mut_slice() {
        let mut b = AlignedBuffer::zeros(2);
        b[0] = 42.0;
        assert_eq!(b.as_slice(), &[42.0, 0.0]);
    }
}
