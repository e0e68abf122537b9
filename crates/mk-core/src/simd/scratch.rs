use crate::storage::{AlignedBuffer, CacheLine, CACHE_LINE};

const STACK_LINES: usize = 64;

/// Largest column, in elements, kept on the stack.
pub(crate) const STACK_CAPACITY: usize = STACK_LINES * CACHE_LINE / std::mem::size_of::<f32>();

/// Cache-line aligned temporary for one gathered column of the right-hand
/// operand. Lives for a single multiply call.
pub(crate) enum ScratchColumn {
    Stack {
        lines: [CacheLine; STACK_LINES],
        len: usize,
    },
    Heap(AlignedBuffer),
}

impl ScratchColumn {
    pub(crate) fn new(len: usize) -> Self {
        if len <= STACK_CAPACITY {
            ScratchColumn::Stack {
                lines: [CacheLine::ZERO; STACK_LINES],
                len,
            }
        } else {
            ScratchColumn::Heap(AlignedBuffer::zeros(len))
        }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        match self {
            ScratchColumn::Stack { lines, len } => {
                // SAFETY: `lines` is `STACK_CAPACITY` contiguous f32s and
                // `len <= STACK_CAPACITY`.
                unsafe { std::slice::from_raw_parts_mut(lines.as_mut_ptr().cast::<f32>(), *len) }
            }
            ScratchColumn::Heap(buf) => buf.as_mut_slice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::align_offset;

    #[test]
    fn test_small_column_on_stack() {
        let mut s = ScratchColumn::new(17);
        assert!(matches!(s, ScratchColumn::Stack { .. }));
        let col = s.as_mut_slice();
        assert_eq!(col.len(), 17);
        assert_eq!(align_offset(col.as_ptr()), 0);
    }

    #[test]
    fn test_capacity_boundary() {
        assert!(matches!(ScratchColumn::new(STACK_CAPACITY), ScratchColumn::Stack { .. }));
        let mut s = ScratchColumn::new(STACK_CAPACITY + 1);
        assert!(matches!(s, ScratchColumn::Heap(_)));
        let col = s.as_mut_slice();
        assert_eq!(col.len(), STACK_CAPACITY + 1);
        assert_eq!(align_offset(col.as_ptr()), 0);
    }
}
