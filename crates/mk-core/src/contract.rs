//! Precondition checks shared by every facade entry point.

use crate::backend::{AlignmentContract, MatrixBackend};
use crate::error::{KernelError, Result};
use crate::ops::Operation;
use crate::storage::{align_offset, CACHE_LINE};

/// Validate a matrix's dimensions and return its element count.
pub(crate) fn matrix_len(
    op: Operation,
    name: &'static str,
    width: usize,
    height: usize,
) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(KernelError::ZeroDimension {
            op,
            name,
            width,
            height,
        });
    }
    element_count(op, width, height)
}

/// `width * height`, rejecting overflow.
pub(crate) fn element_count(op: Operation, width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .ok_or(KernelError::SizeOverflow { op, width, height })
}

pub(crate) fn check_len(
    op: Operation,
    name: &'static str,
    len: usize,
    required: usize,
) -> Result<()> {
    if len < required {
        return Err(KernelError::BufferTooSmall {
            op,
            name,
            len,
            required,
        });
    }
    Ok(())
}

/// Check `a` and `b` against the alignment `backend` requires for `op`.
pub(crate) fn check_alignment(
    op: Operation,
    backend: &dyn MatrixBackend,
    a: *const f32,
    b: *const f32,
) -> Result<()> {
    check_contract(op, backend.name(), backend.alignment_contract(op), a, b)
}

pub(crate) fn check_contract(
    op: Operation,
    backend: &'static str,
    contract: AlignmentContract,
    a: *const f32,
    b: *const f32,
) -> Result<()> {
    for (required, name, ptr) in [(contract.a, "a", a), (contract.b, "b", b)] {
        let offset = align_offset(ptr);
        if required && offset != 0 {
            return Err(KernelError::Misaligned {
                op,
                name,
                backend,
                offset,
                alignment: CACHE_LINE,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::AlignedBuffer;

    #[test]
    fn test_matrix_len() {
        assert_eq!(matrix_len(Operation::Add, "a", 3, 4).unwrap(), 12);
    }

    #[test]
    fn test_zero_dimension() {
        let err = matrix_len(Operation::Add, "b", 0, 4).unwrap_err();
        assert!(matches!(err, KernelError::ZeroDimension { name: "b", .. }));
        assert!(matrix_len(Operation::Add, "b", 4, 0).is_err());
    }

    #[test]
    fn test_overflow() {
        let err = matrix_len(Operation::Multiply, "a", usize::MAX, 2).unwrap_err();
        assert!(matches!(err, KernelError::SizeOverflow { .. }));
    }

    #[test]
    fn test_check_len() {
        assert!(check_len(Operation::Add, "out", 4, 4).is_ok());
        assert!(check_len(Operation::Add, "out", 5, 4).is_ok());
        let err = check_len(Operation::Add, "out", 3, 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "add: buffer `out` holds 3 elements but 4 are required"
        );
    }

    #[test]
    fn test_contract_only_checks_required_operands() {
        let buf = AlignedBuffer::zeros(32);
        let aligned = buf.as_ptr();
        let skewed = buf[1..].as_ptr();
        let only_a = AlignmentContract { a: true, b: false };

        assert!(check_contract(Operation::Multiply, "avx", only_a, aligned, skewed).is_ok());
        let err = check_contract(Operation::Multiply, "avx", only_a, skewed, aligned).unwrap_err();
        assert_eq!(
            err,
            KernelError::Misaligned {
                op: Operation::Multiply,
                name: "a",
                backend: "avx",
                offset: 4,
                alignment: CACHE_LINE,
            }
        );
    }

    #[test]
    fn test_contract_both_operands() {
        let buf = AlignedBuffer::zeros(32);
        let both = AlignmentContract { a: true, b: true };
        let err = check_contract(
            Operation::MultiplyTransposed,
            "avx",
            both,
            buf.as_ptr(),
            buf[2..].as_ptr(),
        )
        .unwrap_err();
        assert!(matches!(err, KernelError::Misaligned { name: "b", offset: 8, .. }));
    }

    #[test]
    fn test_no_contract_accepts_anything() {
        let buf = AlignedBuffer::zeros(8);
        let p = buf[3..].as_ptr();
        assert!(check_contract(Operation::MultiplyTransposed, "sse", AlignmentContract::NONE, p, p).is_ok());
    }
}
