//! Public matrix operations.
//!
//! Every operation validates its arguments before touching the output,
//! then runs on the selected vector backend when `use_vector` is set and one
//! exists, otherwise on the scalar backend.
//!
//! The plain functions treat a contract violation as fatal and panic. The
//! `try_` variants run the same checks and return the violation instead.

use std::fmt;

use log::error;

use crate::contract::{check_alignment, check_len, element_count, matrix_len};
use crate::dispatch::backend_for;
use crate::error::{KernelError, Result};

/// The four kernel operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    MultiplyTransposed,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::MultiplyTransposed => "multiply_transposed",
        })
    }
}

#[track_caller]
fn contract_violation(err: KernelError) -> ! {
    error!("matrix kernel contract violation: {}", err);
    panic!("matrix kernel contract violation: {}", err)
}

fn elementwise(
    op: Operation,
    use_vector: bool,
    a: &[f32],
    b: &[f32],
    width: usize,
    height: usize,
    out: &mut [f32],
) -> Result<()> {
    let len = matrix_len(op, "a", width, height)?;
    check_len(op, "a", a.len(), len)?;
    check_len(op, "b", b.len(), len)?;
    check_len(op, "out", out.len(), len)?;

    let backend = backend_for(use_vector);
    check_alignment(op, backend, a.as_ptr(), b.as_ptr())?;
    match op {
        Operation::Subtract => backend.subtract(a, b, width, height, out),
        _ => backend.add(a, b, width, height, out),
    }
    Ok(())
}

/// Element-wise sum of two `width` x `height` matrices.
///
/// Writes the first `width * height` elements of `out`.
pub fn try_add(
    use_vector: bool,
    a: &[f32],
    b: &[f32],
    width: usize,
    height: usize,
    out: &mut [f32],
) -> Result<()> {
    elementwise(Operation::Add, use_vector, a, b, width, height, out)
}

/// Element-wise difference `a - b` of two `width` x `height` matrices.
pub fn try_subtract(
    use_vector: bool,
    a: &[f32],
    b: &[f32],
    width: usize,
    height: usize,
    out: &mut [f32],
) -> Result<()> {
    elementwise(Operation::Subtract, use_vector, a, b, width, height, out)
}

/// Matrix product `A @ B`.
///
/// Requires `a_width == b_height`. `out` receives `a_height` rows of
/// `b_width` elements.
#[allow(clippy::too_many_arguments)]
pub fn try_multiply(
    use_vector: bool,
    a: &[f32],
    b: &[f32],
    a_width: usize,
    a_height: usize,
    b_width: usize,
    b_height: usize,
    out: &mut [f32],
) -> Result<()> {
    let op = Operation::Multiply;
    let a_len = matrix_len(op, "a", a_width, a_height)?;
    let b_len = matrix_len(op, "b", b_width, b_height)?;
    if a_width != b_height {
        return Err(KernelError::MultiplyMismatch { a_width, b_height });
    }
    let out_len = element_count(op, b_width, a_height)?;
    check_len(op, "a", a.len(), a_len)?;
    check_len(op, "b", b.len(), b_len)?;
    check_len(op, "out", out.len(), out_len)?;

    let backend = backend_for(use_vector);
    check_alignment(op, backend, a.as_ptr(), b.as_ptr())?;
    backend.multiply(a, b, a_width, a_height, b_width, out);
    Ok(())
}

/// Matrix product `A @ Bᵀ`, with `b` holding the right operand already
/// transposed: each row of `b` is one column of the logical right matrix.
///
/// Requires `a_width == b_width`. `out` receives `a_height` rows of
/// `b_height` elements.
#[allow(clippy::too_many_arguments)]
pub fn try_multiply_transposed(
    use_vector: bool,
    a: &[f32],
    b: &[f32],
    a_width: usize,
    a_height: usize,
    b_width: usize,
    b_height: usize,
    out: &mut [f32],
) -> Result<()> {
    let op = Operation::MultiplyTransposed;
    let a_len = matrix_len(op, "a", a_width, a_height)?;
    let b_len = matrix_len(op, "b", b_width, b_height)?;
    if a_width != b_width {
        return Err(KernelError::TransposedMismatch { a_width, b_width });
    }
    let out_len = element_count(op, b_height, a_height)?;
    check_len(op, "a", a.len(), a_len)?;
    check_len(op, "b", b.len(), b_len)?;
    check_len(op, "out", out.len(), out_len)?;

    let backend = backend_for(use_vector);
    check_alignment(op, backend, a.as_ptr(), b.as_ptr())?;
    backend.multiply_transposed(a, b, a_width, a_height, b_height, out);
    Ok(())
}

/// [`try_add`], panicking on a contract violation.
#[track_caller]
pub fn add(use_vector: bool, a: &[f32], b: &[f32], width: usize, height: usize, out: &mut [f32]) {
    if let Err(e) = try_add(use_vector, a, b, width, height, out) {
        contract_violation(e)
    }
}

/// [`try_subtract`], panicking on a contract violation.
#[track_caller]
pub fn subtract(
    use_vector: bool,
    a: &[f32],
    b: &[f32],
    width: usize,
    height: usize,
    out: &mut [f32],
) {
    if let Err(e) = try_subtract(use_vector, a, b, width, height, out) {
        contract_violation(e)
    }
}

/// [`try_multiply`], panicking on a contract violation.
#[track_caller]
#[allow(clippy::too_many_arguments)]
pub fn multiply(
    use_vector: bool,
    a: &[f32],
    b: &[f32],
    a_width: usize,
    a_height: usize,
    b_width: usize,
    b_height: usize,
    out: &mut [f32],
) {
    if let Err(e) = try_multiply(use_vector, a, b, a_width, a_height, b_width, b_height, out) {
        contract_violation(e)
    }
}

/// [`try_multiply_transposed`], panicking on a contract violation.
#[track_caller]
#[allow(clippy::too_many_arguments)]
pub fn multiply_transposed(
    use_vector: bool,
    a: &[f32],
    b: &[f32],
    a_width: usize,
    a_height: usize,
    b_width: usize,
    b_height: usize,
    out: &mut [f32],
) {
    if let Err(e) =
        try_multiply_transposed(use_vector, a, b, a_width, a_height, b_width, b_height, out)
    {
        contract_violation(e)
    }
}
