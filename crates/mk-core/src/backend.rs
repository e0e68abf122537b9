use std::fmt::Debug;

use crate::ops::Operation;

/// Which operands of an operation must start on a
/// [`CACHE_LINE`](crate::storage::CACHE_LINE) boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlignmentContract {
    pub a: bool,
    pub b: bool,
}

impl AlignmentContract {
    /// No operand needs to be aligned.
    pub const NONE: AlignmentContract = AlignmentContract { a: false, b: false };
}

/// Trait for pluggable matrix kernel backends (scalar, SSE, AVX, NEON).
///
/// All matrices are contiguous row-major f32 slices. Implementations assume
/// the dispatch layer has validated dimensions, and they only touch the
/// leading `width * height` elements of every slice; a slice that is too
/// short makes them panic rather than read out of bounds.
pub trait MatrixBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "scalar", "avx").
    fn name(&self) -> &'static str;

    /// Number of f32 elements processed per vector instruction.
    fn lanes(&self) -> usize;

    /// Alignment this backend requires for `op`.
    fn alignment_contract(&self, _op: Operation) -> AlignmentContract {
        AlignmentContract::NONE
    }

    /// Element-wise addition: out[i] = a[i] + b[i] for `width * height` elements.
    fn add(&self, a: &[f32], b: &[f32], width: usize, height: usize, out: &mut [f32]);

    /// Element-wise subtraction: out[i] = a[i] - b[i] for `width * height` elements.
    fn subtract(&self, a: &[f32], b: &[f32], width: usize, height: usize, out: &mut [f32]);

    /// Matrix multiplication: out = A @ B.
    ///
    /// - `a`: `a_height` rows of `a_width` elements
    /// - `b`: `a_width` rows of `b_width` elements
    /// - `out`: `a_height` rows of `b_width` elements
    fn multiply(
        &self,
        a: &[f32],
        b: &[f32],
        a_width: usize,
        a_height: usize,
        b_width: usize,
        out: &mut [f32],
    );

    /// Matrix multiplication against a pre-transposed right operand: out = A @ Bᵀ.
    ///
    /// - `a`: `a_height` rows of `width` elements
    /// - `b`: `b_height` rows of `width` elements
    /// - `out`: `a_height` rows of `b_height` elements
    fn multiply_transposed(
        &self,
        a: &[f32],
        b: &[f32],
        width: usize,
        a_height: usize,
        b_height: usize,
        out: &mut [f32],
    );
}
