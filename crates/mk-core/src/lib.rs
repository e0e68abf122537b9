//! `mk-core` - dense f32 matrix kernels with scalar and SIMD backends.
//!
//! This crate provides:
//! - Four operations on row-major f32 matrices: [`add`], [`subtract`],
//!   [`multiply`] and [`multiply_transposed`], each with a `try_` twin
//! - A `MatrixBackend` trait with a scalar reference implementation
//! - SSE, AVX and NEON backends sharing one generic kernel body
//! - One-time capability detection and backend selection
//! - Cache-line aligned storage for callers of the aligned vector paths
//!
//! ```
//! let a = [1.0, 2.0, 3.0, 4.0];
//! let eye = [1.0, 0.0, 0.0, 1.0];
//! let mut out = [0.0; 4];
//! mk_core::multiply(false, &a, &eye, 2, 2, 2, 2, &mut out);
//! assert_eq!(out, a);
//! ```

pub mod backend;
pub mod config;
mod contract;
pub mod dispatch;
pub mod error;
pub mod ops;
pub mod scalar;
pub mod simd;
pub mod storage;

// Re-export primary types at the crate root for convenience.
pub use backend::{AlignmentContract, MatrixBackend};
pub use config::{BackendPreference, KernelConfig};
pub use dispatch::{backend_for, capability, scalar_backend, vector_backend, Capability};
pub use error::{KernelError, Result};
pub use ops::{
    add, multiply, multiply_transposed, subtract, try_add, try_multiply, try_multiply_transposed,
    try_subtract, Operation,
};
pub use scalar::{transpose, ScalarBackend};
pub use storage::{align_offset, AlignedBuffer, CACHE_LINE};
