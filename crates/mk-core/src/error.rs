use thiserror::Error;

use crate::ops::Operation;

/// A violated kernel contract.
///
/// Every variant is detected before the first output write, so an `Err`
/// never leaves a partially written result behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("{op}: buffer `{name}` is null")]
    NullBuffer { op: Operation, name: &'static str },
    #[error("{op}: matrix `{name}` has a zero dimension ({width}x{height})")]
    ZeroDimension {
        op: Operation,
        name: &'static str,
        width: usize,
        height: usize,
    },
    #[error("{op}: buffer `{name}` holds {len} elements but {required} are required")]
    BufferTooSmall {
        op: Operation,
        name: &'static str,
        len: usize,
        required: usize,
    },
    #[error("{op}: {width}x{height} does not fit in usize")]
    SizeOverflow {
        op: Operation,
        width: usize,
        height: usize,
    },
    #[error("multiply dimension mismatch: a.width={a_width} but b.height={b_height}")]
    MultiplyMismatch { a_width: usize, b_height: usize },
    #[error("multiply_transposed dimension mismatch: a.width={a_width} but b.width={b_width}")]
    TransposedMismatch { a_width: usize, b_width: usize },
    #[error("{op}: `{name}` is {offset} bytes past a {alignment}-byte boundary on the {backend} path")]
    Misaligned {
        op: Operation,
        name: &'static str,
        backend: &'static str,
        offset: usize,
        alignment: usize,
    },
    #[error("unknown backend: {0}")]
    UnknownBackend(String),
}

pub type Result<T> = std::result::Result<T, KernelError>;
