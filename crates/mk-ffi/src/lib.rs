//! C ABI for the `mk-core` matrix kernels.
//!
//! Every function takes raw row-major f32 buffers plus dimensions, checks
//! them, and reports problems through [`MkStatus`] and `mk_last_error`
//! instead of unwinding into the caller.

mod error;
mod types;

pub use error::*;
pub use types::*;

use std::ffi::CString;
use std::os::raw::c_char;
use std::slice;

use mk_core::{Capability, KernelError, Operation};

/// Execute a closure that returns an `MkStatus`, catching any panics
/// and converting them into `MkStatus::ErrorInternal`.
fn catch_panic<F: FnOnce() -> MkStatus + std::panic::UnwindSafe>(f: F) -> MkStatus {
    match std::panic::catch_unwind(f) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            MkStatus::ErrorInternal
        }
    }
}

fn check_non_null(op: Operation, buffers: [(&'static str, bool); 3]) -> Result<(), MkStatus> {
    match buffers.iter().find(|(_, is_null)| *is_null) {
        Some(&(name, _)) => Err(fail(
            MkStatus::ErrorInvalidArgument,
            KernelError::NullBuffer { op, name },
        )),
        None => Ok(()),
    }
}

/// Element count of a `width` x `height` buffer. Zero dimensions are left
/// for `mk_core` to reject.
fn buffer_len(op: Operation, width: usize, height: usize) -> Result<usize, MkStatus> {
    width.checked_mul(height).ok_or_else(|| {
        fail(
            MkStatus::ErrorContract,
            KernelError::SizeOverflow { op, width, height },
        )
    })
}

fn status(result: mk_core::Result<()>) -> MkStatus {
    match result {
        Ok(()) => MkStatus::Ok,
        Err(e) => fail(MkStatus::ErrorContract, e),
    }
}

/// # Safety
/// Non-null pointers must be valid for the given lengths, and `out` must not
/// overlap `a` or `b`.
unsafe fn buffers<'a>(
    a: *const f32,
    a_len: usize,
    b: *const f32,
    b_len: usize,
    out: *mut f32,
    out_len: usize,
) -> (&'a [f32], &'a [f32], &'a mut [f32]) {
    (
        slice::from_raw_parts(a, a_len),
        slice::from_raw_parts(b, b_len),
        slice::from_raw_parts_mut(out, out_len),
    )
}

unsafe fn elementwise(
    op: Operation,
    simd: bool,
    m1: *const f32,
    m2: *const f32,
    width: usize,
    height: usize,
    res: *mut f32,
) -> MkStatus {
    let nulls = [("m1", m1.is_null()), ("m2", m2.is_null()), ("res", res.is_null())];
    if let Err(s) = check_non_null(op, nulls) {
        return s;
    }
    let len = match buffer_len(op, width, height) {
        Ok(len) => len,
        Err(s) => return s,
    };
    let (a, b, out) = buffers(m1, len, m2, len, res, len);
    match op {
        Operation::Subtract => status(mk_core::try_subtract(simd, a, b, width, height, out)),
        _ => status(mk_core::try_add(simd, a, b, width, height, out)),
    }
}

/// Element-wise sum of two `width` x `height` matrices into `res`.
///
/// # Safety
/// `m1`, `m2` and `res` must each point to `width * height` floats, and
/// `res` must not overlap either input.
#[no_mangle]
pub unsafe extern "C" fn mk_matrix_add(
    simd: bool,
    m1: *const f32,
    m2: *const f32,
    width: usize,
    height: usize,
    res: *mut f32,
) -> MkStatus {
    catch_panic(|| unsafe { elementwise(Operation::Add, simd, m1, m2, width, height, res) })
}

/// Element-wise difference `m1 - m2` of two `width` x `height` matrices.
///
/// # Safety
/// Same as [`mk_matrix_add`].
#[no_mangle]
pub unsafe extern "C" fn mk_matrix_sub(
    simd: bool,
    m1: *const f32,
    m2: *const f32,
    width: usize,
    height: usize,
    res: *mut f32,
) -> MkStatus {
    catch_panic(|| unsafe { elementwise(Operation::Subtract, simd, m1, m2, width, height, res) })
}

/// Matrix product `m1 @ m2`; requires `w1 == h2` and writes `h1` rows of
/// `w2` floats into `res`.
///
/// # Safety
/// `m1` must hold `w1 * h1` floats, `m2` `w2 * h2`, `res` `w2 * h1`, and
/// `res` must not overlap either input.
#[no_mangle]
pub unsafe extern "C" fn mk_matrix_multiply(
    simd: bool,
    m1: *const f32,
    m2: *const f32,
    w1: usize,
    h1: usize,
    w2: usize,
    h2: usize,
    res: *mut f32,
) -> MkStatus {
    catch_panic(|| {
        let op = Operation::Multiply;
        let nulls = [("m1", m1.is_null()), ("m2", m2.is_null()), ("res", res.is_null())];
        if let Err(s) = check_non_null(op, nulls) {
            return s;
        }
        let lens = buffer_len(op, w1, h1)
            .and_then(|a| Ok((a, buffer_len(op, w2, h2)?, buffer_len(op, w2, h1)?)));
        let (a_len, b_len, out_len) = match lens {
            Ok(lens) => lens,
            Err(s) => return s,
        };
        let (a, b, out) = unsafe { buffers(m1, a_len, m2, b_len, res, out_len) };
        status(mk_core::try_multiply(simd, a, b, w1, h1, w2, h2, out))
    })
}

/// Matrix product `m1 @ m2ᵀ` with `m2` stored pre-transposed; requires
/// `w1 == w2` and writes `h1` rows of `h2` floats into `res`.
///
/// # Safety
/// `m1` must hold `w1 * h1` floats, `m2` `w2 * h2`, `res` `h2 * h1`, and
/// `res` must not overlap either input.
#[no_mangle]
pub unsafe extern "C" fn mk_matrix_multiply_transposed(
    simd: bool,
    m1: *const f32,
    m2: *const f32,
    w1: usize,
    h1: usize,
    w2: usize,
    h2: usize,
    res: *mut f32,
) -> MkStatus {
    catch_panic(|| {
        let op = Operation::MultiplyTransposed;
        let nulls = [("m1", m1.is_null()), ("m2", m2.is_null()), ("res", res.is_null())];
        if let Err(s) = check_non_null(op, nulls) {
            return s;
        }
        let lens = buffer_len(op, w1, h1)
            .and_then(|a| Ok((a, buffer_len(op, w2, h2)?, buffer_len(op, h2, h1)?)));
        let (a_len, b_len, out_len) = match lens {
            Ok(lens) => lens,
            Err(s) => return s,
        };
        let (a, b, out) = unsafe { buffers(m1, a_len, m2, b_len, res, out_len) };
        status(mk_core::try_multiply_transposed(simd, a, b, w1, h1, w2, h2, out))
    })
}

/// Name of the backend the vectorized path runs on ("scalar" if none).
///
/// The returned string is static and must not be freed.
#[no_mangle]
pub extern "C" fn mk_backend_name() -> *const c_char {
    match mk_core::capability() {
        Capability::Scalar => c"scalar".as_ptr(),
        Capability::Sse => c"sse".as_ptr(),
        Capability::Avx => c"avx".as_ptr(),
        Capability::Neon => c"neon".as_ptr(),
    }
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error, or
/// null if no error has occurred. The caller must free the returned string
/// with `mk_free_string`.
#[no_mangle]
pub extern "C" fn mk_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `mk_last_error`.
///
/// # Safety
/// `s` must come from `mk_last_error` and not have been freed already.
#[no_mangle]
pub unsafe extern "C" fn mk_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
