//! Vector kernel families.
//!
//! Every family supplies a [`Lanes`] implementation: the register type, the
//! lane width and a handful of primitives (load, store, add, sub,
//! multiply-accumulate, horizontal sum). The kernel bodies in this module are
//! written once against that trait and are `#[inline(always)]`, so each
//! family's `#[target_feature]` entry points (generated by
//! `vector_backend!`) get a fully specialized copy.
//!
//! | Family | Arch           | Lanes | Multiply-accumulate | Alignment contract          |
//! |--------|----------------|-------|---------------------|-----------------------------|
//! | SSE    | x86 / x86_64   | 4     | mul + add           | none                        |
//! | AVX    | x86 / x86_64   | 8     | FMA                 | `a` (multiply), `a` and `b` (multiply_transposed) |
//! | NEON   | aarch64        | 4     | FMA                 | none                        |

pub(crate) mod scratch;

use crate::backend::AlignmentContract;
use crate::ops::Operation;

use scratch::ScratchColumn;

/// Primitive vector operations of one instruction-set family.
///
/// # Safety
/// All methods may only be called when the CPU supports the family.
/// Pointers passed to `load`/`store` must be valid for `WIDTH` elements;
/// `load_aligned` additionally requires a `WIDTH * 4`-byte aligned pointer.
pub(crate) trait Lanes {
    type Reg: Copy;

    const WIDTH: usize;

    unsafe fn zero() -> Self::Reg;
    unsafe fn load(ptr: *const f32) -> Self::Reg;
    unsafe fn load_aligned(ptr: *const f32) -> Self::Reg;
    unsafe fn store(ptr: *mut f32, v: Self::Reg);
    unsafe fn add(a: Self::Reg, b: Self::Reg) -> Self::Reg;
    unsafe fn sub(a: Self::Reg, b: Self::Reg) -> Self::Reg;
    /// acc + a * b
    unsafe fn mul_add(acc: Self::Reg, a: Self::Reg, b: Self::Reg) -> Self::Reg;
    unsafe fn reduce_sum(v: Self::Reg) -> f32;
}

pub(crate) fn no_alignment_contract(_op: Operation) -> AlignmentContract {
    AlignmentContract::NONE
}

/// out[i] = a[i] ± b[i] for the first `len` elements.
///
/// # Safety
/// The CPU must support `L`.
#[inline(always)]
pub(crate) unsafe fn elementwise<L: Lanes, const SUB: bool>(
    a: &[f32],
    b: &[f32],
    len: usize,
    out: &mut [f32],
) {
    let a = &a[..len];
    let b = &b[..len];
    let out = &mut out[..len];

    let body = len - len % L::WIDTH;
    let (pa, pb, po) = (a.as_ptr(), b.as_ptr(), out.as_mut_ptr());
    let mut i = 0;
    while i < body {
        let va = L::load(pa.add(i));
        let vb = L::load(pb.add(i));
        let vr = if SUB { L::sub(va, vb) } else { L::add(va, vb) };
        L::store(po.add(i), vr);
        i += L::WIDTH;
    }

    for k in body..len {
        out[k] = if SUB { a[k] - b[k] } else { a[k] + b[k] };
    }
}

/// Dot product of `a` with the first `a.len()` elements of `b`.
///
/// With `B_ALIGNED`, `b` must start on a `L::WIDTH * 4`-byte boundary.
///
/// # Safety
/// The CPU must support `L`.
#[inline(always)]
unsafe fn dot<L: Lanes, const B_ALIGNED: bool>(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len();
    let b = &b[..n];
    let body = n - n % L::WIDTH;
    let (pa, pb) = (a.as_ptr(), b.as_ptr());

    let mut acc = L::zero();
    let mut k = 0;
    while k < body {
        let va = L::load(pa.add(k));
        let vb = if B_ALIGNED {
            L::load_aligned(pb.add(k))
        } else {
            L::load(pb.add(k))
        };
        acc = L::mul_add(acc, va, vb);
        k += L::WIDTH;
    }

    let mut sum = L::reduce_sum(acc);
    for k in body..n {
        sum += a[k] * b[k];
    }
    sum
}

/// out = A @ B, gathering each column of B into an aligned scratch column
/// so the inner loop runs on contiguous vector loads.
///
/// # Safety
/// The CPU must support `L`.
#[inline(always)]
pub(crate) unsafe fn multiply<L: Lanes>(
    a: &[f32],
    b: &[f32],
    a_width: usize,
    a_height: usize,
    b_width: usize,
    out: &mut [f32],
) {
    let a = &a[..a_width * a_height];
    let b = &b[..a_width * b_width];
    let out = &mut out[..a_height * b_width];

    let mut scratch = ScratchColumn::new(a_width);
    let col = scratch.as_mut_slice();

    for i in 0..b_width {
        for (k, c) in col.iter_mut().enumerate() {
            *c = b[k * b_width + i];
        }
        for j in 0..a_height {
            let row = &a[j * a_width..(j + 1) * a_width];
            out[j * b_width + i] = dot::<L, true>(row, col);
        }
    }
}

/// out = A @ Bᵀ where both operands are read row by row.
///
/// # Safety
/// The CPU must support `L`.
#[inline(always)]
pub(crate) unsafe fn multiply_transposed<L: Lanes>(
    a: &[f32],
    b: &[f32],
    width: usize,
    a_height: usize,
    b_height: usize,
    out: &mut [f32],
) {
    let a = &a[..width * a_height];
    let b = &b[..width * b_height];
    let out = &mut out[..a_height * b_height];

    for j in 0..a_height {
        let row_a = &a[j * width..(j + 1) * width];
        for i in 0..b_height {
            let row_b = &b[i * width..(i + 1) * width];
            out[j * b_height + i] = dot::<L, false>(row_a, row_b);
        }
    }
}

/// Generate a backend struct for one instruction-set family.
///
/// The struct carries a private field so it can only be built by the
/// family's `detect` constructor, which checks CPU support first. That check
/// is what makes the `unsafe` calls into the `#[target_feature]` entry
/// points sound.
macro_rules! vector_backend {
    (
        $(#[$meta:meta])*
        $backend:ident {
            lanes: $lanes:ty,
            name: $name:literal,
            feature: $feature:literal,
            contract: $contract:path $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $backend {
            _detected: (),
        }

        impl $backend {
            #[target_feature(enable = $feature)]
            unsafe fn add_impl(a: &[f32], b: &[f32], len: usize, out: &mut [f32]) {
                $crate::simd::elementwise::<$lanes, false>(a, b, len, out)
            }

            #[target_feature(enable = $feature)]
            unsafe fn subtract_impl(a: &[f32], b: &[f32], len: usize, out: &mut [f32]) {
                $crate::simd::elementwise::<$lanes, true>(a, b, len, out)
            }

            #[target_feature(enable = $feature)]
            unsafe fn multiply_impl(
                a: &[f32],
                b: &[f32],
                a_width: usize,
                a_height: usize,
                b_width: usize,
                out: &mut [f32],
            ) {
                $crate::simd::multiply::<$lanes>(a, b, a_width, a_height, b_width, out)
            }

            #[target_feature(enable = $feature)]
            unsafe fn multiply_transposed_impl(
                a: &[f32],
                b: &[f32],
                width: usize,
                a_height: usize,
                b_height: usize,
                out: &mut [f32],
            ) {
                $crate::simd::multiply_transposed::<$lanes>(a, b, width, a_height, b_height, out)
            }
        }

        // SAFETY (all unsafe blocks below): `$backend` values only exist
        // after `detect` confirmed the CPU supports `$feature`.
        impl $crate::backend::MatrixBackend for $backend {
            fn name(&self) -> &'static str {
                $name
            }

            fn lanes(&self) -> usize {
                <$lanes as $crate::simd::Lanes>::WIDTH
            }

            fn alignment_contract(
                &self,
                op: $crate::ops::Operation,
            ) -> $crate::backend::AlignmentContract {
                $contract(op)
            }

            fn add(&self, a: &[f32], b: &[f32], width: usize, height: usize, out: &mut [f32]) {
                unsafe { Self::add_impl(a, b, width * height, out) }
            }

            fn subtract(&self, a: &[f32], b: &[f32], width: usize, height: usize, out: &mut [f32]) {
                unsafe { Self::subtract_impl(a, b, width * height, out) }
            }

            fn multiply(
                &self,
                a: &[f32],
                b: &[f32],
                a_width: usize,
                a_height: usize,
                b_width: usize,
                out: &mut [f32],
            ) {
                unsafe { Self::multiply_impl(a, b, a_width, a_height, b_width, out) }
            }

            fn multiply_transposed(
                &self,
                a: &[f32],
                b: &[f32],
                width: usize,
                a_height: usize,
                b_height: usize,
                out: &mut [f32],
            ) {
                unsafe { Self::multiply_transposed_impl(a, b, width, a_height, b_height, out) }
            }
        }
    };
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod avx;
#[cfg(target_arch = "aarch64")]
pub mod neon;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod sse;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use avx::AvxBackend;
#[cfg(target_arch = "aarch64")]
pub use neon::NeonBackend;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use sse::SseBackend;

/// Every vector backend the current CPU supports, widest first.
pub fn detected_backends() -> Vec<Box<dyn crate::backend::MatrixBackend>> {
    #[allow(unused_mut)]
    let mut backends: Vec<Box<dyn crate::backend::MatrixBackend>> = Vec::new();

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if let Some(b) = AvxBackend::detect() {
            backends.push(Box::new(b));
        }
        if let Some(b) = SseBackend::detect() {
            backends.push(Box::new(b));
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if let Some(b) = NeonBackend::detect() {
            backends.push(Box::new(b));
        }
    }

    backends
}

#[cfg(test)]
pub(crate) mod test_util {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::storage::AlignedBuffer;

    pub fn random_matrix(rng: &mut StdRng, len: usize) -> AlignedBuffer {
        let data: Vec<f32> = (0..len).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
        AlignedBuffer::from_slice(&data)
    }

    pub fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    /// Accumulation-order tolerance for dot products of length `k` over
    /// values in [-1, 1].
    pub fn tolerance(k: usize) -> f32 {
        1e-5 * (k as f32).max(1.0)
    }
}
