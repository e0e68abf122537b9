//! 256-bit AVX family (8 lanes), using FMA for the dot products.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::sse::hsum_128;
use super::Lanes;
use crate::backend::AlignmentContract;
use crate::ops::Operation;

#[derive(Debug, Clone, Copy)]
pub(crate) struct AvxLanes;

impl Lanes for AvxLanes {
    type Reg = __m256;

    const WIDTH: usize = 8;

    #[inline(always)]
    unsafe fn zero() -> __m256 {
        _mm256_setzero_ps()
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> __m256 {
        _mm256_loadu_ps(ptr)
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> __m256 {
        _mm256_load_ps(ptr)
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut f32, v: __m256) {
        _mm256_storeu_ps(ptr, v)
    }

    #[inline(always)]
    unsafe fn add(a: __m256, b: __m256) -> __m256 {
        _mm256_add_ps(a, b)
    }

    #[inline(always)]
    unsafe fn sub(a: __m256, b: __m256) -> __m256 {
        _mm256_sub_ps(a, b)
    }

    #[inline(always)]
    unsafe fn mul_add(acc: __m256, a: __m256, b: __m256) -> __m256 {
        _mm256_fmadd_ps(a, b, acc)
    }

    #[inline(always)]
    unsafe fn reduce_sum(v: __m256) -> f32 {
        let halves = _mm_add_ps(_mm256_castps256_ps128(v), _mm256_extractf128_ps(v, 1));
        hsum_128(halves)
    }
}

/// The multiply path expects `a` on a cache-line boundary; the
/// pre-transposed path expects both operands there.
fn avx_alignment_contract(op: Operation) -> AlignmentContract {
    match op {
        Operation::Multiply => AlignmentContract { a: true, b: false },
        Operation::MultiplyTransposed => AlignmentContract { a: true, b: true },
        Operation::Add | Operation::Subtract => AlignmentContract::NONE,
    }
}

vector_backend! {
    /// AVX + FMA backend (256-bit, x86 / x86_64).
    AvxBackend {
        lanes: AvxLanes,
        name: "avx",
        feature: "avx,fma",
        contract: avx_alignment_contract,
    }
}

impl AvxBackend {
    /// Returns the backend if the CPU supports both AVX and FMA.
    pub fn detect() -> Option<Self> {
        if is_x86_feature_detected!("avx") && is_x86_feature_detected!("fma") {
            Some(AvxBackend { _detected: () })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MatrixBackend;
    use crate::storage::AlignedBuffer;

    #[test]
    fn test_avx_add() {
        let Some(avx) = AvxBackend::detect() else {
            println!("Skipping AVX test: AVX/FMA not supported");
            return;
        };
        let a = vec![1.0; 8];
        let b = vec![2.0; 8];
        let mut out = vec![0.0; 8];
        avx.add(&a, &b, 8, 1, &mut out);
        assert_eq!(out, vec![3.0; 8]);
    }

    #[test]
    fn test_avx_multiply_ones() {
        let Some(avx) = AvxBackend::detect() else {
            return;
        };
        // 7 rows of 17, times 17 rows of 5: every output is 17.
        let a = AlignedBuffer::from_slice(&[1.0; 7 * 17]);
        let b = vec![1.0; 17 * 5];
        let mut c = vec![0.0; 7 * 5];
        avx.multiply(&a, &b, 17, 7, 5, &mut c);
        assert!(c.iter().all(|&x| (x - 17.0).abs() < 1e-5), "got {:?}", c);
    }

    #[test]
    fn test_avx_multiply_transposed_ones() {
        let Some(avx) = AvxBackend::detect() else {
            return;
        };
        let a = AlignedBuffer::from_slice(&[1.0; 3 * 16]);
        let b = AlignedBuffer::from_slice(&[2.0; 4 * 16]);
        let mut c = vec![0.0; 3 * 4];
        avx.multiply_transposed(&a, &b, 16, 3, 4, &mut c);
        assert!(c.iter().all(|&x| (x - 32.0).abs() < 1e-5), "got {:?}", c);
    }

    #[test]
    fn test_avx_alignment_contract() {
        let Some(avx) = AvxBackend::detect() else {
            return;
        };
        assert_eq!(
            avx.alignment_contract(Operation::Multiply),
            AlignmentContract { a: true, b: false }
        );
        assert_eq!(
            avx.alignment_contract(Operation::MultiplyTransposed),
            AlignmentContract { a: true, b: true }
        );
        assert_eq!(avx.alignment_contract(Operation::Add), AlignmentContract::NONE);
    }

    #[test]
    fn test_avx_reduce_sum() {
        if AvxBackend::detect().is_none() {
            return;
        }
        let v = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let s = unsafe { reduce_on_avx(&v) };
        assert_eq!(s, 36.0);
    }

    #[target_feature(enable = "avx,fma")]
    unsafe fn reduce_on_avx(v: &[f32; 8]) -> f32 {
        AvxLanes::reduce_sum(AvxLanes::load(v.as_ptr()))
    }
}
