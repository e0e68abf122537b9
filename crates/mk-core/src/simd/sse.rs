//! 128-bit SSE family (4 lanes).
//!
//! SSE has no fused multiply-add, so the dot product accumulates with a
//! separate multiply and add.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::Lanes;

#[derive(Debug, Clone, Copy)]
pub(crate) struct SseLanes;

impl Lanes for SseLanes {
    type Reg = __m128;

    const WIDTH: usize = 4;

    #[inline(always)]
    unsafe fn zero() -> __m128 {
        _mm_setzero_ps()
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> __m128 {
        _mm_loadu_ps(ptr)
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> __m128 {
        _mm_load_ps(ptr)
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut f32, v: __m128) {
        _mm_storeu_ps(ptr, v)
    }

    #[inline(always)]
    unsafe fn add(a: __m128, b: __m128) -> __m128 {
        _mm_add_ps(a, b)
    }

    #[inline(always)]
    unsafe fn sub(a: __m128, b: __m128) -> __m128 {
        _mm_sub_ps(a, b)
    }

    #[inline(always)]
    unsafe fn mul_add(acc: __m128, a: __m128, b: __m128) -> __m128 {
        _mm_add_ps(acc, _mm_mul_ps(a, b))
    }

    #[inline(always)]
    unsafe fn reduce_sum(v: __m128) -> f32 {
        hsum_128(v)
    }
}

/// Horizontal sum of four lanes.
#[inline(always)]
pub(crate) unsafe fn hsum_128(v: __m128) -> f32 {
    let hi = _mm_movehl_ps(v, v);
    let pair = _mm_add_ps(v, hi);
    let total = _mm_add_ss(pair, _mm_shuffle_ps(pair, pair, 1));
    _mm_cvtss_f32(total)
}

vector_backend! {
    /// SSE backend (128-bit, x86 / x86_64).
    SseBackend {
        lanes: SseLanes,
        name: "sse",
        feature: "sse",
        contract: super::no_alignment_contract,
    }
}

impl SseBackend {
    /// Returns the backend if the CPU supports SSE.
    pub fn detect() -> Option<Self> {
        if is_x86_feature_detected!("sse") {
            Some(SseBackend { _detected: () })
        } else {
            None
        }
    }
}
