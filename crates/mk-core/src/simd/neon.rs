//! 128-bit NEON family (4 lanes), aarch64 only.

use std::arch::aarch64::*;

use super::Lanes;

#[derive(Debug, Clone, Copy)]
pub(crate) struct NeonLanes;

impl Lanes for NeonLanes {
    type Reg = float32x4_t;

    const WIDTH: usize = 4;

    #[inline(always)]
    unsafe fn zero() -> float32x4_t {
        vdupq_n_f32(0.0)
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> float32x4_t {
        vld1q_f32(ptr)
    }

    // NEON loads have no separate aligned form.
    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> float32x4_t {
        vld1q_f32(ptr)
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut f32, v: float32x4_t) {
        vst1q_f32(ptr, v)
    }

    #[inline(always)]
    unsafe fn add(a: float32x4_t, b: float32x4_t) -> float32x4_t {
        vaddq_f32(a, b)
    }

    #[inline(always)]
    unsafe fn sub(a: float32x4_t, b: float32x4_t) -> float32x4_t {
        vsubq_f32(a, b)
    }

    #[inline(always)]
    unsafe fn mul_add(acc: float32x4_t, a: float32x4_t, b: float32x4_t) -> float32x4_t {
        vfmaq_f32(acc, a, b)
    }

    #[inline(always)]
    unsafe fn reduce_sum(v: float32x4_t) -> f32 {
        vaddvq_f32(v)
    }
}

vector_backend! {
    /// NEON backend (128-bit, aarch64).
    NeonBackend {
        lanes: NeonLanes,
        name: "neon",
        feature: "neon",
        contract: super::no_alignment_contract,
    }
}

impl NeonBackend {
    /// Returns the backend if the CPU supports NEON.
    pub fn detect() -> Option<Self> {
        if std::arch::is_aarch64_feature_detected!("neon") {
            Some(NeonBackend { _detected: () })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MatrixBackend;

    #[test]
    fn test_neon_add() {
        let Some(neon) = NeonBackend::detect() else {
            return;
        };
        let a = vec![1.0; 8];
        let b = vec![2.0; 8];
        let mut out = vec![0.0; 8];
        neon.add(&a, &b, 4, 2, &mut out);
        assert_eq!(out, vec![3.0; 8]);
    }

    #[test]
    fn test_neon_multiply_transposed_tail() {
        let Some(neon) = NeonBackend::detect() else {
            return;
        };
        // width 6 = one full vector plus a tail of 2
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = vec![1.0; 6];
        let mut out = vec![0.0; 1];
        neon.multiply_transposed(&a, &b, 6, 1, 1, &mut out);
        assert_eq!(out, vec![21.0]);
    }
}
