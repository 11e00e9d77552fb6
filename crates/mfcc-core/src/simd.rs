//! 4-lane `f32` vector helpers.
//!
//! The vectorized pipeline stages are written once against [`F32x4`], a
//! thin 4-lane wrapper that maps to SSE on x86_64 and NEON on aarch64,
//! with a portable 4-element array fallback on other targets. All unsafe
//! intrinsic calls are confined to this module.
//!
//! The lane width is fixed at 4 because every table in the pipeline is
//! sized (or zero-padded) to a multiple of 4; callers handle ragged
//! tails with scalar loops.

use std::ops::{Add, Mul, Sub};

#[cfg(target_arch = "x86_64")]
mod arch {
    use std::arch::x86_64::*;

    /// Four `f32` lanes backed by an SSE register.
    #[derive(Clone, Copy)]
    pub struct F32x4(pub(super) __m128);

    impl F32x4 {
        /// Load the first four values of `src`.
        #[inline(always)]
        pub fn load(src: &[f32]) -> Self {
            assert!(src.len() >= 4);
            // Length checked above; unaligned load is fine for SSE.
            unsafe { Self(_mm_loadu_ps(src.as_ptr())) }
        }

        /// Broadcast one value into all four lanes.
        #[inline(always)]
        pub fn splat(v: f32) -> Self {
            unsafe { Self(_mm_set1_ps(v)) }
        }

        /// Store the four lanes into the first four slots of `dst`.
        #[inline(always)]
        pub fn store(self, dst: &mut [f32]) {
            assert!(dst.len() >= 4);
            unsafe { _mm_storeu_ps(dst.as_mut_ptr(), self.0) }
        }

        /// `self * a + b`, lane-wise.
        #[inline(always)]
        pub fn mul_add(self, a: Self, b: Self) -> Self {
            unsafe { Self(_mm_add_ps(_mm_mul_ps(self.0, a.0), b.0)) }
        }

        /// Horizontal sum of the four lanes.
        #[inline(always)]
        pub fn sum(self) -> f32 {
            let mut lanes = [0.0f32; 4];
            unsafe { _mm_storeu_ps(lanes.as_mut_ptr(), self.0) };
            lanes[0] + lanes[1] + lanes[2] + lanes[3]
        }

        /// Split eight interleaved values into (even, odd) lane quads.
        #[inline(always)]
        pub fn deinterleave(src: &[f32]) -> (Self, Self) {
            assert!(src.len() >= 8);
            unsafe {
                let lo = _mm_loadu_ps(src.as_ptr());
                let hi = _mm_loadu_ps(src.as_ptr().add(4));
                let even = _mm_shuffle_ps::<0b10_00_10_00>(lo, hi);
                let odd = _mm_shuffle_ps::<0b11_01_11_01>(lo, hi);
                (Self(even), Self(odd))
            }
        }

        #[inline(always)]
        pub(super) fn add_impl(self, rhs: Self) -> Self {
            unsafe { Self(_mm_add_ps(self.0, rhs.0)) }
        }

        #[inline(always)]
        pub(super) fn sub_impl(self, rhs: Self) -> Self {
            unsafe { Self(_mm_sub_ps(self.0, rhs.0)) }
        }

        #[inline(always)]
        pub(super) fn mul_impl(self, rhs: Self) -> Self {
            unsafe { Self(_mm_mul_ps(self.0, rhs.0)) }
        }
    }
}

#[cfg(target_arch = "aarch64")]
mod arch {
    use std::arch::aarch64::*;

    /// Four `f32` lanes backed by a NEON register.
    #[derive(Clone, Copy)]
    pub struct F32x4(pub(super) float32x4_t);

    impl F32x4 {
        /// Load the first four values of `src`.
        #[inline(always)]
        pub fn load(src: &[f32]) -> Self {
            assert!(src.len() >= 4);
            unsafe { Self(vld1q_f32(src.as_ptr())) }
        }

        /// Broadcast one value into all four lanes.
        #[inline(always)]
        pub fn splat(v: f32) -> Self {
            unsafe { Self(vdupq_n_f32(v)) }
        }

        /// Store the four lanes into the first four slots of `dst`.
        #[inline(always)]
        pub fn store(self, dst: &mut [f32]) {
            assert!(dst.len() >= 4);
            unsafe { vst1q_f32(dst.as_mut_ptr(), self.0) }
        }

        /// `self * a + b`, lane-wise.
        #[inline(always)]
        pub fn mul_add(self, a: Self, b: Self) -> Self {
            unsafe { Self(vfmaq_f32(b.0, self.0, a.0)) }
        }

        /// Horizontal sum of the four lanes.
        #[inline(always)]
        pub fn sum(self) -> f32 {
            unsafe { vaddvq_f32(self.0) }
        }

        /// Split eight interleaved values into (even, odd) lane quads.
        #[inline(always)]
        pub fn deinterleave(src: &[f32]) -> (Self, Self) {
            assert!(src.len() >= 8);
            unsafe {
                let pair = vld2q_f32(src.as_ptr());
                (Self(pair.0), Self(pair.1))
            }
        }

        #[inline(always)]
        pub(super) fn add_impl(self, rhs: Self) -> Self {
            unsafe { Self(vaddq_f32(self.0, rhs.0)) }
        }

        #[inline(always)]
        pub(super) fn sub_impl(self, rhs: Self) -> Self {
            unsafe { Self(vsubq_f32(self.0, rhs.0)) }
        }

        #[inline(always)]
        pub(super) fn mul_impl(self, rhs: Self) -> Self {
            unsafe { Self(vmulq_f32(self.0, rhs.0)) }
        }
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
mod arch {
    /// Four `f32` lanes as a plain array. Written so LLVM can
    /// auto-vectorize the lane operations where the target allows.
    #[derive(Clone, Copy)]
    pub struct F32x4(pub(super) [f32; 4]);

    impl F32x4 {
        /// Load the first four values of `src`.
        #[inline(always)]
        pub fn load(src: &[f32]) -> Self {
            Self([src[0], src[1], src[2], src[3]])
        }

        /// Broadcast one value into all four lanes.
        #[inline(always)]
        pub fn splat(v: f32) -> Self {
            Self([v; 4])
        }

        /// Store the four lanes into the first four slots of `dst`.
        #[inline(always)]
        pub fn store(self, dst: &mut [f32]) {
            dst[..4].copy_from_slice(&self.0);
        }

        /// `self * a + b`, lane-wise.
        #[inline(always)]
        pub fn mul_add(self, a: Self, b: Self) -> Self {
            let mut out = [0.0f32; 4];
            for i in 0..4 {
                out[i] = self.0[i] * a.0[i] + b.0[i];
            }
            Self(out)
        }

        /// Horizontal sum of the four lanes.
        #[inline(always)]
        pub fn sum(self) -> f32 {
            self.0[0] + self.0[1] + self.0[2] + self.0[3]
        }

        /// Split eight interleaved values into (even, odd) lane quads.
        #[inline(always)]
        pub fn deinterleave(src: &[f32]) -> (Self, Self) {
            (
                Self([src[0], src[2], src[4], src[6]]),
                Self([src[1], src[3], src[5], src[7]]),
            )
        }

        #[inline(always)]
        pub(super) fn add_impl(self, rhs: Self) -> Self {
            let mut out = [0.0f32; 4];
            for i in 0..4 {
                out[i] = self.0[i] + rhs.0[i];
            }
            Self(out)
        }

        #[inline(always)]
        pub(super) fn sub_impl(self, rhs: Self) -> Self {
            let mut out = [0.0f32; 4];
            for i in 0..4 {
                out[i] = self.0[i] - rhs.0[i];
            }
            Self(out)
        }

        #[inline(always)]
        pub(super) fn mul_impl(self, rhs: Self) -> Self {
            let mut out = [0.0f32; 4];
            for i in 0..4 {
                out[i] = self.0[i] * rhs.0[i];
            }
            Self(out)
        }
    }
}

pub use arch::F32x4;

impl Add for F32x4 {
    type Output = F32x4;

    #[inline(always)]
    fn add(self, rhs: F32x4) -> F32x4 {
        self.add_impl(rhs)
    }
}

impl Sub for F32x4 {
    type Output = F32x4;

    #[inline(always)]
    fn sub(self, rhs: F32x4) -> F32x4 {
        self.sub_impl(rhs)
    }
}

impl Mul for F32x4 {
    type Output = F32x4;

    #[inline(always)]
    fn mul(self, rhs: F32x4) -> F32x4 {
        self.mul_impl(rhs)
    }
}

/// Split an interleaved slice into even- and odd-indexed halves,
/// four output elements per step.
///
/// `src.len()` must equal `even.len() + odd.len()` with the halves equal
/// in length. Ragged tails (fewer than 4 remaining) finish scalar.
pub fn deinterleave(src: &[f32], even: &mut [f32], odd: &mut [f32]) {
    debug_assert_eq!(even.len(), odd.len());
    debug_assert_eq!(src.len(), even.len() + odd.len());

    let half = even.len();
    let mut i = 0;
    while i + 4 <= half {
        let (e, o) = F32x4::deinterleave(&src[2 * i..2 * i + 8]);
        e.store(&mut even[i..]);
        o.store(&mut odd[i..]);
        i += 4;
    }
    while i < half {
        even[i] = src[2 * i];
        odd[i] = src[2 * i + 1];
        i += 1;
    }
}
