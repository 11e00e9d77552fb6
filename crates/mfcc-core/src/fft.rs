//! Recursive radix-2 Cooley-Tukey FFT over split real/imaginary buffers.
//!
//! A decimation-in-time transform for fixed power-of-two sizes:
//!
//! ```text
//! N-point frame → de-interleave → two N/2 transforms → butterfly
//!
//! out[i]       = even[i] + twiddle[i] * odd[i]
//! out[i + N/2] = even[i] - twiddle[i] * odd[i]      i in 0..N/2
//! ```
//!
//! Each recursion level (N, N/2, ..., 2) owns a precomputed twiddle
//! table of `e^(-2*pi*i*k/N)` values and its own scratch buffers, sized
//! once at construction so the transform allocates nothing per call.
//! Levels address their scratch through (base, width) offsets, so one
//! level's working set never aliases another's. The recursion bottoms
//! out at size 2, where the butterfly degenerates to a sum/difference.
//!
//! No 1/N normalization is applied on the forward transform; the
//! downstream power-spectrum stages expect unnormalized output.
//!
//! The buffers are kept as split `re`/`im` slices rather than an array
//! of complex values: the vector path de-interleaves and butterflies
//! four real lanes at a time, which needs the planar layout.
//!
//! ## Example
//!
//! ```
//! use mfcc_core::fft::Radix2Fft;
//! use mfcc_core::ExecutionPath;
//!
//! let mut fft = Radix2Fft::new(8);
//! let re = [1.0f32; 8];
//! let im = [0.0f32; 8];
//! let mut out_re = [0.0f32; 8];
//! let mut out_im = [0.0f32; 8];
//! fft.transform(&re, &im, &mut out_re, &mut out_im, ExecutionPath::Scalar);
//!
//! // A constant signal carries all energy in the DC bin.
//! assert!((out_re[0] - 8.0).abs() < 1e-5);
//! assert!(out_re[1].abs() < 1e-5);
//! ```

use crate::simd::{self, F32x4};
use crate::types::ExecutionPath;
use num_complex::Complex32;
use std::f64::consts::PI;

/// Twiddles and scratch space for one recursion level.
#[derive(Debug, Clone)]
struct Level {
    /// Transform width at this level (a power of two).
    width: usize,
    /// `width / 2` roots of unity: `e^(-2*pi*i*k/width)`.
    twiddle_re: Vec<f32>,
    twiddle_im: Vec<f32>,
    /// Full-size scratch, partitioned by (base, width) offsets.
    in_re: Vec<f32>,
    in_im: Vec<f32>,
    out_re: Vec<f32>,
    out_im: Vec<f32>,
}

impl Level {
    fn new(width: usize, full_size: usize) -> Self {
        let half = width / 2;
        let mut twiddle_re = Vec::with_capacity(half);
        let mut twiddle_im = Vec::with_capacity(half);
        for k in 0..half {
            let theta = -2.0 * PI * k as f64 / width as f64;
            twiddle_re.push(theta.cos() as f32);
            twiddle_im.push(theta.sin() as f32);
        }
        Self {
            width,
            twiddle_re,
            twiddle_im,
            in_re: vec![0.0; full_size],
            in_im: vec![0.0; full_size],
            out_re: vec![0.0; full_size],
            out_im: vec![0.0; full_size],
        }
    }
}

/// Fixed-size radix-2 FFT with preallocated per-level scratch.
///
/// Construct once, then call [`Radix2Fft::transform`] per frame. The
/// instance reuses its scratch buffers in place, so it is not safe for
/// concurrent use; give each worker thread its own instance.
#[derive(Debug, Clone)]
pub struct Radix2Fft {
    size: usize,
    /// `levels[0]` handles the full size, the last entry handles size 2.
    levels: Vec<Level>,
}

impl Radix2Fft {
    /// Create a transform for `size` points. `size` must be a power of
    /// two and at least 2.
    pub fn new(size: usize) -> Self {
        assert!(size.is_power_of_two() && size >= 2, "FFT size must be a power of two >= 2");
        let mut levels = Vec::new();
        let mut width = size;
        while width >= 2 {
            levels.push(Level::new(width, size));
            width /= 2;
        }
        Self { size, levels }
    }

    /// The transform size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward transform of `size` complex points held as split
    /// real/imaginary slices. All four slices must be exactly `size`
    /// long.
    pub fn transform(
        &mut self,
        in_re: &[f32],
        in_im: &[f32],
        out_re: &mut [f32],
        out_im: &mut [f32],
        path: ExecutionPath,
    ) {
        assert_eq!(in_re.len(), self.size);
        assert_eq!(in_im.len(), self.size);
        assert_eq!(out_re.len(), self.size);
        assert_eq!(out_im.len(), self.size);

        self.levels[0].in_re.copy_from_slice(in_re);
        self.levels[0].in_im.copy_from_slice(in_im);

        transform_level(&mut self.levels, 0, path);

        out_re.copy_from_slice(&self.levels[0].out_re);
        out_im.copy_from_slice(&self.levels[0].out_im);
    }

    /// Inverse transform, scaled by `1/size`.
    ///
    /// Implemented as `conj(FFT(conj(x))) / N`, reusing the forward
    /// machinery and its twiddle tables.
    pub fn inverse(
        &mut self,
        in_re: &[f32],
        in_im: &[f32],
        out_re: &mut [f32],
        out_im: &mut [f32],
        path: ExecutionPath,
    ) {
        assert_eq!(in_re.len(), self.size);
        assert_eq!(in_im.len(), self.size);
        assert_eq!(out_re.len(), self.size);
        assert_eq!(out_im.len(), self.size);

        self.levels[0].in_re.copy_from_slice(in_re);
        for (dst, &src) in self.levels[0].in_im.iter_mut().zip(in_im.iter()) {
            *dst = -src;
        }

        transform_level(&mut self.levels, 0, path);

        let scale = 1.0 / self.size as f32;
        for i in 0..self.size {
            out_re[i] = self.levels[0].out_re[i] * scale;
            out_im[i] = -self.levels[0].out_im[i] * scale;
        }
    }

    /// Convenience wrapper over [`Radix2Fft::transform`] for
    /// `Complex32` buffers.
    pub fn transform_complex(&mut self, input: &[Complex32], path: ExecutionPath) -> Vec<Complex32> {
        assert_eq!(input.len(), self.size);
        let in_re: Vec<f32> = input.iter().map(|c| c.re).collect();
        let in_im: Vec<f32> = input.iter().map(|c| c.im).collect();
        let mut out_re = vec![0.0; self.size];
        let mut out_im = vec![0.0; self.size];
        self.transform(&in_re, &in_im, &mut out_re, &mut out_im, path);
        out_re
            .into_iter()
            .zip(out_im)
            .map(|(re, im)| Complex32::new(re, im))
            .collect()
    }
}

/// Transform `levels[0].in[base..base+width]` into
/// `levels[0].out[base..base+width]`. `levels[0]` is the current level;
/// the remaining entries serve the half-size recursions.
fn transform_level(levels: &mut [Level], base: usize, path: ExecutionPath) {
    let (cur, rest) = levels.split_at_mut(1);
    let cur = &mut cur[0];
    let width = cur.width;

    if width == 2 {
        // Size-2 butterfly: twiddle[0] = 1, plain sum/difference.
        cur.out_re[base] = cur.in_re[base] + cur.in_re[base + 1];
        cur.out_im[base] = cur.in_im[base] + cur.in_im[base + 1];
        cur.out_re[base + 1] = cur.in_re[base] - cur.in_re[base + 1];
        cur.out_im[base + 1] = cur.in_im[base] - cur.in_im[base + 1];
        return;
    }

    let half = width / 2;
    // Vector lanes need at least one full quad per half; sizes 4 and 2
    // stay scalar.
    let vectorize = path == ExecutionPath::Vector && half >= 4;

    // Split even/odd indexed samples into the child level.
    {
        let child = &mut rest[0];
        let (even_re, odd_re) = child.in_re[base..base + width].split_at_mut(half);
        let (even_im, odd_im) = child.in_im[base..base + width].split_at_mut(half);
        let src_re = &cur.in_re[base..base + width];
        let src_im = &cur.in_im[base..base + width];
        if vectorize {
            simd::deinterleave(src_re, even_re, odd_re);
            simd::deinterleave(src_im, even_im, odd_im);
        } else {
            for k in 0..half {
                even_re[k] = src_re[2 * k];
                odd_re[k] = src_re[2 * k + 1];
                even_im[k] = src_im[2 * k];
                odd_im[k] = src_im[2 * k + 1];
            }
        }
    }

    transform_level(rest, base, path);
    transform_level(rest, base + half, path);

    // Combine the two half transforms.
    let child = &rest[0];
    let (out_lo_re, out_hi_re) = cur.out_re[base..base + width].split_at_mut(half);
    let (out_lo_im, out_hi_im) = cur.out_im[base..base + width].split_at_mut(half);
    butterfly(
        &cur.twiddle_re,
        &cur.twiddle_im,
        &child.out_re[base..base + half],
        &child.out_im[base..base + half],
        &child.out_re[base + half..base + width],
        &child.out_im[base + half..base + width],
        out_lo_re,
        out_lo_im,
        out_hi_re,
        out_hi_im,
        vectorize,
    );
}

/// `out_lo[i] = even[i] + tw[i]*odd[i]`, `out_hi[i] = even[i] - tw[i]*odd[i]`.
#[allow(clippy::too_many_arguments)]
fn butterfly(
    tw_re: &[f32],
    tw_im: &[f32],
    even_re: &[f32],
    even_im: &[f32],
    odd_re: &[f32],
    odd_im: &[f32],
    out_lo_re: &mut [f32],
    out_lo_im: &mut [f32],
    out_hi_re: &mut [f32],
    out_hi_im: &mut [f32],
    vectorize: bool,
) {
    let half = even_re.len();
    let mut i = 0;

    if vectorize {
        while i + 4 <= half {
            let tre = F32x4::load(&tw_re[i..]);
            let tim = F32x4::load(&tw_im[i..]);
            let ere = F32x4::load(&even_re[i..]);
            let eim = F32x4::load(&even_im[i..]);
            let ore = F32x4::load(&odd_re[i..]);
            let oim = F32x4::load(&odd_im[i..]);

            // (a+bi)(c+di) = (ac - bd) + (ad + bc)i
            let off_re = tre * ore - tim * oim;
            let off_im = tre * oim + tim * ore;

            (ere + off_re).store(&mut out_lo_re[i..]);
            (eim + off_im).store(&mut out_lo_im[i..]);
            (ere - off_re).store(&mut out_hi_re[i..]);
            (eim - off_im).store(&mut out_hi_im[i..]);
            i += 4;
        }
    }

    while i < half {
        let off_re = tw_re[i] * odd_re[i] - tw_im[i] * odd_im[i];
        let off_im = tw_re[i] * odd_im[i] + tw_im[i] * odd_re[i];

        out_lo_re[i] = even_re[i] + off_re;
        out_lo_im[i] = even_im[i] + off_im;
        out_hi_re[i] = even_re[i] - off_re;
        out_hi_im[i] = even_im[i] - off_im;
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rustfft::num_complex::Complex32 as RefComplex;
    use rustfft::FftPlanner;

    fn lcg_signal(len: usize, seed: u64) -> (Vec<f32>, Vec<f32>) {
        let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as f64 / (1u64 << 31) as f64 - 1.0) as f32
        };
        let re = (0..len).map(|_| next()).collect();
        let im = (0..len).map(|_| next()).collect();
        (re, im)
    }

    #[test]
    fn dc_signal_concentrates_in_bin_zero() {
        let mut fft = Radix2Fft::new(512);
        let in_re = vec![1.0f32; 512];
        let in_im = vec![0.0f32; 512];
        let mut out_re = vec![0.0f32; 512];
        let mut out_im = vec![0.0f32; 512];
        fft.transform(&in_re, &in_im, &mut out_re, &mut out_im, ExecutionPath::Scalar);

        assert_relative_eq!(out_re[0], 512.0, epsilon = 1e-2);
        for i in 1..512 {
            assert!(out_re[i].abs() < 1e-2, "bin {} re = {}", i, out_re[i]);
            assert!(out_im[i].abs() < 1e-2, "bin {} im = {}", i, out_im[i]);
        }
    }

    #[test]
    fn single_tone_peaks_at_its_bin() {
        let n = 512;
        let bin = 37;
        let mut fft = Radix2Fft::new(n);
        let in_re: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * bin as f64 * i as f64 / n as f64).cos() as f32)
            .collect();
        let in_im = vec![0.0f32; n];
        let mut out_re = vec![0.0f32; n];
        let mut out_im = vec![0.0f32; n];
        fft.transform(&in_re, &in_im, &mut out_re, &mut out_im, ExecutionPath::Vector);

        let (peak, _) = out_re
            .iter()
            .zip(out_im.iter())
            .map(|(&re, &im)| re * re + im * im)
            .enumerate()
            .take(n / 2)
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();
        assert_eq!(peak, bin);
    }

    #[test]
    fn forward_inverse_round_trip() {
        for &path in &ExecutionPath::ALL {
            let mut fft = Radix2Fft::new(512);
            let (in_re, in_im) = lcg_signal(512, 42);
            let mut spec_re = vec![0.0f32; 512];
            let mut spec_im = vec![0.0f32; 512];
            let mut back_re = vec![0.0f32; 512];
            let mut back_im = vec![0.0f32; 512];

            fft.transform(&in_re, &in_im, &mut spec_re, &mut spec_im, path);
            fft.inverse(&spec_re, &spec_im, &mut back_re, &mut back_im, path);

            for i in 0..512 {
                assert_relative_eq!(in_re[i], back_re[i], epsilon = 1e-3, max_relative = 1e-3);
                assert_relative_eq!(in_im[i], back_im[i], epsilon = 1e-3, max_relative = 1e-3);
            }
        }
    }

    #[test]
    fn matches_rustfft_reference() {
        let n = 512;
        let (in_re, in_im) = lcg_signal(n, 99);

        let mut fft = Radix2Fft::new(n);
        let mut out_re = vec![0.0f32; n];
        let mut out_im = vec![0.0f32; n];
        fft.transform(&in_re, &in_im, &mut out_re, &mut out_im, ExecutionPath::Scalar);

        let mut reference: Vec<RefComplex> = in_re
            .iter()
            .zip(in_im.iter())
            .map(|(&re, &im)| RefComplex::new(re, im))
            .collect();
        FftPlanner::new().plan_fft_forward(n).process(&mut reference);

        for i in 0..n {
            assert_relative_eq!(out_re[i], reference[i].re, epsilon = 1e-2, max_relative = 1e-3);
            assert_relative_eq!(out_im[i], reference[i].im, epsilon = 1e-2, max_relative = 1e-3);
        }
    }

    #[test]
    fn scalar_and_vector_paths_agree() {
        let mut fft = Radix2Fft::new(512);
        for seed in 0..200 {
            let (in_re, in_im) = lcg_signal(512, seed);
            let mut s_re = vec![0.0f32; 512];
            let mut s_im = vec![0.0f32; 512];
            let mut v_re = vec![0.0f32; 512];
            let mut v_im = vec![0.0f32; 512];

            fft.transform(&in_re, &in_im, &mut s_re, &mut s_im, ExecutionPath::Scalar);
            fft.transform(&in_re, &in_im, &mut v_re, &mut v_im, ExecutionPath::Vector);

            for i in 0..512 {
                assert_relative_eq!(s_re[i], v_re[i], epsilon = 1e-3, max_relative = 1e-4);
                assert_relative_eq!(s_im[i], v_im[i], epsilon = 1e-3, max_relative = 1e-4);
            }
        }
    }

    #[test]
    fn small_sizes_stay_correct() {
        // Sizes 2 and 4 take the scalar fallback even on the vector path.
        for &n in &[2usize, 4, 8] {
            let mut fft = Radix2Fft::new(n);
            let (in_re, in_im) = lcg_signal(n, n as u64);
            let mut s_re = vec![0.0f32; n];
            let mut s_im = vec![0.0f32; n];
            let mut v_re = vec![0.0f32; n];
            let mut v_im = vec![0.0f32; n];
            fft.transform(&in_re, &in_im, &mut s_re, &mut s_im, ExecutionPath::Scalar);
            fft.transform(&in_re, &in_im, &mut v_re, &mut v_im, ExecutionPath::Vector);

            // Direct DFT reference.
            for k in 0..n {
                let mut acc_re = 0.0f64;
                let mut acc_im = 0.0f64;
                for t in 0..n {
                    let theta = -2.0 * PI * k as f64 * t as f64 / n as f64;
                    let (sin, cos) = theta.sin_cos();
                    acc_re += in_re[t] as f64 * cos - in_im[t] as f64 * sin;
                    acc_im += in_re[t] as f64 * sin + in_im[t] as f64 * cos;
                }
                assert_relative_eq!(s_re[k], acc_re as f32, epsilon = 1e-4, max_relative = 1e-3);
                assert_relative_eq!(s_im[k], acc_im as f32, epsilon = 1e-4, max_relative = 1e-3);
                assert_relative_eq!(v_re[k], acc_re as f32, epsilon = 1e-4, max_relative = 1e-3);
                assert_relative_eq!(v_im[k], acc_im as f32, epsilon = 1e-4, max_relative = 1e-3);
            }
        }
    }

    #[test]
    fn complex_wrapper_matches_split_layout() {
        let n = 64;
        let (in_re, in_im) = lcg_signal(n, 5);
        let input: Vec<Complex32> = in_re
            .iter()
            .zip(in_im.iter())
            .map(|(&re, &im)| Complex32::new(re, im))
            .collect();

        let mut fft = Radix2Fft::new(n);
        let from_complex = fft.transform_complex(&input, ExecutionPath::Scalar);

        let mut out_re = vec![0.0f32; n];
        let mut out_im = vec![0.0f32; n];
        fft.transform(&in_re, &in_im, &mut out_re, &mut out_im, ExecutionPath::Scalar);

        for i in 0..n {
            assert_eq!(from_complex[i].re, out_re[i]);
            assert_eq!(from_complex[i].im, out_im[i]);
        }
    }
}
