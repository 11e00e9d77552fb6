//! Pre-emphasis and Hamming windowing of one analysis frame.
//!
//! The first stage of the pipeline: a first-order high-pass filter to
//! boost high frequencies, multiplied by a Hamming taper to reduce
//! spectral leakage in the transform that follows.
//!
//! ```text
//! out[0] = 0
//! out[i] = hamming[i] * (in[i] - tap0 * in[i-1])    i in 1..N
//! ```
//!
//! The window table is computed once at construction. The stage writes
//! only the first `frame_size` slots of its output, so a longer
//! zero-initialized destination doubles as the zero-padded real part of
//! the FFT input.
//!
//! ## Example
//!
//! ```
//! use mfcc_core::window::PreEmphasisWindow;
//! use mfcc_core::ExecutionPath;
//!
//! let stage = PreEmphasisWindow::new(400, 0.96);
//! let frame = vec![1.0f32; 400];
//! let mut windowed = vec![0.0f32; 512];
//! stage.apply(&frame, &mut windowed, ExecutionPath::Scalar);
//!
//! assert_eq!(windowed[0], 0.0);
//! // Pre-emphasis of a constant signal leaves 4% of each sample.
//! assert!((windowed[200] / stage.window()[200] - 0.04).abs() < 1e-5);
//! ```

use crate::simd::F32x4;
use crate::types::ExecutionPath;
use std::f64::consts::PI;

/// Combined pre-emphasis + Hamming window stage.
#[derive(Debug, Clone)]
pub struct PreEmphasisWindow {
    frame_size: usize,
    tap0: f32,
    window: Vec<f32>,
}

impl PreEmphasisWindow {
    /// Create the stage for a fixed frame size and pre-emphasis tap.
    ///
    /// The Hamming coefficients `0.54 - 0.46*cos(2*pi*i/(N-1))` are
    /// computed in `f64` and stored as `f32`.
    pub fn new(frame_size: usize, tap0: f32) -> Self {
        assert!(frame_size >= 2, "frame must hold at least two samples");
        let window = (0..frame_size)
            .map(|i| (0.54 - 0.46 * (2.0 * PI * i as f64 / (frame_size - 1) as f64).cos()) as f32)
            .collect();
        Self {
            frame_size,
            tap0,
            window,
        }
    }

    /// Frame size this stage was built for.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// The precomputed Hamming coefficients.
    pub fn window(&self) -> &[f32] {
        &self.window
    }

    /// Window one frame into `output[..frame_size]`.
    ///
    /// Slots of `output` beyond the frame are left untouched (the
    /// pipeline keeps them zero as FFT padding).
    pub fn apply(&self, input: &[f32], output: &mut [f32], path: ExecutionPath) {
        assert_eq!(input.len(), self.frame_size);
        assert!(output.len() >= self.frame_size);

        match path {
            ExecutionPath::Scalar => self.apply_scalar(input, output),
            ExecutionPath::Vector => self.apply_vector(input, output),
        }
    }

    fn apply_scalar(&self, input: &[f32], output: &mut [f32]) {
        output[0] = 0.0;
        for i in 1..self.frame_size {
            output[i] = self.window[i] * (input[i] - self.tap0 * input[i - 1]);
        }
    }

    /// Same arithmetic as [`Self::apply_scalar`], four lanes per step.
    /// The main loop stops at the last full quad; the ragged tail
    /// finishes scalar so the trailing `in[i-1]` load never reads past
    /// the frame.
    fn apply_vector(&self, input: &[f32], output: &mut [f32]) {
        output[0] = 0.0;
        let n = self.frame_size;
        let neg_tap = F32x4::splat(-self.tap0);

        let mut i = 1;
        while i + 4 <= n {
            let cur = F32x4::load(&input[i..]);
            let prev = F32x4::load(&input[i - 1..]);
            let win = F32x4::load(&self.window[i..]);
            // cur + prev * (-tap0), then taper.
            let emphasized = prev.mul_add(neg_tap, cur);
            (win * emphasized).store(&mut output[i..]);
            i += 4;
        }
        while i < n {
            output[i] = self.window[i] * (input[i] - self.tap0 * input[i - 1]);
            i += 1;
        }
    }
}
