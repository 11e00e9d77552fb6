//! Type-II discrete cosine transform over the log-mel energies.
//!
//! Computes `num_points + 1` cepstral coefficients from `num_points`
//! log-mel energies as plain dot products against a precomputed cosine
//! table:
//!
//! ```text
//! out[i] = Σ_j table[i][j] * input[j]
//! table[i][j] = sqrt(2/N) * cos(π * i * (j + 0.5) / N)
//! ```
//!
//! Rows are stored contiguously with their length rounded up to a
//! multiple of four and the padding cells set to zero, so the vector
//! path can walk whole rows in four-lane chunks with no tail. Inputs
//! must supply that padded length (the pipeline keeps the padding slots
//! of its log-mel scratch permanently zero).
//!
//! Both execution paths share the table; the vector path folds four
//! partial sums at the end so the two agree to rounding error.
//!
//! ## Example
//!
//! ```
//! use mfcc_core::dct::DctTransform;
//! use mfcc_core::types::ExecutionPath;
//!
//! let dct = DctTransform::new(26);
//! let input = vec![1.0f32; dct.padded_len()];
//! let mut out = vec![0.0f32; dct.num_coefficients()];
//! dct.transform(&input, &mut out, ExecutionPath::Scalar);
//! assert_eq!(out.len(), 27);
//! ```

use crate::simd::F32x4;
use crate::types::ExecutionPath;

/// Precomputed DCT-II basis with padded row stride.
#[derive(Debug, Clone)]
pub struct DctTransform {
    num_points: usize,
    padded: usize,
    /// `num_points + 1` rows of `padded` cells each; padding is zero.
    table: Vec<f32>,
}

impl DctTransform {
    /// Build the cosine table for `num_points` input energies.
    ///
    /// The table is evaluated in `f64` and narrowed on store.
    pub fn new(num_points: usize) -> Self {
        assert!(num_points > 0);
        let padded = (num_points + 3) & !3;
        let scale = (2.0 / num_points as f64).sqrt();

        let mut table = vec![0.0f32; (num_points + 1) * padded];
        for i in 0..=num_points {
            let row = &mut table[i * padded..i * padded + num_points];
            for (j, cell) in row.iter_mut().enumerate() {
                let angle = std::f64::consts::PI * i as f64 * (j as f64 + 0.5)
                    / num_points as f64;
                *cell = (scale * angle.cos()) as f32;
            }
        }

        Self {
            num_points,
            padded,
            table,
        }
    }

    /// Number of input energies.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Number of output coefficients (`num_points + 1`).
    pub fn num_coefficients(&self) -> usize {
        self.num_points + 1
    }

    /// Input length both paths consume: `num_points` rounded up to a
    /// multiple of four. Cells past `num_points` must be zero.
    pub fn padded_len(&self) -> usize {
        self.padded
    }

    /// Project `input` onto the cosine basis.
    pub fn transform(&self, input: &[f32], output: &mut [f32], path: ExecutionPath) {
        assert!(input.len() >= self.padded);
        assert!(output.len() >= self.num_coefficients());
        match path {
            ExecutionPath::Scalar => self.transform_scalar(input, output),
            ExecutionPath::Vector => self.transform_vector(input, output),
        }
    }

    fn transform_scalar(&self, input: &[f32], output: &mut [f32]) {
        for (i, out) in output[..self.num_coefficients()].iter_mut().enumerate() {
            let row = &self.table[i * self.padded..(i + 1) * self.padded];
            let mut acc = 0.0f32;
            for (cell, x) in row.iter().zip(&input[..self.padded]) {
                acc += cell * x;
            }
            *out = acc;
        }
    }

    fn transform_vector(&self, input: &[f32], output: &mut [f32]) {
        for (i, out) in output[..self.num_coefficients()].iter_mut().enumerate() {
            let row = &self.table[i * self.padded..(i + 1) * self.padded];
            let mut acc = F32x4::splat(0.0);
            let mut j = 0;
            while j < self.padded {
                let cells = F32x4::load(&row[j..]);
                let xs = F32x4::load(&input[j..]);
                acc = cells.mul_add(xs, acc);
                j += 4;
            }
            *out = acc.sum();
        }
    }
}
