//! Core types for the MFCC front-end.
//!
//! The pipeline works on frames of real-valued audio samples and produces
//! compact feature vectors. Everything here is single-precision: the
//! transform tables are computed in `f64` and stored as `f32`, and all
//! per-frame arithmetic runs in `f32`.

use serde::{Deserialize, Serialize};

/// A single real-valued audio sample.
pub type Sample = f32;

/// Result type for pipeline operations.
pub type MfccResult<T> = Result<T, MfccError>;

/// Errors that can occur at the pipeline boundary.
///
/// Table construction never fails; the only runtime faults are
/// wrong-sized caller buffers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MfccError {
    #[error("frame length mismatch: expected {expected} samples, got {actual}")]
    FrameLength { expected: usize, actual: usize },

    #[error("output buffer length mismatch: expected {expected}, got {actual}")]
    OutputLength { expected: usize, actual: usize },
}

/// Selects the execution strategy for a pipeline operation.
///
/// Both paths compute the same arithmetic; the vector path advances in
/// 4-wide lane strides. Outputs agree up to floating-point reassociation,
/// so callers may pick a path based on runtime hardware capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionPath {
    /// Portable one-sample-at-a-time loops.
    Scalar,
    /// 4-wide lane operations (SSE on x86_64, NEON on aarch64, a
    /// portable 4-element fallback elsewhere).
    Vector,
}

impl ExecutionPath {
    /// Both paths, in a fixed order. Handy for parametrizing tests.
    pub const ALL: [ExecutionPath; 2] = [ExecutionPath::Scalar, ExecutionPath::Vector];
}
