//! # mfcc-core
//!
//! Fixed-frame MFCC feature extraction for 16 kHz speech, with every
//! stage implemented twice: a plain scalar path and a 4-lane SIMD path
//! selected per call.
//!
//! ```text
//!               ┌───────────────────────── MfccPipeline ─────────────────────────┐
//!               │                                                                │
//! samples[400] ─► pre-emphasis ─► Hamming ─► zero-pad ─► FFT-512 ─► |X|² ─► mel ─► ln
//!               │   (0.96 tap)    window      to 512     radix-2      26 filters  │
//!               │                                                        │        │
//!               │                                                      DCT-II     │
//!               │                                                        │        │
//!               └────────────────────────────────────────────────────────┼────────┘
//!                                                                        ▼
//!                                                                    mfcc[27]
//! ```
//!
//! The pipeline owns all precomputed tables (window, twiddles, filter
//! mapping, cosine basis) and all per-frame scratch, so steady-state
//! feature extraction performs no allocation. Build one per thread; a
//! pipeline is `Send` but deliberately not shared behind a global.
//!
//! ## Quick start
//!
//! ```
//! use mfcc_core::{ExecutionPath, MfccConfig, MfccPipeline};
//!
//! let mut pipeline = MfccPipeline::new(MfccConfig::default());
//!
//! // One 25 ms frame of a 440 Hz tone.
//! let frame: Vec<f32> = (0..pipeline.frame_size())
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 16_000.0).sin())
//!     .collect();
//!
//! let mfcc = pipeline.generate_mfcc(&frame, ExecutionPath::Vector).unwrap();
//! assert_eq!(mfcc.len(), pipeline.num_coefficients());
//! ```
//!
//! The individual stages are public for callers that want just a
//! windowing pass, an FFT, or a mel filter bank on their own.

pub mod dct;
pub mod fft;
pub mod mel;
pub mod pipeline;
pub mod simd;
pub mod types;
pub mod window;

pub use dct::DctTransform;
pub use fft::Radix2Fft;
pub use mel::MelFilterBank;
pub use pipeline::{MfccConfig, MfccPipeline};
pub use types::{ExecutionPath, MfccError, MfccResult, Sample};
pub use window::PreEmphasisWindow;
