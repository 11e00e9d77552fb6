//! End-to-end MFCC front-end: frame in, cepstral coefficients out.
//!
//! ```text
//! samples[400] → [pre-emphasis + Hamming] → [zero-pad to 512]
//!              → [radix-2 FFT] → [mel filter bank] → [DCT-II]
//!              → mfcc[27]   (optionally + log power spectrum[256])
//! ```
//!
//! [`MfccPipeline`] owns every precomputed table and all scratch
//! buffers, so the per-frame operations allocate nothing and a single
//! instance can stream frames back to back. Instances are not shared:
//! each thread builds its own from an [`MfccConfig`].
//!
//! The same [`ExecutionPath`] is applied to every stage of a call, so a
//! scalar run and a vector run differ only by floating-point rounding.
//!
//! ## Example
//!
//! ```
//! use mfcc_core::pipeline::{MfccConfig, MfccPipeline};
//! use mfcc_core::types::ExecutionPath;
//!
//! let mut pipeline = MfccPipeline::new(MfccConfig::default());
//! let frame = vec![0.0f32; pipeline.frame_size()];
//! let mfcc = pipeline.generate_mfcc(&frame, ExecutionPath::Scalar).unwrap();
//! assert_eq!(mfcc.len(), 27);
//! ```

use serde::{Deserialize, Serialize};

use crate::dct::DctTransform;
use crate::fft::Radix2Fft;
use crate::mel::MelFilterBank;
use crate::types::{ExecutionPath, MfccError, MfccResult};
use crate::window::PreEmphasisWindow;

/// Front-end parameters. The defaults target 25 ms frames of 16 kHz
/// speech with 26 mel filters between 300 Hz and 8 kHz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfccConfig {
    /// Input sample rate in Hz.
    pub sample_rate: f32,
    /// Samples per frame.
    pub frame_size: usize,
    /// FFT length; must be a power of two and at least `frame_size`.
    pub fft_size: usize,
    /// Pre-emphasis tap applied as `x[i] - tap * x[i-1]`.
    pub pre_emphasis: f32,
    /// Number of triangular mel filters.
    pub num_filters: usize,
    /// Lower edge of the filter bank in Hz.
    pub min_freq: f32,
    /// Upper edge of the filter bank in Hz.
    pub max_freq: f32,
    /// Floor applied to filter energies before the log.
    pub mel_floor: f32,
}

impl Default for MfccConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000.0,
            frame_size: 400,
            fft_size: 512,
            pre_emphasis: 0.96,
            num_filters: 26,
            min_freq: 300.0,
            max_freq: 8_000.0,
            mel_floor: 1.0,
        }
    }
}

/// Complete MFCC front-end with owned tables and scratch.
#[derive(Debug, Clone)]
pub struct MfccPipeline {
    config: MfccConfig,
    window: PreEmphasisWindow,
    fft: Radix2Fft,
    mel: MelFilterBank,
    dct: DctTransform,
    // Per-frame scratch. The imaginary input and the zero-pad region of
    // `windowed_re` are cleared once here and never written after.
    windowed_re: Vec<f32>,
    windowed_im: Vec<f32>,
    spectrum_re: Vec<f32>,
    spectrum_im: Vec<f32>,
    /// Log-mel energies padded to the DCT's input length; the padding
    /// slots stay zero for the vector path.
    log_mel: Vec<f32>,
}

impl MfccPipeline {
    /// Build every stage from `config`.
    ///
    /// # Panics
    ///
    /// Panics if `fft_size` is not a power of two or is smaller than
    /// `frame_size`.
    pub fn new(config: MfccConfig) -> Self {
        assert!(
            config.fft_size >= config.frame_size,
            "fft_size {} smaller than frame_size {}",
            config.fft_size,
            config.frame_size
        );

        let num_bins = config.fft_size / 2;
        let window = PreEmphasisWindow::new(config.frame_size, config.pre_emphasis);
        let fft = Radix2Fft::new(config.fft_size);
        let mel = MelFilterBank::new(
            config.num_filters,
            num_bins,
            config.sample_rate,
            config.min_freq,
            config.max_freq,
            config.mel_floor,
        );
        let dct = DctTransform::new(config.num_filters);
        let padded = dct.padded_len();

        Self {
            window,
            fft,
            mel,
            dct,
            windowed_re: vec![0.0; config.fft_size],
            windowed_im: vec![0.0; config.fft_size],
            spectrum_re: vec![0.0; config.fft_size],
            spectrum_im: vec![0.0; config.fft_size],
            log_mel: vec![0.0; padded],
            config,
        }
    }

    /// The configuration this pipeline was built from.
    pub fn config(&self) -> &MfccConfig {
        &self.config
    }

    /// Samples each frame must carry.
    pub fn frame_size(&self) -> usize {
        self.config.frame_size
    }

    /// Non-redundant spectrum bins produced per frame (`fft_size / 2`).
    pub fn num_bins(&self) -> usize {
        self.config.fft_size / 2
    }

    /// Cepstral coefficients produced per frame (`num_filters + 1`).
    pub fn num_coefficients(&self) -> usize {
        self.config.num_filters + 1
    }

    /// Window the frame and run the FFT, leaving the spectrum in
    /// `spectrum_re`/`spectrum_im`.
    fn analyze(&mut self, frame: &[f32], path: ExecutionPath) -> MfccResult<()> {
        if frame.len() != self.config.frame_size {
            return Err(MfccError::FrameLength {
                expected: self.config.frame_size,
                actual: frame.len(),
            });
        }
        self.window
            .apply(frame, &mut self.windowed_re[..self.config.frame_size], path);
        self.fft.transform(
            &self.windowed_re,
            &self.windowed_im,
            &mut self.spectrum_re,
            &mut self.spectrum_im,
            path,
        );
        Ok(())
    }

    /// Mel-filter the spectrum and take the DCT into `out`.
    fn cepstrum_into(&mut self, out: &mut [f32], path: ExecutionPath) {
        let bins = self.num_bins();
        self.mel.log_energies(
            &self.spectrum_re[..bins],
            &self.spectrum_im[..bins],
            &mut self.log_mel,
        );
        self.dct.transform(&self.log_mel, out, path);
    }

    /// Write `max(0, log10(|X[k]|²) / 10)` for the first
    /// [`Self::num_bins`] bins into `out`.
    fn write_spectral_density(&self, out: &mut [f32]) {
        let bins = self.num_bins();
        for (i, out) in out[..bins].iter_mut().enumerate() {
            let power =
                self.spectrum_re[i] * self.spectrum_re[i] + self.spectrum_im[i] * self.spectrum_im[i];
            *out = (power.log10() / 10.0).max(0.0);
        }
    }

    /// Log power spectrum of one frame.
    pub fn spectral_density(&mut self, frame: &[f32], path: ExecutionPath) -> MfccResult<Vec<f32>> {
        let mut out = vec![0.0; self.num_bins()];
        self.spectral_density_into(frame, &mut out, path)?;
        Ok(out)
    }

    /// As [`Self::spectral_density`], writing into caller-owned storage.
    pub fn spectral_density_into(
        &mut self,
        frame: &[f32],
        out: &mut [f32],
        path: ExecutionPath,
    ) -> MfccResult<()> {
        if out.len() < self.num_bins() {
            return Err(MfccError::OutputLength {
                expected: self.num_bins(),
                actual: out.len(),
            });
        }
        self.analyze(frame, path)?;
        self.write_spectral_density(out);
        Ok(())
    }

    /// Cepstral coefficients of one frame.
    pub fn generate_mfcc(&mut self, frame: &[f32], path: ExecutionPath) -> MfccResult<Vec<f32>> {
        let mut out = vec![0.0; self.num_coefficients()];
        self.generate_mfcc_into(frame, &mut out, path)?;
        Ok(out)
    }

    /// As [`Self::generate_mfcc`], writing into caller-owned storage.
    pub fn generate_mfcc_into(
        &mut self,
        frame: &[f32],
        out: &mut [f32],
        path: ExecutionPath,
    ) -> MfccResult<()> {
        if out.len() < self.num_coefficients() {
            return Err(MfccError::OutputLength {
                expected: self.num_coefficients(),
                actual: out.len(),
            });
        }
        self.analyze(frame, path)?;
        self.cepstrum_into(out, path);
        Ok(())
    }

    /// Cepstral coefficients followed by the log power spectrum, from a
    /// single analysis pass: `out[..27]` holds the MFCCs, the next
    /// [`Self::num_bins`] slots the spectrum.
    pub fn generate_mfcc_and_power_spectrum(
        &mut self,
        frame: &[f32],
        path: ExecutionPath,
    ) -> MfccResult<Vec<f32>> {
        let mut out = vec![0.0; self.num_coefficients() + self.num_bins()];
        self.generate_mfcc_and_power_spectrum_into(frame, &mut out, path)?;
        Ok(out)
    }

    /// As [`Self::generate_mfcc_and_power_spectrum`], writing into
    /// caller-owned storage.
    pub fn generate_mfcc_and_power_spectrum_into(
        &mut self,
        frame: &[f32],
        out: &mut [f32],
        path: ExecutionPath,
    ) -> MfccResult<()> {
        let coeffs = self.num_coefficients();
        let total = coeffs + self.num_bins();
        if out.len() < total {
            return Err(MfccError::OutputLength {
                expected: total,
                actual: out.len(),
            });
        }
        self.analyze(frame, path)?;
        let (mfcc, spectrum) = out.split_at_mut(coeffs);
        self.cepstrum_into(mfcc, path);
        self.write_spectral_density(spectrum);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_config_dimensions() {
        let pipeline = MfccPipeline::new(MfccConfig::default());
        assert_eq!(pipeline.frame_size(), 400);
        assert_eq!(pipeline.num_bins(), 256);
        assert_eq!(pipeline.num_coefficients(), 27);
    }

    #[test]
    fn wrong_frame_length_is_rejected() {
        let mut pipeline = MfccPipeline::new(MfccConfig::default());
        let short = vec![0.0f32; 399];
        let err = pipeline
            .generate_mfcc(&short, ExecutionPath::Scalar)
            .unwrap_err();
        assert_eq!(
            err,
            MfccError::FrameLength {
                expected: 400,
                actual: 399
            }
        );
    }

    #[test]
    fn short_output_buffer_is_rejected() {
        let mut pipeline = MfccPipeline::new(MfccConfig::default());
        let frame = vec![0.0f32; 400];
        let mut out = vec![0.0f32; 26];
        let err = pipeline
            .generate_mfcc_into(&frame, &mut out, ExecutionPath::Scalar)
            .unwrap_err();
        assert_eq!(
            err,
            MfccError::OutputLength {
                expected: 27,
                actual: 26
            }
        );
    }

    #[test]
    fn silent_frame_is_all_zero() {
        let mut pipeline = MfccPipeline::new(MfccConfig::default());
        let frame = vec![0.0f32; 400];
        for path in ExecutionPath::ALL {
            let out = pipeline
                .generate_mfcc_and_power_spectrum(&frame, path)
                .unwrap();
            // Zero energy floors to ln(1) = 0 in every filter, so the
            // DCT of all zeros is zero; log10(0) clamps to zero too.
            for &v in &out {
                assert_eq!(v, 0.0);
            }
        }
    }

    #[test]
    fn repeated_frames_are_bit_stable() {
        let mut pipeline = MfccPipeline::new(MfccConfig::default());
        let frame = vec![1.0f32; 400];
        let first = pipeline.generate_mfcc(&frame, ExecutionPath::Scalar).unwrap();
        for _ in 0..5 {
            let again = pipeline.generate_mfcc(&frame, ExecutionPath::Scalar).unwrap();
            assert_eq!(first, again, "scratch state leaked between frames");
        }
    }

    #[test]
    fn combined_output_matches_individual_calls() {
        let mut pipeline = MfccPipeline::new(MfccConfig::default());
        let frame: Vec<f32> = (0..400)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 16_000.0).sin())
            .collect();

        for path in ExecutionPath::ALL {
            let combined = pipeline
                .generate_mfcc_and_power_spectrum(&frame, path)
                .unwrap();
            let mfcc = pipeline.generate_mfcc(&frame, path).unwrap();
            let spectrum = pipeline.spectral_density(&frame, path).unwrap();
            assert_eq!(combined.len(), 27 + 256);
            assert_eq!(&combined[..27], &mfcc[..]);
            assert_eq!(&combined[27..], &spectrum[..]);
        }
    }

    #[test]
    fn tone_peaks_near_its_bin() {
        let mut pipeline = MfccPipeline::new(MfccConfig::default());
        // 1 kHz at 16 kHz over a 512-point FFT lands in bin 32.
        let frame: Vec<f32> = (0..400)
            .map(|i| (2.0 * std::f32::consts::PI * 1_000.0 * i as f32 / 16_000.0).sin())
            .collect();
        let spectrum = pipeline
            .spectral_density(&frame, ExecutionPath::Scalar)
            .unwrap();
        let peak = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert!(
            (peak as isize - 32).unsigned_abs() <= 1,
            "peak at bin {}, expected near 32",
            peak
        );
    }

    #[test]
    fn scalar_and_vector_pipelines_agree() {
        let mut pipeline = MfccPipeline::new(MfccConfig::default());
        let mut state = 0x9e3779b97f4a7c15u64;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) as f32 / (1u64 << 31) as f32) * 2.0 - 1.0
        };

        for _ in 0..50 {
            let frame: Vec<f32> = (0..400).map(|_| next()).collect();
            let scalar = pipeline
                .generate_mfcc_and_power_spectrum(&frame, ExecutionPath::Scalar)
                .unwrap();
            let vector = pipeline
                .generate_mfcc_and_power_spectrum(&frame, ExecutionPath::Vector)
                .unwrap();
            for (&s, &v) in scalar.iter().zip(&vector) {
                assert_relative_eq!(s, v, epsilon = 1e-3, max_relative = 1e-3);
            }
        }
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = MfccConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: MfccConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
