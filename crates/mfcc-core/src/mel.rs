//! Mel-scale triangular filter bank over the power spectrum.
//!
//! Maps the non-redundant half of the FFT power spectrum onto a set of
//! overlapping triangular filters spaced evenly on the mel scale, then
//! log-compresses the filter energies:
//!
//! ```text
//! |X[k]|² → [bin→filter scatter] → [floor] → ln(·) → log-mel energies
//! ```
//!
//! Construction precomputes, for every spectrum bin, which one or two
//! adjacent filters it feeds and with what linear-interpolation weights
//! ([`BinMapping`]). A bin under two filters always splits its power so
//! the weights sum to one; bins outside the filter range feed nothing.
//! The runtime pass is a plain scatter-accumulate and does not
//! vectorize, so this stage has no vector variant.
//!
//! Mel conversions use the natural-log scale `1125 * ln(1 + f/700)`.
//!
//! ## Example
//!
//! ```
//! use mfcc_core::mel::{freq_to_mel, mel_to_freq, MelFilterBank};
//!
//! assert_eq!(freq_to_mel(0.0), 0.0);
//! let roundtrip = mel_to_freq(freq_to_mel(1000.0));
//! assert!((roundtrip - 1000.0).abs() < 0.1);
//!
//! let bank = MelFilterBank::new(26, 256, 16000.0, 300.0, 8000.0, 1.0);
//! assert_eq!(bank.num_filters(), 26);
//! ```

/// Convert a frequency in Hz to the mel scale: `1125 * ln(1 + f/700)`.
pub fn freq_to_mel(freq: f32) -> f32 {
    1125.0 * (1.0 + freq / 700.0).ln()
}

/// Convert a mel value back to Hz: `700 * (e^(m/1125) - 1)`.
pub fn mel_to_freq(mel: f32) -> f32 {
    700.0 * ((mel / 1125.0).exp() - 1.0)
}

/// Where one spectrum bin's power goes: up to two adjacent filters with
/// triangular weights. `coeff1 + coeff2 == 1` whenever both filters are
/// present; a bin outside the filter range has both set to `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinMapping {
    pub bin1: Option<usize>,
    pub bin2: Option<usize>,
    pub coeff1: f32,
    pub coeff2: f32,
}

impl BinMapping {
    fn none() -> Self {
        Self {
            bin1: None,
            bin2: None,
            coeff1: 0.0,
            coeff2: 0.0,
        }
    }

    fn single(bin: usize, coeff: f32) -> Self {
        Self {
            bin1: Some(bin),
            bin2: None,
            coeff1: coeff,
            coeff2: 0.0,
        }
    }

    fn pair(bin1: usize, bin2: usize, coeff1: f32) -> Self {
        Self {
            bin1: Some(bin1),
            bin2: Some(bin2),
            coeff1,
            coeff2: 1.0 - coeff1,
        }
    }
}

/// Triangular mel filter bank with a precomputed bin→filter mapping.
#[derive(Debug, Clone)]
pub struct MelFilterBank {
    num_filters: usize,
    mel_floor: f32,
    /// One entry per spectrum bin.
    mapping: Vec<BinMapping>,
}

impl MelFilterBank {
    /// Build the bank and its bin mapping.
    ///
    /// `num_bins` is the number of spectrum bins fed at runtime (the
    /// non-redundant half of the FFT, e.g. 256 for a 512-point
    /// transform). Filter boundaries are `num_filters + 2` points evenly
    /// spaced in mel between `freq_to_mel(min_freq)` and
    /// `freq_to_mel(max_freq)`; bin centers sit at
    /// `(sample_rate/2 / num_bins) * bin`.
    pub fn new(
        num_filters: usize,
        num_bins: usize,
        sample_rate: f32,
        min_freq: f32,
        max_freq: f32,
        mel_floor: f32,
    ) -> Self {
        assert!(num_filters >= 2, "need at least two filters");
        assert!(min_freq < max_freq);
        assert!(mel_floor > 0.0, "floor must be positive to keep ln finite");

        let mel_min = freq_to_mel(min_freq);
        let mel_max = freq_to_mel(max_freq);
        let interval = (mel_max - mel_min) / (num_filters as f32 + 1.0);
        let boundaries: Vec<f32> = (0..=num_filters + 1)
            .map(|i| mel_min + i as f32 * interval)
            .collect();

        let bin_width = (sample_rate / 2.0) / num_bins as f32;
        let mapping = (0..num_bins)
            .map(|bin| {
                let m = freq_to_mel(bin_width * bin as f32);
                map_bin(m, &boundaries, interval, num_filters)
            })
            .collect();

        Self {
            num_filters,
            mel_floor,
            mapping,
        }
    }

    /// Number of triangular filters.
    pub fn num_filters(&self) -> usize {
        self.num_filters
    }

    /// Number of spectrum bins the bank consumes.
    pub fn num_bins(&self) -> usize {
        self.mapping.len()
    }

    /// The precomputed per-bin mapping.
    pub fn mapping(&self) -> &[BinMapping] {
        &self.mapping
    }

    /// Accumulate log-compressed filter energies from the split complex
    /// spectrum.
    ///
    /// `spec_re`/`spec_im` carry the first [`Self::num_bins`] FFT bins;
    /// `out[..num_filters]` receives `ln(max(energy, mel_floor))`.
    /// Slots of `out` beyond `num_filters` are left untouched (the
    /// pipeline keeps them zero as DCT padding).
    pub fn log_energies(&self, spec_re: &[f32], spec_im: &[f32], out: &mut [f32]) {
        assert_eq!(spec_re.len(), self.mapping.len());
        assert_eq!(spec_im.len(), self.mapping.len());
        assert!(out.len() >= self.num_filters);

        out[..self.num_filters].fill(0.0);

        for (i, map) in self.mapping.iter().enumerate() {
            let power = spec_re[i] * spec_re[i] + spec_im[i] * spec_im[i];
            if let Some(bin) = map.bin1 {
                out[bin] += power * map.coeff1;
            }
            if let Some(bin) = map.bin2 {
                out[bin] += power * map.coeff2;
            }
        }

        for energy in &mut out[..self.num_filters] {
            *energy = energy.max(self.mel_floor).ln();
        }
    }
}

/// Locate the filter(s) bracketing one mel value.
///
/// The first and last filters are half-triangles: a bin under them feeds
/// that filter alone. Values below the first boundary or at/above
/// boundary `num_filters` feed nothing.
fn map_bin(m: f32, boundaries: &[f32], interval: f32, num_filters: usize) -> BinMapping {
    if m < boundaries[0] || boundaries[num_filters] < m {
        BinMapping::none()
    } else if m < boundaries[1] {
        BinMapping::single(0, (m - boundaries[0]) / interval)
    } else if boundaries[num_filters - 1] <= m && m < boundaries[num_filters] {
        BinMapping::single(num_filters - 1, (boundaries[num_filters] - m) / interval)
    } else {
        for j in 1..num_filters {
            if boundaries[j] <= m && m < boundaries[j + 1] {
                return BinMapping::pair(j, j + 1, (boundaries[j + 1] - m) / interval);
            }
        }
        // m == boundaries[num_filters] lands here: past the last filter.
        BinMapping::none()
    }
}
