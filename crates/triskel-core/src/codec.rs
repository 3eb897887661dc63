//! Harmonic encoding: waveform to `{multiplier: amplitude}`.
//!
//! The fundamental is taken as the strongest bin below a search limit. That
//! is a heuristic and assumes the dominant low-frequency component is the
//! carrier; inputs with strong sub-limit noise will pick the wrong one.

use crate::error::{Error, Result};
use crate::harmonic::{CANONICAL_HARMONICS, HarmonicVector, Multiplier};
use crate::waveform::Waveform;
use triskel_analysis::{SpectralAnalyzer, Window};

/// Default upper bound for the fundamental search.
pub const DEFAULT_FUNDAMENTAL_LIMIT_HZ: f64 = 1000.0;

/// Estimated fundamental together with the encoded harmonic amplitudes.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicSignature {
    /// Peak frequency below the search limit, in Hz.
    pub fundamental_hz: f64,
    /// Raw FFT magnitudes at each target multiple of the fundamental.
    pub vector: HarmonicVector,
}

/// Extracts harmonic amplitudes at fixed multiples of an estimated fundamental.
#[derive(Debug, Clone)]
pub struct HarmonicCodec {
    sample_rate: u32,
    targets: Vec<Multiplier>,
    fundamental_limit_hz: f64,
    analyzer: SpectralAnalyzer,
}

impl HarmonicCodec {
    /// Codec for `sample_rate` targeting the 3-6-9 set.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            targets: CANONICAL_HARMONICS.to_vec(),
            fundamental_limit_hz: DEFAULT_FUNDAMENTAL_LIMIT_HZ,
            analyzer: SpectralAnalyzer::new(f64::from(sample_rate)),
        }
    }

    /// Replace the target multipliers.
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = Multiplier>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    /// Replace the fundamental search limit.
    pub fn with_fundamental_limit(mut self, limit_hz: f64) -> Self {
        self.fundamental_limit_hz = limit_hz;
        self
    }

    /// Replace the analysis window.
    pub fn with_window(mut self, window: Window) -> Self {
        self.analyzer = self.analyzer.with_window(window);
        self
    }

    /// Configured sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Target multipliers in encoding order.
    pub fn targets(&self) -> &[Multiplier] {
        &self.targets
    }

    /// Encode a waveform into its harmonic vector.
    pub fn encode(&self, waveform: &Waveform) -> Result<HarmonicVector> {
        self.analyze(waveform).map(|s| s.vector)
    }

    /// Encode a waveform and report the fundamental it was encoded against.
    pub fn analyze(&self, waveform: &Waveform) -> Result<HarmonicSignature> {
        waveform.require_sample_rate(self.sample_rate)?;
        let spectrum = self.analyzer.analyze(waveform.samples())?;

        let (fundamental_hz, _) = spectrum
            .peak_below(self.fundamental_limit_hz)
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "no spectral bin below {} Hz to estimate a fundamental from",
                    self.fundamental_limit_hz
                ))
            })?;

        let vector: HarmonicVector = self
            .targets
            .iter()
            .map(|&m| (m, spectrum.magnitude_at(fundamental_hz * f64::from(m))))
            .collect();

        tracing::debug!(fundamental_hz, harmonics = %vector, "encoded harmonics");
        Ok(HarmonicSignature {
            fundamental_hz,
            vector,
        })
    }
}
