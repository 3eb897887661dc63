//! Additive keyed-noise masking.

use super::SpectralObfuscator;
use crate::error::{Error, Result};
use crate::seed::CipherSeed;
use crate::waveform::Waveform;

/// Default noise standard deviation relative to a unit-peak signal.
pub const DEFAULT_NOISE_STRENGTH: f64 = 0.2;

/// Output of [`NoiseMask::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Masked {
    /// Masked (and possibly renormalized) waveform.
    pub waveform: Waveform,
    /// The scaled noise that was added.
    pub noise: Vec<f64>,
    /// Whether the sum was divided by its peak. When set, [`NoiseMask::remove`]
    /// only approximates the original.
    pub renormalized: bool,
}

/// Adds `noise_strength * N(0, 1)` noise drawn from a stream keyed by a
/// noise secret.
#[derive(Debug, Clone)]
pub struct NoiseMask {
    seed: CipherSeed,
    noise_strength: f64,
}

impl NoiseMask {
    /// Mask keyed by `noise_key`.
    pub fn new(noise_key: &str, noise_strength: f64) -> Result<Self> {
        if !(noise_strength.is_finite() && noise_strength >= 0.0) {
            return Err(Error::invalid_input(format!(
                "noise strength must be finite and non-negative, got {noise_strength}"
            )));
        }
        Ok(Self {
            seed: CipherSeed::from_secret(noise_key),
            noise_strength,
        })
    }

    /// Mask keyed by `noise_key` at [`DEFAULT_NOISE_STRENGTH`].
    pub fn with_default_strength(noise_key: &str) -> Self {
        Self {
            seed: CipherSeed::from_secret(noise_key),
            noise_strength: DEFAULT_NOISE_STRENGTH,
        }
    }

    /// Noise standard deviation.
    pub fn noise_strength(&self) -> f64 {
        self.noise_strength
    }

    /// The first `len` scaled noise samples for this key.
    pub fn noise(&self, len: usize) -> Vec<f64> {
        let mut stream = self.seed.stream();
        (0..len)
            .map(|_| self.noise_strength * stream.standard_normal())
            .collect()
    }

    /// Add keyed noise, renormalizing if the sum clips.
    pub fn apply(&self, waveform: &Waveform) -> Result<Masked> {
        waveform.require_non_empty()?;
        let noise = self.noise(waveform.len());
        let summed = waveform
            .samples()
            .iter()
            .zip(&noise)
            .map(|(s, n)| s + n)
            .collect();
        let (masked, renormalized) = Waveform::new(summed, waveform.sample_rate())?.limited();
        if renormalized {
            tracing::debug!("noise mask renormalized; removal will be approximate");
        }
        Ok(Masked {
            waveform: masked,
            noise,
            renormalized,
        })
    }

    /// Subtract the keyed noise again.
    pub fn remove(&self, masked: &Waveform) -> Result<Waveform> {
        masked.require_non_empty()?;
        let noise = self.noise(masked.len());
        let restored = masked
            .samples()
            .iter()
            .zip(&noise)
            .map(|(s, n)| s - n)
            .collect();
        Waveform::new(restored, masked.sample_rate())
    }
}

impl SpectralObfuscator for NoiseMask {
    fn name(&self) -> &'static str {
        "noise"
    }

    fn mask(&self, waveform: &Waveform) -> Result<Waveform> {
        self.apply(waveform).map(|m| m.waveform)
    }

    fn unmask(&self, masked: &Waveform) -> Result<Waveform> {
        self.remove(masked)
    }
}
