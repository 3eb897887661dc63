//! Spectral smear with block phase scaling, and its keyed decoder.
//!
//! Draw order from the keyed stream is fixed: one normal per FFT bin, then
//! one uniform phase per full block. [`UnlockDecoder`] depends on replaying
//! exactly that order.

use super::SpectralObfuscator;
use crate::error::{Error, Result};
use crate::seed::{CipherSeed, KeyedStream, entropy_seed};
use crate::waveform::Waveform;
use rustfft::num_complex::Complex;
use std::f64::consts::PI;
use triskel_analysis::Fft;

/// Default relative standard deviation of the per-bin smear factors.
pub const DEFAULT_SMEAR_STRENGTH: f64 = 0.03;

/// Default block length for phase scaling.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Blocks whose cosine gain is this close to zero are not divided back.
const MIN_BLOCK_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SmearParams {
    seed: u64,
    strength: f64,
    block_size: usize,
}

impl SmearParams {
    fn check(&self, waveform: &Waveform) -> Result<()> {
        if self.block_size == 0 {
            return Err(Error::invalid_input("block size must be non-zero"));
        }
        if !(self.strength.is_finite() && self.strength >= 0.0) {
            return Err(Error::invalid_input(format!(
                "smear strength must be finite and non-negative, got {}",
                self.strength
            )));
        }
        waveform.require_non_empty()
    }

    /// Per-bin factors followed by per-block cosine gains, drawn in order.
    fn draws(&self, len: usize) -> (Vec<f64>, Vec<f64>) {
        let mut stream = KeyedStream::from_u64(self.seed);
        let factors = (0..len)
            .map(|_| 1.0 + self.strength * stream.standard_normal())
            .collect();
        let gains = (0..len / self.block_size)
            .map(|_| stream.uniform(-PI, PI).cos())
            .collect();
        (factors, gains)
    }
}

fn reshape_spectrum(samples: &[f64], factors: &[f64], divide: bool) -> Vec<f64> {
    let fft = Fft::new(samples.len());
    let spectrum: Vec<Complex<f64>> = fft
        .forward(samples)
        .into_iter()
        .zip(factors)
        .map(|(bin, &f)| if divide { bin / f } else { bin * f })
        .collect();
    fft.inverse_real(&spectrum)
}

/// Keyed spectral smear plus block cosine scaling.
#[derive(Debug, Clone)]
pub struct SmearScrambler {
    params: SmearParams,
}

impl SmearScrambler {
    /// Scrambler seeded with `seed` at default strength and block size.
    pub fn new(seed: u64) -> Self {
        Self {
            params: SmearParams {
                seed,
                strength: DEFAULT_SMEAR_STRENGTH,
                block_size: DEFAULT_BLOCK_SIZE,
            },
        }
    }

    /// Scrambler seeded from a key string via its [`CipherSeed`].
    pub fn from_key(key: &str) -> Self {
        Self::new(u64::from(CipherSeed::from_secret(key).value()))
    }

    /// Scrambler with a seed drawn from OS entropy.
    ///
    /// The seed must be read back with [`seed`](Self::seed) and shared with
    /// the receiver, otherwise the output cannot be decoded.
    pub fn from_entropy() -> Self {
        let scrambler = Self::new(entropy_seed());
        tracing::info!(seed = scrambler.seed(), "smear seed drawn from entropy");
        scrambler
    }

    /// Override the smear strength.
    pub fn with_smear_strength(mut self, strength: f64) -> Self {
        self.params.strength = strength;
        self
    }

    /// Override the block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.params.block_size = block_size;
        self
    }

    /// Seed in use.
    pub fn seed(&self) -> u64 {
        self.params.seed
    }

    /// Matching decoder for this scrambler's seed and parameters.
    pub fn decoder(&self) -> UnlockDecoder {
        UnlockDecoder {
            params: self.params,
        }
    }

    /// Smear the spectrum and scale each full block by a keyed cosine.
    ///
    /// Trailing samples that do not fill a block are left unscaled. The
    /// result is divided by its peak when the peak exceeds 1.
    pub fn obfuscate(&self, waveform: &Waveform) -> Result<Waveform> {
        self.params.check(waveform)?;
        let (factors, gains) = self.params.draws(waveform.len());

        let mut samples = reshape_spectrum(waveform.samples(), &factors, false);
        for (block, gain) in samples.chunks_exact_mut(self.params.block_size).zip(&gains) {
            for s in block {
                *s *= gain;
            }
        }

        tracing::debug!(
            seed = self.params.seed,
            blocks = gains.len(),
            "spectral smear applied"
        );
        Ok(Waveform::new(samples, waveform.sample_rate())?.limited().0)
    }
}

impl SpectralObfuscator for SmearScrambler {
    fn name(&self) -> &'static str {
        "smear"
    }

    fn mask(&self, waveform: &Waveform) -> Result<Waveform> {
        self.obfuscate(waveform)
    }

    fn unmask(&self, masked: &Waveform) -> Result<Waveform> {
        self.decoder().decode(masked)
    }
}

/// Approximate inverse of [`SmearScrambler`] for a known seed.
#[derive(Debug, Clone)]
pub struct UnlockDecoder {
    params: SmearParams,
}

impl UnlockDecoder {
    /// Decoder for `seed` at default strength and block size.
    pub fn new(seed: u64) -> Self {
        SmearScrambler::new(seed).decoder()
    }

    /// Decoder for a key string.
    pub fn from_key(key: &str) -> Self {
        SmearScrambler::from_key(key).decoder()
    }

    /// Override the smear strength; must match the scrambler's.
    pub fn with_smear_strength(mut self, strength: f64) -> Self {
        self.params.strength = strength;
        self
    }

    /// Override the block size; must match the scrambler's.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.params.block_size = block_size;
        self
    }

    /// Replay the draws, divide them back out and peak-normalize.
    ///
    /// Recovery is approximate even with the right seed.
    pub fn decode(&self, obfuscated: &Waveform) -> Result<Waveform> {
        self.params.check(obfuscated)?;
        let (factors, gains) = self.params.draws(obfuscated.len());

        let mut samples = reshape_spectrum(obfuscated.samples(), &factors, true);
        for (block, &gain) in samples.chunks_exact_mut(self.params.block_size).zip(&gains) {
            if gain.abs() < MIN_BLOCK_GAIN {
                continue;
            }
            for s in block {
                *s /= gain;
            }
        }

        Ok(Waveform::new(samples, obfuscated.sample_rate())?.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(n: usize) -> Waveform {
        let samples = (0..n)
            .map(|i| 0.5 * (2.0 * PI * 440.0 * i as f64 / 44100.0).sin())
            .collect();
        Waveform::new(samples, 44100).unwrap()
    }

    fn correlation(a: &[f64], b: &[f64]) -> f64 {
        let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let nb: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
        dot / (na * nb)
    }

    #[test]
    fn matched_seed_recovers_signal() {
        let original = tone(8192);
        let scrambler = SmearScrambler::new(42);
        let obfuscated = scrambler.obfuscate(&original).unwrap();
        let decoded = scrambler.decoder().decode(&obfuscated).unwrap();
        assert_eq!(decoded.len(), original.len());
        assert!(correlation(decoded.samples(), original.samples()) > 0.95);
    }

    #[test]
    fn mismatched_seed_does_not_recover() {
        let original = tone(8192);
        let obfuscated = SmearScrambler::new(42).obfuscate(&original).unwrap();
        let decoded = UnlockDecoder::new(43).decode(&obfuscated).unwrap();
        assert!(correlation(decoded.samples(), original.samples()) < 0.9);
    }

    #[test]
    fn trailing_samples_pass_through_block_stage() {
        // With zero smear only the block gains act, and the 10-sample tail
        // must come out identical.
        let original = tone(1034);
        let scrambler = SmearScrambler::new(7).with_smear_strength(0.0);
        let obfuscated = scrambler.obfuscate(&original).unwrap();
        for (a, b) in obfuscated.samples()[1024..]
            .iter()
            .zip(&original.samples()[1024..])
        {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn output_never_clips() {
        let loud = Waveform::new(vec![1.0; 2048], 44100).unwrap();
        let out = SmearScrambler::new(1).with_smear_strength(0.5).obfuscate(&loud).unwrap();
        assert!(out.peak() <= 1.0 + 1e-12);
    }

    #[test]
    fn key_and_seed_constructors_agree() {
        let by_key = SmearScrambler::from_key("OBF-369");
        let by_seed = SmearScrambler::new(u64::from(CipherSeed::from_secret("OBF-369").value()));
        assert_eq!(by_key.seed(), by_seed.seed());
    }

    #[test]
    fn rejects_zero_block_size() {
        let err = SmearScrambler::new(1)
            .with_block_size(0)
            .obfuscate(&tone(64))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
