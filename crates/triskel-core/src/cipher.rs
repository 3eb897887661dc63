//! Keyed frequency permutation of harmonic vectors.
//!
//! Each multiplier is mapped to `base_freq * m + offset`, where the offsets
//! come from a stream seeded by the secret. Decryption replays the stream and
//! rounds back to the nearest multiplier.
//!
//! There is no authenticity check. A wrong secret silently yields a wrong
//! vector, which is the point: only a holder of the secret can tell.

use crate::error::{Error, Result, check_frequency};
use crate::harmonic::{HarmonicVector, Multiplier, PermutedHarmonicVector};
use crate::seed::CipherSeed;

/// Default offset bound in Hz.
///
/// Wide enough that a wrong secret lands on different multipliers at the
/// default 111 Hz base.
pub const DEFAULT_MAX_OFFSET_HZ: f64 = 240.0;

/// Secret-keyed frequency scrambler.
///
/// Only the derived seed is stored; the secret itself is dropped after
/// construction.
#[derive(Debug, Clone)]
pub struct KeyedHarmonicCipher {
    seed: CipherSeed,
    max_offset_hz: f64,
}

impl KeyedHarmonicCipher {
    /// Cipher for `secret` with offsets drawn from `[-max_offset_hz, max_offset_hz)`.
    pub fn new(secret: &str, max_offset_hz: f64) -> Result<Self> {
        if !(max_offset_hz.is_finite() && max_offset_hz >= 0.0) {
            return Err(Error::invalid_input(format!(
                "max offset must be finite and non-negative, got {max_offset_hz}"
            )));
        }
        let seed = CipherSeed::from_secret(secret);
        tracing::debug!(seed = seed.value(), max_offset_hz, "cipher seeded");
        Ok(Self {
            seed,
            max_offset_hz,
        })
    }

    /// Cipher with [`DEFAULT_MAX_OFFSET_HZ`].
    pub fn with_default_offset(secret: &str) -> Self {
        Self {
            seed: CipherSeed::from_secret(secret),
            max_offset_hz: DEFAULT_MAX_OFFSET_HZ,
        }
    }

    /// Seed derived from the secret.
    pub fn seed(&self) -> CipherSeed {
        self.seed
    }

    /// Offset bound in Hz.
    pub fn max_offset_hz(&self) -> f64 {
        self.max_offset_hz
    }

    fn offsets(&self, count: usize) -> Vec<f64> {
        let mut stream = self.seed.stream();
        (0..count)
            .map(|_| stream.uniform(-self.max_offset_hz, self.max_offset_hz))
            .collect()
    }

    /// Scramble `vector` into offset frequencies, one draw per pair in order.
    pub fn encrypt(
        &self,
        vector: &HarmonicVector,
        base_freq: f64,
    ) -> Result<PermutedHarmonicVector> {
        check_frequency("base_freq", base_freq)?;
        let offsets = self.offsets(vector.len());
        let pairs = vector
            .iter()
            .zip(offsets)
            .map(|((m, amplitude), offset)| (base_freq * f64::from(m) + offset, amplitude))
            .collect();
        Ok(PermutedHarmonicVector::new(base_freq, pairs))
    }

    /// Recover the harmonic vector from a permuted sequence.
    ///
    /// `base_freq` must be the one the sequence was encrypted with. When two
    /// pairs round to the same multiplier the later amplitude wins.
    pub fn decrypt(
        &self,
        permuted: &PermutedHarmonicVector,
        base_freq: f64,
    ) -> Result<HarmonicVector> {
        check_frequency("base_freq", base_freq)?;
        if permuted.base_freq() != base_freq {
            return Err(Error::precondition(format!(
                "sequence was encrypted at base {} Hz, decrypting at {} Hz",
                permuted.base_freq(),
                base_freq
            )));
        }
        let offsets = self.offsets(permuted.len());
        Ok(permuted
            .iter()
            .zip(offsets)
            .map(|((freq, amplitude), offset)| {
                let multiplier = ((freq - offset) / base_freq).round() as Multiplier;
                (multiplier, amplitude)
            })
            .collect())
    }
}
