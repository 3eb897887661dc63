//! Secret-derived seeds and the keyed random streams built from them.
//!
//! Nothing here touches a process-wide generator. Every consumer stores a
//! seed and calls [`CipherSeed::stream`] (or [`KeyedStream::from_u64`]) at the
//! start of each operation, so identical seeds always replay identical draws.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use std::f64::consts::PI;

/// 32-bit seed taken from the first four bytes of SHA-256(secret), big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherSeed(u32);

impl CipherSeed {
    /// Derive the seed for a secret string.
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        Self(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
    }

    /// Raw seed value.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Fresh stream positioned at its first draw.
    pub fn stream(self) -> KeyedStream {
        KeyedStream::from_u64(u64::from(self.0))
    }
}

impl From<u32> for CipherSeed {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Deterministic ChaCha8 stream of uniform and normal draws.
pub struct KeyedStream {
    rng: ChaCha8Rng,
}

impl KeyedStream {
    /// Stream seeded with `seed`.
    pub fn from_u64(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform draw in `[0, 1)` with 53 bits of precision.
    pub fn unit(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform draw in `[low, high)`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.unit()
    }

    /// Standard normal draw (Box-Muller, cosine branch).
    ///
    /// Consumes exactly two uniforms per call.
    pub fn standard_normal(&mut self) -> f64 {
        let u1 = 1.0 - self.unit();
        let u2 = self.unit();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}

/// Seed drawn from OS entropy, for callers that did not supply one.
pub fn entropy_seed() -> u64 {
    rand::random::<u64>()
}
