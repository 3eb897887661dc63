//! Window-aligned lock keys.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default entropy salt.
pub const DEFAULT_ENTROPY_SALT: &str = "IX-Futakuchi-onna";

/// Default window length in seconds.
pub const DEFAULT_WINDOW_SECS: f64 = 1.0;

/// Source of the current time in seconds since the Unix epoch.
pub trait Clock {
    /// Current time.
    fn now(&self) -> f64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        // A clock set before the epoch collapses to t = 0 rather than failing.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Clock frozen at one instant, for replaying a known window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

/// Lowercase hex SHA-256 digest identifying one time window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockKey(String);

impl LockKey {
    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for LockKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Derives lock keys from the current time window and a shared salt.
#[derive(Clone)]
pub struct KeyGenerator<C = SystemClock> {
    entropy_salt: String,
    window_secs: f64,
    clock: C,
}

impl KeyGenerator<SystemClock> {
    /// Generator on the system clock.
    pub fn new(entropy_salt: impl Into<String>, window_secs: f64) -> Result<Self> {
        if !(window_secs.is_finite() && window_secs > 0.0) {
            return Err(Error::invalid_input(format!(
                "window must be finite and positive, got {window_secs}"
            )));
        }
        Ok(Self {
            entropy_salt: entropy_salt.into(),
            window_secs,
            clock: SystemClock,
        })
    }
}

impl Default for KeyGenerator<SystemClock> {
    fn default() -> Self {
        Self {
            entropy_salt: DEFAULT_ENTROPY_SALT.to_owned(),
            window_secs: DEFAULT_WINDOW_SECS,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> KeyGenerator<C> {
    /// Swap the time source.
    pub fn with_clock<D: Clock>(self, clock: D) -> KeyGenerator<D> {
        KeyGenerator {
            entropy_salt: self.entropy_salt,
            window_secs: self.window_secs,
            clock,
        }
    }

    /// Window length in seconds.
    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    /// Start of the window containing `now`.
    pub fn align(&self, now: f64) -> f64 {
        (now / self.window_secs).floor() * self.window_secs
    }

    /// Key for the window containing `now`.
    pub fn key_for(&self, now: f64) -> LockKey {
        let seed = harmonic_seed(self.align(now));
        let digest = Sha256::digest(format!("{seed}-{}", self.entropy_salt).as_bytes());
        let mut hex = String::with_capacity(64);
        for byte in digest {
            let _ = write!(hex, "{byte:02x}");
        }
        LockKey(hex)
    }

    /// Key for the current window.
    pub fn generate(&self) -> LockKey {
        self.key_for(self.clock.now())
    }

    /// Whether `candidate` is the key for the current window.
    pub fn verify(&self, candidate: &str) -> bool {
        self.verify_at(candidate, self.clock.now())
    }

    /// Whether `candidate` is the key for the window containing `now`.
    pub fn verify_at(&self, candidate: &str, now: f64) -> bool {
        let ok = self.key_for(now) == *candidate;
        tracing::debug!(ok, window_start = self.align(now), "lock key verification");
        ok
    }
}

/// Harmonic seed for an aligned timestamp, in `[0, 9999)`.
pub fn harmonic_seed(aligned: f64) -> u64 {
    let value = (3.0 * (6.0 * aligned).sin() + 9.0 * (3.0 * aligned).cos()).abs();
    (value * 1000.0) as u64 % 9999
}

impl<C> fmt::Debug for KeyGenerator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGenerator")
            .field("entropy_salt", &"<redacted>")
            .field("window_secs", &self.window_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_AT_1000: &str = "31285c027d5e4a0473bd24c210e5d3505b256a0701d906ab422c0641c0647bd5";
    const KEY_AT_1001: &str = "20d533a4162bf9f121b4b01ea18b95661535c5a91a12a9176ed2bccdaaa9a12e";

    fn generator() -> KeyGenerator {
        KeyGenerator::default()
    }

    #[test]
    fn harmonic_seeds() {
        assert_eq!(harmonic_seed(1000.0), 65);
        assert_eq!(harmonic_seed(1001.0), 6425);
        assert_eq!(harmonic_seed(0.0), 9000);
    }

    #[test]
    fn known_keys() {
        let generator = generator();
        assert_eq!(generator.key_for(1000.0).as_str(), KEY_AT_1000);
        assert_eq!(generator.key_for(1001.0).as_str(), KEY_AT_1001);
    }

    #[test]
    fn constant_within_window() {
        let generator = generator();
        assert_eq!(generator.key_for(1000.0), generator.key_for(1000.4));
        assert_eq!(generator.key_for(1000.0), generator.key_for(1000.99));
        assert_ne!(generator.key_for(1000.0), generator.key_for(1001.0));
    }

    #[test]
    fn verify_uses_clock() {
        let generator = generator().with_clock(FixedClock(1000.5));
        assert_eq!(generator.generate().as_str(), KEY_AT_1000);
        assert!(generator.verify(KEY_AT_1000));
        assert!(!generator.verify(KEY_AT_1001));
        assert!(generator.verify_at(KEY_AT_1001, 1001.2));
    }

    #[test]
    fn salt_changes_key() {
        let a = KeyGenerator::new("salt-a", 1.0).unwrap();
        let b = KeyGenerator::new("salt-b", 1.0).unwrap();
        assert_ne!(a.key_for(1000.0), b.key_for(1000.0));
    }

    #[test]
    fn wider_window_aligns_down() {
        let generator = KeyGenerator::new(DEFAULT_ENTROPY_SALT, 5.0).unwrap();
        assert_eq!(generator.align(1004.9), 1000.0);
        assert_eq!(generator.key_for(1004.9).as_str(), KEY_AT_1000);
    }

    #[test]
    fn rejects_bad_window() {
        assert!(KeyGenerator::new("s", 0.0).is_err());
        assert!(KeyGenerator::new("s", f64::NAN).is_err());
    }

    #[test]
    fn debug_hides_salt() {
        let generator = KeyGenerator::new("very-secret", 1.0).unwrap();
        assert!(!format!("{generator:?}").contains("very-secret"));
    }
}
