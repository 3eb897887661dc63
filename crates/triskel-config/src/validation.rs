//! Range checks for loaded settings.
//!
//! Every section is checked and all problems are reported together, so a
//! user fixing a config file sees the full list at once.

use crate::settings::Settings;
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric value outside its allowed range.
    #[error("'{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted setting name, e.g. `signal.base_freq`.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Value that is not a range problem (empty list, non-finite, ...).
    #[error("invalid '{param}': {reason}")]
    Invalid {
        /// Dotted setting name.
        param: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_range(errors: &mut Vec<ValidationError>, param: &str, value: f64, min: f64, max: f64) {
    if !(value.is_finite() && value >= min && value <= max) {
        errors.push(ValidationError::OutOfRange {
            param: param.to_owned(),
            value,
            min,
            max,
        });
    }
}

fn invalid(errors: &mut Vec<ValidationError>, param: &str, reason: impl Into<String>) {
    errors.push(ValidationError::Invalid {
        param: param.to_owned(),
        reason: reason.into(),
    });
}

/// Check every section of `settings`.
pub fn validate(settings: &Settings) -> ValidationResult<()> {
    let mut errors = Vec::new();

    let signal = &settings.signal;
    let nyquist = f64::from(signal.sample_rate) / 2.0;
    check_range(
        &mut errors,
        "signal.sample_rate",
        f64::from(signal.sample_rate),
        1000.0,
        384_000.0,
    );
    check_range(&mut errors, "signal.base_freq", signal.base_freq, 1.0, nyquist);
    check_range(&mut errors, "signal.duration", signal.duration, 0.01, 600.0);
    check_range(
        &mut errors,
        "signal.fundamental_limit_hz",
        signal.fundamental_limit_hz,
        1.0,
        nyquist,
    );
    if signal.harmonics.is_empty() {
        invalid(&mut errors, "signal.harmonics", "at least one multiplier is required");
    }
    if let Some(m) = signal.harmonics.iter().find(|&&m| m < 1) {
        invalid(&mut errors, "signal.harmonics", format!("multiplier {m} must be positive"));
    }

    check_range(&mut errors, "cipher.max_offset_hz", settings.cipher.max_offset_hz, 1.0, nyquist);

    let obf = &settings.obfuscation;
    check_range(&mut errors, "obfuscation.noise_strength", obf.noise_strength, 0.0, 10.0);
    check_range(&mut errors, "obfuscation.smear_strength", obf.smear_strength, 0.0, 1.0);
    if obf.block_size == 0 {
        invalid(&mut errors, "obfuscation.block_size", "must be non-zero");
    }

    let lock = &settings.lock;
    check_range(&mut errors, "lock.window_secs", lock.window_secs, 0.001, 86_400.0);
    check_range(&mut errors, "lock.threshold", lock.threshold, 0.0, 1.0e9);
    check_range(&mut errors, "lock.listen_secs", lock.listen_secs, 0.01, 600.0);

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate(&Settings::default()), Ok(()));
    }

    #[test]
    fn single_error_is_reported_directly() {
        let mut settings = Settings::default();
        settings.signal.base_freq = -5.0;
        let err = validate(&settings).unwrap_err();
        let ValidationError::OutOfRange { param, .. } = &err else {
            panic!("expected OutOfRange, got {err:?}");
        };
        assert_eq!(param, "signal.base_freq");
    }

    #[test]
    fn all_errors_are_collected() {
        let mut settings = Settings::default();
        settings.signal.harmonics.clear();
        settings.obfuscation.block_size = 0;
        settings.lock.window_secs = 0.0;
        match validate(&settings).unwrap_err() {
            ValidationError::Multiple(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected Multiple, got {other:?}"),
        }
    }

    #[test]
    fn base_above_nyquist_is_rejected() {
        let mut settings = Settings::default();
        settings.signal.sample_rate = 8000;
        settings.signal.base_freq = 5000.0;
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn negative_multiplier_is_invalid() {
        let mut settings = Settings::default();
        settings.signal.harmonics = vec![3, -6, 9];
        let msg = validate(&settings).unwrap_err().to_string();
        assert!(msg.contains("-6"), "got: {msg}");
    }

    #[test]
    fn nan_is_out_of_range() {
        let mut settings = Settings::default();
        settings.lock.threshold = f64::NAN;
        assert!(validate(&settings).is_err());
    }
}
