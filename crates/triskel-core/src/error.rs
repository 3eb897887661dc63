//! Error types for the transform chain and lock protocol.

use thiserror::Error;
use triskel_analysis::AnalysisError;

/// Errors raised by core operations.
///
/// A rejected feedback lock is deliberately absent: it is an expected outcome
/// reported through [`LockState::Rejected`](crate::lock::LockState) and
/// [`TransmissionOutcome::Aborted`](crate::pipeline::TransmissionOutcome), not
/// a failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Wrong sample type or shape, empty sequence, or out-of-range argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A contract between stages was broken (sample-rate or base-frequency mismatch).
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// A hardware collaborator is missing or failed.
    #[error("hardware unavailable: {0}")]
    HardwareUnavailable(String),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput(reason.into())
    }

    /// Create a precondition violation error.
    pub fn precondition(reason: impl Into<String>) -> Self {
        Error::PreconditionViolation(reason.into())
    }

    /// Create a hardware unavailable error.
    pub fn hardware(reason: impl Into<String>) -> Self {
        Error::HardwareUnavailable(reason.into())
    }

    /// True for errors that must abort the current call.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::HardwareUnavailable(_))
    }
}

impl From<AnalysisError> for Error {
    fn from(err: AnalysisError) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reject non-finite or non-positive frequencies.
pub(crate) fn check_frequency(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_input(format!(
            "{name} must be a finite positive frequency, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_errors_become_invalid_input() {
        let err: Error = AnalysisError::EmptyInput.into();
        assert_eq!(err, Error::InvalidInput("sample sequence is empty".into()));
    }

    #[test]
    fn display_prefixes() {
        assert_eq!(
            Error::precondition("sample rate 48000 != 44100").to_string(),
            "precondition violated: sample rate 48000 != 44100"
        );
        assert!(Error::hardware("no input device").to_string().starts_with("hardware unavailable"));
    }

    #[test]
    fn only_hardware_errors_are_recoverable() {
        assert!(Error::invalid_input("x").is_fatal());
        assert!(Error::precondition("x").is_fatal());
        assert!(!Error::hardware("x").is_fatal());
    }

    #[test]
    fn frequency_check() {
        assert!(check_frequency("base_freq", 111.0).is_ok());
        assert!(check_frequency("base_freq", 0.0).is_err());
        assert!(check_frequency("base_freq", f64::NAN).is_err());
        assert!(check_frequency("base_freq", -3.0).is_err());
    }
}
