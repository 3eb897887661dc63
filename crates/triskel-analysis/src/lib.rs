//! Triskel Analysis - spectral tools for harmonic signal encoding and verification
//!
//! This crate is the leaf of the triskel workspace. It knows nothing about
//! harmonic vectors, ciphers or locks; it only turns sample slices into
//! spectra and phase measurements:
//!
//! - [`fft`] - FFT wrapper with windowing functions
//! - [`spectrum`] - Windowed positive-frequency magnitude spectra ([`SpectralAnalyzer`])
//! - [`phase`] - Phase unwrapping helpers
//! - [`triple`] - Three-way 120° phase symmetry check ([`PhaseTripleValidator`])
//!
//! ## Example
//!
//! ```rust
//! use triskel_analysis::SpectralAnalyzer;
//!
//! let sample_rate = 44100.0;
//! let tone: Vec<f64> = (0..44100)
//!     .map(|i| (2.0 * std::f64::consts::PI * 111.0 * i as f64 / sample_rate).sin())
//!     .collect();
//!
//! let spectrum = SpectralAnalyzer::new(sample_rate).analyze(&tone).unwrap();
//! let (fundamental, _) = spectrum.peak_below(1000.0).unwrap();
//! assert!((fundamental - 111.0).abs() < 1.0);
//! ```

pub mod fft;
pub mod phase;
pub mod spectrum;
pub mod triple;

pub use fft::{Fft, Window};
pub use phase::{unwrap_phase, unwrap_phase_tol, wrap_degrees, wrap_to_pi};
pub use spectrum::{SpectralAnalyzer, Spectrum, check_finite};
pub use triple::{PhaseTripleValidator, TriplePair, TripleVerdict, phase_offset_degrees};

/// Errors raised by spectral analysis.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// The sample sequence was empty.
    #[error("sample sequence is empty")]
    EmptyInput,

    /// A sample was NaN or infinite.
    #[error("sample {index} is not a finite number")]
    NonFinite {
        /// Index of the first offending sample.
        index: usize,
    },

    /// The sequence is shorter than the operation needs.
    #[error("sequence of {len} samples is too short (need at least {min})")]
    TooShort {
        /// Actual length.
        len: usize,
        /// Minimum accepted length.
        min: usize,
    },

    /// Signals that must share a length do not.
    #[error("signal lengths differ: {lengths:?}")]
    LengthMismatch {
        /// Lengths of the signals involved.
        lengths: [usize; 3],
    },

    /// The sample rate is zero, negative or not finite.
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    /// No positive-frequency bin carries energy, so no phase can be measured.
    #[error("signals carry no spectral energy to measure phase from")]
    NoPhaseContent,
}

/// Convenience result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
