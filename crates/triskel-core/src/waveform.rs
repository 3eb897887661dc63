//! Sampled waveforms and X/Y/Z phase triples.

use crate::error::{Error, Result};
use triskel_analysis::{PhaseTripleValidator, TripleVerdict};

/// Canonical sample rate for waveform files and the default pipeline.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// An immutable run of finite samples at a known sample rate.
///
/// Every stage returns a new waveform rather than editing its input.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap samples, rejecting a zero sample rate or any non-finite sample.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::invalid_input("sample rate must be non-zero"));
        }
        triskel_analysis::check_finite(&samples)?;
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// `len` zero samples.
    pub fn silence(len: usize, sample_rate: u32) -> Result<Self> {
        Self::new(vec![0.0; len], sample_rate)
    }

    /// Sample values.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Take ownership of the sample values.
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the waveform holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0f64, |m, s| m.max(s.abs()))
    }

    /// Scale so the peak is exactly 1. Silent waveforms are returned unchanged.
    pub fn normalized(self) -> Self {
        let peak = self.peak();
        if peak > 0.0 { self.scaled(1.0 / peak) } else { self }
    }

    /// Scale down only when the peak exceeds 1.
    ///
    /// Returns the waveform and whether rescaling happened.
    pub fn limited(self) -> (Self, bool) {
        let peak = self.peak();
        if peak > 1.0 {
            (self.scaled(1.0 / peak), true)
        } else {
            (self, false)
        }
    }

    /// Multiply every sample by `gain`.
    pub fn scaled(mut self, gain: f64) -> Self {
        for s in &mut self.samples {
            *s *= gain;
        }
        self
    }

    /// Fail with a precondition violation unless the sample rate is `expected`.
    pub fn require_sample_rate(&self, expected: u32) -> Result<()> {
        if self.sample_rate == expected {
            Ok(())
        } else {
            Err(Error::precondition(format!(
                "sample rate mismatch: waveform is {} Hz, pipeline expects {} Hz",
                self.sample_rate, expected
            )))
        }
    }

    /// Fail with invalid input if the waveform holds no samples.
    pub(crate) fn require_non_empty(&self) -> Result<()> {
        if self.samples.is_empty() {
            Err(Error::invalid_input("waveform is empty"))
        } else {
            Ok(())
        }
    }
}

/// Three same-length waveforms carrying one pattern at 0°, 120° and 240°.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTriple {
    /// 0° member.
    pub x: Waveform,
    /// 120° member.
    pub y: Waveform,
    /// 240° member.
    pub z: Waveform,
}

impl PhaseTriple {
    /// Group three waveforms, requiring a shared sample rate and length.
    pub fn new(x: Waveform, y: Waveform, z: Waveform) -> Result<Self> {
        if x.sample_rate() != y.sample_rate() || y.sample_rate() != z.sample_rate() {
            return Err(Error::precondition(format!(
                "phase triple sample rates differ: {} / {} / {} Hz",
                x.sample_rate(),
                y.sample_rate(),
                z.sample_rate()
            )));
        }
        if x.len() != y.len() || y.len() != z.len() {
            return Err(Error::invalid_input(format!(
                "phase triple lengths differ: {} / {} / {}",
                x.len(),
                y.len(),
                z.len()
            )));
        }
        Ok(Self { x, y, z })
    }

    /// Run the 120° symmetry check on this triple.
    pub fn validate(&self, validator: &PhaseTripleValidator) -> Result<TripleVerdict> {
        Ok(validator.validate(self.x.samples(), self.y.samples(), self.z.samples())?)
    }

    /// The members in X, Y, Z order.
    pub fn members(&self) -> [&Waveform; 3] {
        [&self.x, &self.y, &self.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_finite_and_zero_rate() {
        assert!(Waveform::new(vec![0.0, f64::INFINITY], 44100).is_err());
        assert!(Waveform::new(vec![0.0], 0).is_err());
    }

    #[test]
    fn normalized_hits_unit_peak() {
        let w = Waveform::new(vec![0.25, -0.5, 0.1], 8000).unwrap().normalized();
        assert_eq!(w.samples(), &[0.5, -1.0, 0.2]);
    }

    #[test]
    fn normalized_silence_is_noop() {
        let w = Waveform::silence(4, 8000).unwrap().normalized();
        assert_eq!(w.samples(), &[0.0; 4]);
    }

    #[test]
    fn limited_only_scales_above_one() {
        let (quiet, scaled) = Waveform::new(vec![0.5, -0.9], 8000).unwrap().limited();
        assert!(!scaled);
        assert_eq!(quiet.samples(), &[0.5, -0.9]);

        let (loud, scaled) = Waveform::new(vec![2.0, -1.0], 8000).unwrap().limited();
        assert!(scaled);
        assert_eq!(loud.samples(), &[1.0, -0.5]);
    }

    #[test]
    fn sample_rate_mismatch_is_precondition_violation() {
        let w = Waveform::silence(10, 48000).unwrap();
        assert!(matches!(
            w.require_sample_rate(44100),
            Err(Error::PreconditionViolation(_))
        ));
        assert!(w.require_sample_rate(48000).is_ok());
    }

    #[test]
    fn duration_from_rate() {
        let w = Waveform::silence(22050, 44100).unwrap();
        assert!((w.duration_secs() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn triple_requires_matching_rates() {
        let a = Waveform::silence(8, 8000).unwrap();
        let b = Waveform::silence(8, 16000).unwrap();
        let err = PhaseTriple::new(a.clone(), a, b).unwrap_err();
        assert!(matches!(err, Error::PreconditionViolation(_)));
    }
}
