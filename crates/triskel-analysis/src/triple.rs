//! Three-way phase symmetry check for X/Y/Z signal triples.
//!
//! A valid triple carries one harmonic pattern at 0°, 120° and 240°. The
//! validator measures each pairwise offset from the FFT phase of both signals
//! and accepts the triple when every step around the loop is 120° within a
//! tolerance.
//!
//! Only positive-frequency bins that carry energy in both signals take part in
//! the measurement. Averaging over every bin would mix the conjugate
//! (negative-frequency) half, whose offsets have the opposite sign, and
//! near-empty bins whose phase is numerical noise.

use std::fmt;

use crate::fft::Fft;
use crate::phase::{unwrap_phase, wrap_degrees};
use crate::spectrum::check_finite;
use crate::{AnalysisError, Result};

/// Default accepted deviation from 120°, in degrees.
pub const DEFAULT_TOLERANCE_DEG: f64 = 10.0;

/// Default fraction of the strongest joint bin a bin needs to be measured.
pub const DEFAULT_ENERGY_FLOOR: f64 = 0.01;

const TARGET_OFFSET_DEG: f64 = 120.0;

/// One step of the X → Y → Z → X loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriplePair {
    /// Offset of Y relative to X.
    XToY,
    /// Offset of Z relative to Y.
    YToZ,
    /// Closing step from Z back to X.
    ZToX,
}

impl fmt::Display for TriplePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriplePair::XToY => "X → Y",
            TriplePair::YToZ => "Y → Z",
            TriplePair::ZToX => "Z → X",
        };
        f.write_str(name)
    }
}

/// Measured offsets for a triple and the pairs that broke symmetry.
#[derive(Debug, Clone, PartialEq)]
pub struct TripleVerdict {
    /// Phase of Y relative to X, degrees in [0, 360). NaN when the pair
    /// shares no spectral energy.
    pub x_to_y: f64,
    /// Phase of Z relative to Y, degrees in [0, 360).
    pub y_to_z: f64,
    /// Phase lead of Z over X, degrees in [0, 360). The closing step is
    /// `(360 - z_to_x) mod 360`.
    pub z_to_x: f64,
    /// Tolerance the verdict was computed with.
    pub tolerance_deg: f64,
    broken: Vec<TriplePair>,
}

impl TripleVerdict {
    /// True when every step is within tolerance of 120°.
    pub fn is_valid(&self) -> bool {
        self.broken.is_empty()
    }

    /// Steps whose offset missed 120° by more than the tolerance.
    pub fn broken_pairs(&self) -> &[TriplePair] {
        &self.broken
    }

    /// The offset compared against 120° for the given step.
    pub fn step_degrees(&self, pair: TriplePair) -> f64 {
        match pair {
            TriplePair::XToY => self.x_to_y,
            TriplePair::YToZ => self.y_to_z,
            TriplePair::ZToX => wrap_degrees(360.0 - self.z_to_x),
        }
    }
}

fn write_offset(f: &mut fmt::Formatter<'_>, label: &str, degrees: f64) -> fmt::Result {
    if degrees.is_nan() {
        writeln!(f, "{label} phase diff: n/a (no shared energy)")
    } else {
        writeln!(f, "{label} phase diff: {degrees:.2}°")
    }
}

impl fmt::Display for TripleVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_offset(f, "X → Y", self.x_to_y)?;
        write_offset(f, "Y → Z", self.y_to_z)?;
        write_offset(f, "Z → X", self.z_to_x)?;
        if self.is_valid() {
            write!(f, "triple structure VALID")
        } else {
            let pairs: Vec<String> = self.broken.iter().map(ToString::to_string).collect();
            write!(f, "triple structure BROKEN at {}", pairs.join(", "))
        }
    }
}

/// Validates mutual 120° offsets across three equal-length signals.
#[derive(Debug, Clone, Copy)]
pub struct PhaseTripleValidator {
    tolerance_deg: f64,
    energy_floor: f64,
}

impl Default for PhaseTripleValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTripleValidator {
    /// Validator with the default ±10° tolerance.
    pub fn new() -> Self {
        Self {
            tolerance_deg: DEFAULT_TOLERANCE_DEG,
            energy_floor: DEFAULT_ENERGY_FLOOR,
        }
    }

    /// Override the accepted deviation from 120°.
    pub fn with_tolerance(mut self, tolerance_deg: f64) -> Self {
        self.tolerance_deg = tolerance_deg;
        self
    }

    /// Override the relative energy a bin needs to take part in the measurement.
    pub fn with_energy_floor(mut self, fraction: f64) -> Self {
        self.energy_floor = fraction;
        self
    }

    /// Configured tolerance in degrees.
    pub fn tolerance_deg(&self) -> f64 {
        self.tolerance_deg
    }

    /// Measure the three offsets and report which steps broke symmetry.
    pub fn validate(&self, x: &[f64], y: &[f64], z: &[f64]) -> Result<TripleVerdict> {
        if x.len() != y.len() || y.len() != z.len() {
            return Err(AnalysisError::LengthMismatch {
                lengths: [x.len(), y.len(), z.len()],
            });
        }

        let fft = Fft::new(x.len());
        let measure = |a: &[f64], b: &[f64]| {
            phase_offset_with(&fft, a, b, self.energy_floor).map(|o| o.unwrap_or(f64::NAN))
        };
        let x_to_y = measure(x, y)?;
        let y_to_z = measure(y, z)?;
        let z_to_x = measure(x, z)?;

        let mut verdict = TripleVerdict {
            x_to_y,
            y_to_z,
            z_to_x,
            tolerance_deg: self.tolerance_deg,
            broken: Vec::new(),
        };
        for pair in [TriplePair::XToY, TriplePair::YToZ, TriplePair::ZToX] {
            // NaN means the pair shared no energy.
            let deviation = (verdict.step_degrees(pair) - TARGET_OFFSET_DEG).abs();
            if deviation.is_nan() || deviation > self.tolerance_deg {
                verdict.broken.push(pair);
            }
        }

        tracing::debug!(x_to_y, y_to_z, z_to_x, "phase triple offsets");
        if !verdict.is_valid() {
            for &pair in verdict.broken_pairs() {
                tracing::warn!(
                    pair = %pair,
                    degrees = verdict.step_degrees(pair),
                    tolerance = self.tolerance_deg,
                    "phase triple symmetry broken"
                );
            }
        }

        Ok(verdict)
    }

    /// Convenience wrapper returning only the boolean verdict.
    pub fn is_valid(&self, x: &[f64], y: &[f64], z: &[f64]) -> Result<bool> {
        self.validate(x, y, z).map(|v| v.is_valid())
    }
}

/// Average phase of `b` relative to `a` in degrees, reduced to [0, 360).
///
/// Uses the default energy floor; see [`PhaseTripleValidator::with_energy_floor`].
pub fn phase_offset_degrees(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(AnalysisError::LengthMismatch {
            lengths: [a.len(), b.len(), b.len()],
        });
    }
    phase_offset_with(&Fft::new(a.len()), a, b, DEFAULT_ENERGY_FLOOR)?
        .ok_or(AnalysisError::NoPhaseContent)
}

/// `None` when no positive bin carries energy in both signals.
fn phase_offset_with(fft: &Fft, a: &[f64], b: &[f64], energy_floor: f64) -> Result<Option<f64>> {
    if a.len() < 2 {
        return Err(AnalysisError::TooShort {
            len: a.len(),
            min: 2,
        });
    }
    check_finite(a)?;
    check_finite(b)?;

    let spec_a = fft.forward(a);
    let spec_b = fft.forward(b);
    let positive = 1..=(a.len() - 1) / 2;

    let strongest = positive
        .clone()
        .map(|k| spec_a[k].norm() * spec_b[k].norm())
        .fold(0.0f64, f64::max);
    if strongest <= 0.0 {
        return Ok(None);
    }

    let floor = strongest * energy_floor;
    let diffs: Vec<f64> = positive
        .filter(|&k| spec_a[k].norm() * spec_b[k].norm() >= floor)
        .map(|k| spec_b[k].arg() - spec_a[k].arg())
        .collect();

    let unwrapped = unwrap_phase(&diffs);
    let mean = unwrapped.iter().sum::<f64>() / unwrapped.len() as f64;
    Ok(Some(wrap_degrees(mean.to_degrees())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(freq: f64, phase: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / 44100.0 + phase).sin())
            .collect()
    }

    #[test]
    fn offset_of_shifted_tone() {
        let a = tone(440.0, 0.0, 4410);
        let b = tone(440.0, PI / 2.0, 4410);
        let offset = phase_offset_degrees(&a, &b).unwrap();
        assert!((offset - 90.0).abs() < 2.0, "offset {offset}");
    }

    #[test]
    fn symmetric_triple_is_valid() {
        let x = tone(333.0, 0.0, 4410);
        let y = tone(333.0, 2.0 * PI / 3.0, 4410);
        let z = tone(333.0, 4.0 * PI / 3.0, 4410);
        let verdict = PhaseTripleValidator::new().validate(&x, &y, &z).unwrap();
        assert!(verdict.is_valid(), "{verdict}");
    }

    #[test]
    fn perturbed_triple_names_broken_pairs() {
        let x = tone(333.0, 0.0, 4410);
        let y = tone(333.0, 2.0 * PI / 3.0, 4410);
        let z = tone(333.0, 4.0 * PI / 3.0 + 30f64.to_radians(), 4410);
        let verdict = PhaseTripleValidator::new().validate(&x, &y, &z).unwrap();
        assert!(!verdict.is_valid());
        assert!(verdict.broken_pairs().contains(&TriplePair::YToZ));
        assert!(verdict.broken_pairs().contains(&TriplePair::ZToX));
        assert!(!verdict.broken_pairs().contains(&TriplePair::XToY));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = PhaseTripleValidator::new()
            .validate(&[0.0; 10], &[0.0; 10], &[0.0; 9])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::LengthMismatch { .. }));
    }

    #[test]
    fn silent_member_breaks_symmetry_instead_of_failing() {
        let x = tone(333.0, 0.0, 4000);
        let y = tone(333.0, 2.0 * PI / 3.0, 4000);
        let z = vec![0.0; 4000];
        let verdict = PhaseTripleValidator::new().validate(&x, &y, &z).unwrap();
        assert!(!verdict.is_valid());
        assert!(verdict.y_to_z.is_nan());
        assert!(verdict.z_to_x.is_nan());
        assert_eq!(verdict.broken_pairs(), &[TriplePair::YToZ, TriplePair::ZToX]);
        assert!(verdict.to_string().contains("n/a"));
    }

    #[test]
    fn silence_has_no_phase() {
        let err = phase_offset_degrees(&[0.0; 64], &[0.0; 64]).unwrap_err();
        assert!(matches!(err, AnalysisError::NoPhaseContent));
    }
}
