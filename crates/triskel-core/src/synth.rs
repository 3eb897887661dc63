//! Additive synthesis of harmonic vectors into waveforms.

use crate::error::{Error, Result, check_frequency};
use crate::harmonic::HarmonicVector;
use crate::waveform::{PhaseTriple, Waveform};
use std::f64::consts::PI;

/// Phase shifts of the X, Y and Z members of a triple.
pub const TRIPLE_SHIFTS: [f64; 3] = [0.0, 2.0 * PI / 3.0, 4.0 * PI / 3.0];

/// Sums sines at `base_freq * m` with per-multiplier phase offsets.
///
/// Each partial carries an extra `π * (m mod 3)` phase, so multiples of
/// three stay in phase with the fundamental grid and the rest are flipped
/// or doubled around it.
#[derive(Debug, Clone, Copy)]
pub struct WaveformSynthesizer {
    sample_rate: u32,
    duration_secs: f64,
}

impl WaveformSynthesizer {
    /// Synthesizer producing `duration_secs` of audio at `sample_rate`.
    pub fn new(sample_rate: u32, duration_secs: f64) -> Self {
        Self {
            sample_rate,
            duration_secs,
        }
    }

    /// Output sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Output duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Number of samples per waveform.
    pub fn sample_count(&self) -> usize {
        (f64::from(self.sample_rate) * self.duration_secs).floor() as usize
    }

    /// Render `vector` at `base_freq`, peak-normalized.
    pub fn synthesize(
        &self,
        vector: &HarmonicVector,
        base_freq: f64,
        phase_shift: f64,
    ) -> Result<Waveform> {
        check_frequency("base_freq", base_freq)?;
        if !(self.duration_secs.is_finite() && self.duration_secs >= 0.0) {
            return Err(Error::invalid_input(format!(
                "duration must be finite and non-negative, got {}",
                self.duration_secs
            )));
        }
        if !phase_shift.is_finite() {
            return Err(Error::invalid_input("phase shift must be finite"));
        }

        let n = self.sample_count();
        let step = if n > 0 { self.duration_secs / n as f64 } else { 0.0 };
        let partials: Vec<(f64, f64, f64)> = vector
            .iter()
            .map(|(m, amplitude)| {
                let offset = PI * f64::from(m.rem_euclid(3));
                (2.0 * PI * base_freq * f64::from(m), amplitude, phase_shift + offset)
            })
            .collect();

        let samples = (0..n)
            .map(|i| {
                let t = i as f64 * step;
                partials
                    .iter()
                    .map(|&(omega, amplitude, phase)| amplitude * (omega * t + phase).sin())
                    .sum()
            })
            .collect();

        Ok(Waveform::new(samples, self.sample_rate)?.normalized())
    }

    /// Render the 0°, 120° and 240° members of a phase triple.
    pub fn synthesize_triple(
        &self,
        vector: &HarmonicVector,
        base_freq: f64,
    ) -> Result<PhaseTriple> {
        let [x, y, z] = TRIPLE_SHIFTS;
        PhaseTriple::new(
            self.synthesize(vector, base_freq, x)?,
            self.synthesize(vector, base_freq, y)?,
            self.synthesize(vector, base_freq, z)?,
        )
    }
}
