//! Hardware seams.
//!
//! The core never talks to devices directly. Playback, feedback capture and
//! the resonance sensor are traits so that audio backends, file sinks and
//! test doubles can be swapped in.

use crate::error::{Error, Result};
use crate::waveform::Waveform;

/// Plays (or otherwise sinks) a finished waveform.
pub trait Emitter {
    /// Emit `waveform`, blocking until it has been fully played.
    fn emit(&mut self, waveform: &Waveform) -> Result<()>;
}

/// Records mono feedback samples.
pub trait FeedbackCapture {
    /// Record `duration_secs` at `sample_rate`, blocking for the window.
    ///
    /// Implementations report a missing or failed device as
    /// [`Error::HardwareUnavailable`].
    fn capture(&mut self, duration_secs: f64, sample_rate: u32) -> Result<Vec<f64>>;
}

/// Physical resonance lock indicator.
pub trait ResonanceSensor {
    /// Whether the resonance line reads as locked.
    fn read_lock(&mut self) -> bool;

    /// Analog level in volts, if the sensor has one.
    fn read_voltage(&mut self) -> Option<f64>;
}

impl<T: Emitter + ?Sized> Emitter for Box<T> {
    fn emit(&mut self, waveform: &Waveform) -> Result<()> {
        (**self).emit(waveform)
    }
}

impl<T: FeedbackCapture + ?Sized> FeedbackCapture for Box<T> {
    fn capture(&mut self, duration_secs: f64, sample_rate: u32) -> Result<Vec<f64>> {
        (**self).capture(duration_secs, sample_rate)
    }
}

/// Replays a fixed signal as captured feedback.
///
/// The signal is truncated or zero-padded to the requested length.
#[derive(Debug, Clone)]
pub struct ReplayCapture {
    signal: Waveform,
}

impl ReplayCapture {
    /// Replay `signal`.
    pub fn new(signal: Waveform) -> Self {
        Self { signal }
    }
}

impl FeedbackCapture for ReplayCapture {
    fn capture(&mut self, duration_secs: f64, sample_rate: u32) -> Result<Vec<f64>> {
        if self.signal.sample_rate() != sample_rate {
            return Err(Error::precondition(format!(
                "replayed signal is {} Hz, capture requested {} Hz",
                self.signal.sample_rate(),
                sample_rate
            )));
        }
        let len = (duration_secs * f64::from(sample_rate)) as usize;
        let mut samples: Vec<f64> = self.signal.samples().iter().take(len).copied().collect();
        samples.resize(len, 0.0);
        Ok(samples)
    }
}

/// Capture that never has a device.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl FeedbackCapture for NoCapture {
    fn capture(&mut self, _duration_secs: f64, _sample_rate: u32) -> Result<Vec<f64>> {
        Err(Error::hardware("no feedback capture device configured"))
    }
}
