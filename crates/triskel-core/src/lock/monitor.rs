//! Feedback lock: listen for 3-6-9 harmonics before transmitting.

use crate::error::{Error, Result, check_frequency};
use crate::hardware::FeedbackCapture;
use crate::harmonic::{CANONICAL_HARMONICS, Multiplier};
use crate::waveform::DEFAULT_SAMPLE_RATE;
use std::fmt;
use triskel_analysis::SpectralAnalyzer;

/// Default minimum amplitude each harmonic must reach.
pub const DEFAULT_LOCK_THRESHOLD: f64 = 0.3;

/// Where a monitor is in its lock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockState {
    /// Waiting for (or capturing) feedback.
    Listening,
    /// Every target harmonic reached the threshold.
    Locked,
    /// At least one target harmonic fell short.
    Rejected,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockState::Listening => write!(f, "listening"),
            LockState::Locked => write!(f, "locked"),
            LockState::Rejected => write!(f, "rejected"),
        }
    }
}

/// Measured amplitude for one target harmonic.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicReading {
    /// Target multiplier.
    pub multiplier: Multiplier,
    /// `base_freq * multiplier`.
    pub frequency_hz: f64,
    /// Amplitude estimate at the nearest bin.
    pub amplitude: f64,
    /// Whether the amplitude reached the threshold.
    pub passed: bool,
}

/// Outcome of one lock check.
#[derive(Debug, Clone, PartialEq)]
pub struct LockReport {
    /// Base frequency the harmonics were read against.
    pub base_freq: f64,
    /// Threshold applied to each reading.
    pub threshold: f64,
    /// One reading per target multiplier, in target order.
    pub readings: Vec<HarmonicReading>,
}

impl LockReport {
    /// True when every reading passed.
    pub fn is_locked(&self) -> bool {
        !self.readings.is_empty() && self.readings.iter().all(|r| r.passed)
    }

    /// Terminal state this report puts a monitor in.
    pub fn state(&self) -> LockState {
        if self.is_locked() {
            LockState::Locked
        } else {
            LockState::Rejected
        }
    }

    /// Readings that fell short.
    pub fn failures(&self) -> impl Iterator<Item = &HarmonicReading> {
        self.readings.iter().filter(|r| !r.passed)
    }
}

/// Capture and detection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Capture sample rate in Hz.
    pub sample_rate: u32,
    /// Listening window in seconds.
    pub duration_secs: f64,
    /// Harmonics that must all be present.
    pub targets: Vec<Multiplier>,
    /// Minimum amplitude per harmonic.
    pub threshold: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration_secs: 1.0,
            targets: CANONICAL_HARMONICS.to_vec(),
            threshold: DEFAULT_LOCK_THRESHOLD,
        }
    }
}

/// Listens for harmonic feedback and decides whether to lock.
///
/// Starts in [`LockState::Listening`]. Each [`listen`](Self::listen) ends in
/// `Locked` or `Rejected`; the next call starts a fresh attempt.
#[derive(Debug, Clone)]
pub struct FeedbackMonitor {
    config: MonitorConfig,
    analyzer: SpectralAnalyzer,
    state: LockState,
}

impl FeedbackMonitor {
    /// Monitor for `config`.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        if config.sample_rate == 0 {
            return Err(Error::invalid_input("monitor sample rate must be non-zero"));
        }
        if !(config.duration_secs.is_finite() && config.duration_secs > 0.0) {
            return Err(Error::invalid_input(format!(
                "listen duration must be finite and positive, got {}",
                config.duration_secs
            )));
        }
        if !(config.threshold.is_finite() && config.threshold >= 0.0) {
            return Err(Error::invalid_input(format!(
                "lock threshold must be finite and non-negative, got {}",
                config.threshold
            )));
        }
        if config.targets.is_empty() {
            return Err(Error::invalid_input("lock needs at least one target harmonic"));
        }
        Ok(Self {
            analyzer: SpectralAnalyzer::new(f64::from(config.sample_rate)),
            config,
            state: LockState::Listening,
        })
    }

    /// Current state.
    pub fn state(&self) -> LockState {
        self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Return to `Listening` without capturing.
    pub fn reset(&mut self) {
        self.state = LockState::Listening;
    }

    /// Capture one window of feedback and decide.
    ///
    /// A capture device reporting itself unavailable is treated as silence,
    /// which rejects the lock.
    pub fn listen<C: FeedbackCapture + ?Sized>(
        &mut self,
        capture: &mut C,
        base_freq: f64,
    ) -> Result<LockReport> {
        check_frequency("base_freq", base_freq)?;
        self.state = LockState::Listening;
        tracing::info!(
            base_freq,
            duration_secs = self.config.duration_secs,
            "listening for harmonic feedback"
        );

        let expected = (self.config.duration_secs * f64::from(self.config.sample_rate)) as usize;
        let samples = match capture.capture(self.config.duration_secs, self.config.sample_rate) {
            Ok(samples) => samples,
            Err(Error::HardwareUnavailable(reason)) => {
                tracing::warn!(%reason, "feedback capture unavailable, treating as silence");
                vec![0.0; expected.max(2)]
            }
            Err(e) => return Err(e),
        };

        let report = self.inspect(&samples, base_freq)?;
        self.state = report.state();
        match self.state {
            LockState::Locked => tracing::info!("feedback lock acquired"),
            _ => tracing::info!(
                missing = report.failures().count(),
                "feedback lock rejected"
            ),
        }
        Ok(report)
    }

    /// Read the target harmonics from `samples` without changing state.
    pub fn inspect(&self, samples: &[f64], base_freq: f64) -> Result<LockReport> {
        check_frequency("base_freq", base_freq)?;
        let spectrum = self.analyzer.analyze(samples)?;

        let readings = self
            .config
            .targets
            .iter()
            .map(|&m| {
                let frequency_hz = base_freq * f64::from(m);
                let amplitude = spectrum.amplitude_at(frequency_hz);
                let passed = amplitude >= self.config.threshold;
                tracing::debug!(
                    multiplier = m,
                    frequency_hz,
                    amplitude,
                    passed,
                    "harmonic reading"
                );
                HarmonicReading {
                    multiplier: m,
                    frequency_hz,
                    amplitude,
                    passed,
                }
            })
            .collect();

        Ok(LockReport {
            base_freq,
            threshold: self.config.threshold,
            readings,
        })
    }

    /// Same check as [`listen`](Self::listen) on a supplied signal.
    pub fn validate_with_signal(&self, samples: &[f64], base_freq: f64) -> Result<bool> {
        self.inspect(samples, base_freq).map(|r| r.is_locked())
    }
}
