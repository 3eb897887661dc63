//! Windowed magnitude spectra restricted to positive frequencies.
//!
//! [`SpectralAnalyzer`] is the single feature-extraction step shared by the
//! harmonic codec and the feedback lock monitor: window the samples, take the
//! FFT magnitude, and keep only the bins above 0 Hz.
//!
//! For `n` samples the positive bins are `k = 1 ..= (n - 1) / 2` at
//! `k * sample_rate / n` Hz. For even `n` the Nyquist bin is treated as a
//! negative frequency and dropped, so the highest bin always sits strictly
//! below Nyquist.

use crate::fft::{Fft, Window};
use crate::{AnalysisError, Result};

/// Paired frequency and magnitude arrays for the positive half of a spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    frequencies: Vec<f64>,
    magnitudes: Vec<f64>,
    window_sum: f64,
}

impl Spectrum {
    /// Bin center frequencies in Hz, ascending.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Unnormalized FFT magnitudes, one per frequency.
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    /// Number of positive-frequency bins.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether the spectrum holds no bins (single-sample input).
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Iterate `(frequency, magnitude)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies
            .iter()
            .copied()
            .zip(self.magnitudes.iter().copied())
    }

    /// Index of the bin whose frequency is closest to `freq`.
    ///
    /// Ties resolve to the lower bin. Targets above the highest bin resolve to
    /// the highest bin. Returns `None` only for an empty spectrum.
    pub fn nearest_bin(&self, freq: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &f) in self.frequencies.iter().enumerate() {
            let distance = (f - freq).abs();
            match best {
                Some((_, d)) if distance >= d => {}
                _ => best = Some((i, distance)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Magnitude of the bin nearest `freq`, or 0 for an empty spectrum.
    pub fn magnitude_at(&self, freq: f64) -> f64 {
        self.nearest_bin(freq)
            .map(|i| self.magnitudes[i])
            .unwrap_or(0.0)
    }

    /// Sinusoid amplitude estimate at `freq`.
    ///
    /// Converts the raw magnitude with the window's coherent gain
    /// (`2 * |X| / sum(w)`), so a bin-centered sine of amplitude `a` reads `a`.
    pub fn amplitude_at(&self, freq: f64) -> f64 {
        if self.window_sum <= 0.0 {
            return 0.0;
        }
        2.0 * self.magnitude_at(freq) / self.window_sum
    }

    /// Highest-magnitude bin strictly below `limit_hz`, as `(frequency, magnitude)`.
    ///
    /// The first bin wins when several share the maximum.
    pub fn peak_below(&self, limit_hz: f64) -> Option<(f64, f64)> {
        let mut peak: Option<(f64, f64)> = None;
        for (f, m) in self.iter().take_while(|&(f, _)| f < limit_hz) {
            match peak {
                Some((_, best)) if m <= best => {}
                _ => peak = Some((f, m)),
            }
        }
        peak
    }
}

/// Windowed FFT magnitude analyzer.
#[derive(Debug, Clone, Copy)]
pub struct SpectralAnalyzer {
    sample_rate: f64,
    window: Window,
}

impl SpectralAnalyzer {
    /// Create an analyzer with a Hann window.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            window: Window::Hann,
        }
    }

    /// Use a different window function.
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Configured sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Configured window function.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Compute the positive-frequency magnitude spectrum of `samples`.
    ///
    /// Fails on empty input or on any non-finite sample.
    pub fn analyze(&self, samples: &[f64]) -> Result<Spectrum> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        check_finite(samples)?;
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(AnalysisError::InvalidSampleRate(self.sample_rate));
        }

        let n = samples.len();
        let coefficients = self.window.coefficients(n);
        let windowed: Vec<f64> = samples
            .iter()
            .zip(coefficients.iter())
            .map(|(s, w)| s * w)
            .collect();

        let fft = Fft::new(n);
        let spectrum = fft.forward(&windowed);

        let bin_width = self.sample_rate / n as f64;
        let positive = (n - 1) / 2;
        let frequencies = (1..=positive).map(|k| k as f64 * bin_width).collect();
        let magnitudes = spectrum[1..=positive].iter().map(|c| c.norm()).collect();

        Ok(Spectrum {
            frequencies,
            magnitudes,
            window_sum: coefficients.iter().sum(),
        })
    }
}

/// Reject NaN and infinite samples, reporting the first offending index.
pub fn check_finite(samples: &[f64]) -> Result<()> {
    match samples.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(AnalysisError::NonFinite { index }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: f64, n: usize, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn empty_input_is_rejected() {
        let analyzer = SpectralAnalyzer::new(44100.0);
        assert!(matches!(analyzer.analyze(&[]), Err(AnalysisError::EmptyInput)));
    }

    #[test]
    fn non_finite_sample_is_rejected() {
        let analyzer = SpectralAnalyzer::new(44100.0);
        let err = analyzer.analyze(&[0.0, f64::NAN, 1.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::NonFinite { index: 1 }));
    }

    #[test]
    fn two_samples_give_empty_positive_half() {
        let analyzer = SpectralAnalyzer::new(8.0);
        let spectrum = analyzer.analyze(&[1.0, -1.0]).unwrap();
        // n = 2: only DC and Nyquist exist, neither is strictly positive
        assert!(spectrum.is_empty());
    }

    #[test]
    fn bins_exclude_dc_and_nyquist() {
        let analyzer = SpectralAnalyzer::new(8.0);
        let spectrum = analyzer.analyze(&[0.0; 8]).unwrap();
        assert_eq!(spectrum.frequencies(), &[1.0, 2.0, 3.0]);

        let odd = analyzer.analyze(&[0.0; 9]).unwrap();
        assert_eq!(odd.len(), 4);
        assert!(odd.frequencies().iter().all(|&f| f > 0.0 && f < 4.0));
    }

    #[test]
    fn peak_below_finds_tone() {
        let sr = 44100.0;
        let signal = sine(220.0, sr, 44100, 0.5);
        let spectrum = SpectralAnalyzer::new(sr).analyze(&signal).unwrap();
        let (freq, _) = spectrum.peak_below(1000.0).unwrap();
        assert!((freq - 220.0).abs() < 1.0, "peak at {freq}");
    }

    #[test]
    fn peak_below_respects_limit() {
        let sr = 44100.0;
        let mut signal = sine(2000.0, sr, 44100, 0.9);
        for (s, t) in signal.iter_mut().zip(sine(300.0, sr, 44100, 0.1)) {
            *s += t;
        }
        let spectrum = SpectralAnalyzer::new(sr).analyze(&signal).unwrap();
        let (freq, _) = spectrum.peak_below(1000.0).unwrap();
        assert!((freq - 300.0).abs() < 1.0);
    }

    #[test]
    fn nearest_bin_clamps_above_nyquist() {
        let spectrum = SpectralAnalyzer::new(1000.0).analyze(&[0.0; 100]).unwrap();
        let last = spectrum.len() - 1;
        assert_eq!(spectrum.nearest_bin(10_000.0), Some(last));
        assert_eq!(spectrum.nearest_bin(-5.0), Some(0));
    }

    #[test]
    fn amplitude_estimate_matches_bin_centered_sine() {
        let sr = 44100.0;
        let signal = sine(333.0, sr, 44100, 0.5);
        let spectrum = SpectralAnalyzer::new(sr).analyze(&signal).unwrap();
        let amplitude = spectrum.amplitude_at(333.0);
        assert!((amplitude - 0.5).abs() < 0.01, "amplitude {amplitude}");
    }
}
