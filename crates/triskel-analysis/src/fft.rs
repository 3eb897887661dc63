//! FFT wrapper with windowing functions

use rustfft::{FftPlanner, num_complex::Complex};
use std::f64::consts::PI;
use std::sync::Arc;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine), symmetric form
    #[default]
    Hann,
    /// Hamming window
    Hamming,
    /// Blackman window
    Blackman,
}

impl Window {
    /// Apply window to a buffer.
    ///
    /// Uses the symmetric definition (denominator `n - 1`), so both edges of a
    /// Hann window are exactly zero. A single-sample buffer is left untouched.
    pub fn apply(&self, buffer: &mut [f64]) {
        let n = buffer.len();
        if n < 2 {
            return;
        }
        let denom = (n - 1) as f64;
        match self {
            Window::Rectangular => {}
            Window::Hann => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos());
                    *sample *= w;
                }
            }
            Window::Hamming => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos();
                    *sample *= w;
                }
            }
            Window::Blackman => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let x = 2.0 * PI * i as f64 / denom;
                    let w = 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos();
                    *sample *= w;
                }
            }
        }
    }

    /// Get window coefficients
    pub fn coefficients(&self, size: usize) -> Vec<f64> {
        let mut coeffs = vec![1.0; size];
        self.apply(&mut coeffs);
        coeffs
    }
}

/// FFT processor with cached forward and inverse plans.
///
/// Works on full complex spectra: the obfuscation and phase-validation stages
/// need both halves of the spectrum, not only the positive frequencies.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f64>>,
    ifft: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Self {
            fft,
            ifft,
            size,
        }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward FFT of a real signal.
    ///
    /// Input is zero-padded or truncated to the FFT size. Returns all `size`
    /// bins, negative frequencies included.
    pub fn forward(&self, input: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> = input.iter().map(|&x| Complex::new(x, 0.0)).collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);
        buffer
    }

    /// Inverse FFT of a full spectrum, keeping only the real part.
    ///
    /// The spectrum does not have to be conjugate-symmetric; any imaginary
    /// residue in the time domain is discarded.
    pub fn inverse_real(&self, spectrum: &[Complex<f64>]) -> Vec<f64> {
        let mut buffer = spectrum.to_vec();
        buffer.resize(self.size, Complex::new(0.0, 0.0));
        self.inverse_complex(&mut buffer);
        buffer.iter().map(|c| c.re).collect()
    }

    /// Perform inverse FFT on complex buffer (in-place)
    pub fn inverse_complex(&self, buffer: &mut [Complex<f64>]) {
        self.ifft.process(buffer);

        // Normalize
        let scale = 1.0 / self.size as f64;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft_roundtrip() {
        let fft = Fft::new(256);

        let input: Vec<f64> = (0..256)
            .map(|i| (2.0 * PI * 10.0 * i as f64 / 256.0).sin())
            .collect();

        let spectrum = fft.forward(&input);
        let reconstructed = fft.inverse_real(&spectrum);

        for (a, b) in input.iter().zip(reconstructed.iter()) {
            assert!((a - b).abs() < 1e-9, "Mismatch: {} vs {}", a, b);
        }
    }

    #[test]
    fn test_non_power_of_two_roundtrip() {
        let fft = Fft::new(4410);
        let input: Vec<f64> = (0..4410).map(|i| ((i * 7) % 13) as f64 / 13.0 - 0.5).collect();
        let back = fft.inverse_real(&fft.forward(&input));
        for (a, b) in input.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_window_hann() {
        let mut buffer = vec![1.0; 101];
        Window::Hann.apply(&mut buffer);

        // Symmetric Hann: exactly 0 at both edges, 1 at the center
        assert!(buffer[0].abs() < 1e-12);
        assert!(buffer[100].abs() < 1e-12);
        assert!((buffer[50] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_single_sample_untouched() {
        let mut buffer = vec![0.7];
        Window::Hann.apply(&mut buffer);
        assert_eq!(buffer, vec![0.7]);
    }

    #[test]
    fn test_dc_detection() {
        let fft = Fft::new(256);

        let input = vec![1.0; 256];
        let spectrum = fft.forward(&input);

        let dc_mag = spectrum[0].norm();
        let other_mag: f64 = spectrum[1..].iter().map(|c| c.norm()).sum();

        assert!(dc_mag > other_mag * 10.0);
    }
}
