//! Phase unwrapping utilities.
//!
//! Phase values from an FFT are wrapped to [-π, π]. These utilities
//! reconstruct the continuous (unwrapped) phase by detecting and correcting 2π
//! discontinuities between consecutive values.

use std::f64::consts::PI;

/// Standard phase unwrapping with π tolerance.
///
/// Detects phase jumps exceeding π between consecutive samples and applies
/// cumulative 2π corrections to produce a continuous phase curve.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    unwrap_phase_tol(phase, PI)
}

/// Phase unwrapping with configurable tolerance.
///
/// Same as [`unwrap_phase`] but triggers correction when the phase difference
/// exceeds `tolerance` instead of the default π.
pub fn unwrap_phase_tol(phase: &[f64], tolerance: f64) -> Vec<f64> {
    if phase.is_empty() {
        return Vec::new();
    }

    let mut unwrapped = Vec::with_capacity(phase.len());
    unwrapped.push(phase[0]);

    let two_pi = 2.0 * PI;
    let mut correction = 0.0f64;

    for i in 1..phase.len() {
        let diff = phase[i] - phase[i - 1];

        if diff > tolerance {
            correction -= two_pi;
        } else if diff < -tolerance {
            correction += two_pi;
        }

        unwrapped.push(phase[i] + correction);
    }

    unwrapped
}

/// Wrap a phase value into [-π, π].
pub fn wrap_to_pi(phase: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let wrapped = (phase + PI).rem_euclid(two_pi) - PI;
    // rem_euclid maps +π to -π; keep the original sign at the boundary
    if wrapped == -PI && phase > 0.0 { PI } else { wrapped }
}

/// Reduce an angle in degrees to [0, 360).
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_removes_jumps() {
        // A linear ramp wrapped into [-π, π]
        let ramp: Vec<f64> = (0..50).map(|i| i as f64 * 0.4).collect();
        let wrapped: Vec<f64> = ramp.iter().map(|&p| wrap_to_pi(p)).collect();
        let unwrapped = unwrap_phase(&wrapped);

        for (a, b) in ramp.iter().zip(unwrapped.iter()) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn unwrap_empty_is_empty() {
        assert!(unwrap_phase(&[]).is_empty());
    }

    #[test]
    fn wrap_to_pi_range() {
        for i in -100..100 {
            let p = i as f64 * 0.37;
            let w = wrap_to_pi(p);
            assert!((-PI..=PI).contains(&w));
            let turns = (p - w) / (2.0 * PI);
            assert!((turns - turns.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn wrap_degrees_range() {
        assert_eq!(wrap_degrees(-240.0), 120.0);
        assert_eq!(wrap_degrees(480.0), 120.0);
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert!(wrap_degrees(-1e-18) < 360.0);
    }
}
