//! Shared CLI helpers used across multiple commands.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use triskel_config::Settings;
use triskel_core::{FeedbackCapture, LockReport, Multiplier, NoCapture, ReplayCapture};
use triskel_io::{CpalCapture, load_waveform};

/// Resolve settings from `--config`, the user config file or defaults.
pub fn load_settings(config: Option<&Path>) -> anyhow::Result<Settings> {
    Ok(Settings::resolve(config)?)
}

/// Parse a `multiplier:amplitude` pair for clap's `value_parser`.
pub fn parse_harmonic(s: &str) -> Result<(Multiplier, f64), String> {
    let (m, a) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid harmonic '{s}' (expected multiplier:amplitude)"))?;
    let multiplier = m
        .trim()
        .parse::<Multiplier>()
        .map_err(|e| format!("Invalid multiplier '{m}': {e}"))?;
    let amplitude = a
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("Invalid amplitude '{a}': {e}"))?;
    Ok((multiplier, amplitude))
}

/// Spinner shown while blocking on playback or capture.
pub fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]")?);
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Feedback source: a replayed WAV file, or the given/default input device.
pub fn feedback_source(
    feedback: Option<&Path>,
    device: Option<&str>,
    sample_rate: u32,
) -> anyhow::Result<Box<dyn FeedbackCapture>> {
    Ok(match (feedback, device) {
        (Some(path), _) => Box::new(ReplayCapture::new(load_waveform(path, sample_rate)?)),
        (None, Some(name)) => Box::new(CpalCapture::new().with_device(name)),
        (None, None) => Box::new(CpalCapture::new()),
    })
}

/// Capture used when no lock is required.
pub fn no_feedback() -> Box<dyn FeedbackCapture> {
    Box::new(NoCapture)
}

/// Print per-harmonic readings of a lock check.
pub fn print_lock_report(report: &LockReport) {
    println!(
        "Feedback lock at {:.1} Hz (threshold {:.3}):",
        report.base_freq, report.threshold
    );
    for reading in &report.readings {
        println!(
            "  {:>2}x  {:>8.1} Hz  amplitude {:.4}  {}",
            reading.multiplier,
            reading.frequency_hz,
            reading.amplitude,
            if reading.passed { "ok" } else { "MISSING" }
        );
    }
    println!("  state: {}", report.state());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_harmonic_pairs() {
        assert_eq!(parse_harmonic("3:0.8"), Ok((3, 0.8)));
        assert_eq!(parse_harmonic(" 9 : 0.2 "), Ok((9, 0.2)));
        assert!(parse_harmonic("3=0.8").is_err());
        assert!(parse_harmonic("x:0.8").is_err());
        assert!(parse_harmonic("3:loud").is_err());
    }
}
