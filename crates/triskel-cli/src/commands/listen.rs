//! Feedback lock listening command.

use super::common::{feedback_source, load_settings, print_lock_report, spinner};
use clap::Args;
use std::path::{Path, PathBuf};
use triskel_core::{FeedbackMonitor, ResonanceSensor};
use triskel_io::ResonanceDecoder;

#[derive(Args)]
pub struct ListenArgs {
    /// Replay this WAV file instead of recording
    #[arg(long, value_name = "WAV")]
    feedback: Option<PathBuf>,

    /// Input device (index or name)
    #[arg(short, long)]
    input_device: Option<String>,

    /// Listen duration in seconds (defaults to [lock] listen_secs)
    #[arg(long)]
    duration: Option<f64>,

    /// Base frequency (defaults to the configured base)
    #[arg(long)]
    base_freq: Option<f64>,

    /// Also read the resonance sensor
    #[arg(long)]
    sensor: bool,
}

pub fn run(args: ListenArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let base_freq = args.base_freq.unwrap_or(settings.signal.base_freq);

    let mut monitor_config = settings.monitor_config();
    if let Some(secs) = args.duration {
        monitor_config.duration_secs = secs;
    }
    let mut monitor = FeedbackMonitor::new(monitor_config)?;
    let mut capture = feedback_source(
        args.feedback.as_deref(),
        args.input_device.as_deref(),
        settings.signal.sample_rate,
    )?;

    let pb = spinner(&format!(
        "listening for {:.1}s at {:.1} Hz",
        monitor.config().duration_secs,
        base_freq
    ))?;
    let report = monitor.listen(&mut capture, base_freq);
    pb.finish_and_clear();
    let report = report?;
    print_lock_report(&report);

    if args.sensor {
        let mut decoder = ResonanceDecoder::new();
        let field = decoder.read_lock();
        let source = if decoder.has_hardware() {
            "hardware"
        } else {
            "simulated"
        };
        println!("\nResonance sensor ({source}):");
        println!("  field lock: {}", if field { "yes" } else { "no" });
        match decoder.read_voltage() {
            Some(volts) => println!("  level: {volts:.3} V"),
            None => println!("  level: n/a"),
        }
    }

    if !report.is_locked() {
        anyhow::bail!("No feedback lock: {} harmonic(s) missing", report.failures().count());
    }
    Ok(())
}
