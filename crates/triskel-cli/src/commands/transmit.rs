//! Full transmission pipeline command.

use super::common::{feedback_source, load_settings, no_feedback, print_lock_report, spinner};
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Duration;
use triskel_core::{Emitter, TransmissionOutcome, TransmissionPipeline};
use triskel_io::{CpalEmitter, WavEmitter, load_waveform};

#[derive(Args)]
pub struct TransmitArgs {
    /// Input WAV file whose harmonics are transmitted
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Write the carrier to a WAV file instead of playing it
    #[arg(long, value_name = "OUTPUT")]
    dry_run: Option<PathBuf>,

    /// Skip the obfuscation stage
    #[arg(long)]
    insecure: bool,

    /// Emit without waiting for a feedback lock
    #[arg(long)]
    no_lock: bool,

    /// Replay this WAV file as feedback instead of recording
    #[arg(long, value_name = "WAV")]
    feedback: Option<PathBuf>,

    /// Base frequency (defaults to the configured base)
    #[arg(long)]
    base_freq: Option<f64>,

    /// Output device (index or name)
    #[arg(short, long)]
    output: Option<String>,

    /// Input device for feedback (index or name)
    #[arg(short, long)]
    input_device: Option<String>,

    /// Play the carrier this many times after the lock (device output only)
    #[arg(long, default_value = "1")]
    repeat: usize,

    /// Pause between repetitions in seconds
    #[arg(long, default_value = "1.0")]
    delay: f64,
}

/// Pause between repeated emissions. Negative values mean no pause.
fn repeat_delay(secs: f64) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(secs.max(0.0))
        .map_err(|e| anyhow::anyhow!("Invalid --delay {secs}: {e}"))
}

pub fn run(args: TransmitArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let rate = settings.signal.sample_rate;
    let base_freq = args.base_freq.unwrap_or(settings.signal.base_freq);
    let secure = !args.insecure;

    let mut options = settings.transmit_options(secure);
    if args.no_lock {
        options.require_lock = false;
    }

    let delay = repeat_delay(args.delay)?;
    let input = load_waveform(&args.input, rate)?;

    let emitter: Box<dyn Emitter> = match &args.dry_run {
        Some(path) => Box::new(WavEmitter::new(path)),
        None => {
            let mut emitter = CpalEmitter::new();
            if let Some(name) = &args.output {
                emitter = emitter.with_device(name);
            }
            Box::new(emitter)
        }
    };
    let capture = if options.require_lock {
        feedback_source(args.feedback.as_deref(), args.input_device.as_deref(), rate)?
    } else {
        no_feedback()
    };

    let mut pipeline =
        TransmissionPipeline::new(base_freq, settings.pipeline_stages(secure)?, emitter, capture)?;

    println!("Transmitting {}...", args.input.display());
    println!(
        "  base {:.1} Hz, {} mode, lock {}",
        base_freq,
        if secure { "secure" } else { "insecure" },
        if options.require_lock { "required" } else { "skipped" }
    );

    let pb = spinner(if options.require_lock {
        "listening for feedback, then emitting"
    } else {
        "emitting"
    })?;
    let outcome = pipeline.transmit(&input, options);
    pb.finish_and_clear();
    let outcome = outcome?;

    let transmission = outcome.transmission();
    println!("\nFundamental: {:.1} Hz", transmission.signature.fundamental_hz);
    println!("Carrier: {}", transmission.carrier);
    println!("Obfuscation: {}", transmission.obfuscation.unwrap_or("none"));
    if let Some(report) = &transmission.lock {
        print_lock_report(report);
    }

    match outcome {
        TransmissionOutcome::Aborted(_) => {
            anyhow::bail!("Transmission aborted: feedback lock rejected")
        }
        TransmissionOutcome::Emitted(t) => {
            match &args.dry_run {
                Some(path) => println!("\nWrote carrier to {}", path.display()),
                None => {
                    if args.repeat > 1 {
                        let mut emitter = CpalEmitter::new();
                        if let Some(name) = &args.output {
                            emitter = emitter.with_device(name);
                        }
                        let pb = spinner("repeating emission")?;
                        std::thread::sleep(delay);
                        let result = emitter.emit_loop(&t.waveform, args.repeat - 1, delay);
                        pb.finish_and_clear();
                        result?;
                    }
                    println!("\nEmitted {} time(s)", args.repeat.max(1));
                }
            }
            Ok(())
        }
    }
}
