//! Harmonic signature extraction command.

use super::common::load_settings;
use clap::Args;
use std::path::{Path, PathBuf};
use triskel_io::load_waveform;

#[derive(Args)]
pub struct EncodeArgs {
    /// Input WAV file (must match the configured sample rate)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Also show the keyed form (needs an encryption key)
    #[arg(long)]
    encrypt: bool,

    /// Base frequency for the keyed form (defaults to the configured base)
    #[arg(long)]
    base_freq: Option<f64>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: EncodeArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let waveform = load_waveform(&args.input, settings.signal.sample_rate)?;
    let signature = settings.codec().analyze(&waveform)?;

    let base_freq = args.base_freq.unwrap_or(settings.signal.base_freq);
    let encrypted = if args.encrypt {
        Some(settings.cipher()?.encrypt(&signature.vector, base_freq)?)
    } else {
        None
    };

    if args.json {
        let harmonics: Vec<_> = signature
            .vector
            .iter()
            .map(|(m, a)| serde_json::json!({ "multiplier": m, "amplitude": a }))
            .collect();
        let mut report = serde_json::json!({
            "input": args.input.display().to_string(),
            "sample_rate": waveform.sample_rate(),
            "fundamental_hz": signature.fundamental_hz,
            "harmonics": harmonics,
        });
        if let Some(permuted) = &encrypted {
            let pairs: Vec<_> = permuted
                .iter()
                .map(|(f, a)| serde_json::json!({ "frequency_hz": f, "amplitude": a }))
                .collect();
            report["encrypted"] = serde_json::json!({
                "base_freq": permuted.base_freq(),
                "pairs": pairs,
            });
        }
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Encoding {}...", args.input.display());
    println!(
        "  {} samples, {} Hz, {:.2}s",
        waveform.len(),
        waveform.sample_rate(),
        waveform.duration_secs()
    );
    println!("\nFundamental: {:.1} Hz", signature.fundamental_hz);
    println!("  {:>4}  {:>12}", "Mult", "Magnitude");
    for (m, a) in signature.vector.iter() {
        println!("  {:>3}x  {:>12.4}", m, a);
    }

    if let Some(permuted) = encrypted {
        println!("\nKeyed form at {:.1} Hz:", permuted.base_freq());
        println!("  {:>12}  {:>12}", "Freq (Hz)", "Magnitude");
        for (f, a) in permuted.iter() {
            println!("  {:>12.2}  {:>12.4}", f, a);
        }
    }

    Ok(())
}
