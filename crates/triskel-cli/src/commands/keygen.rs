//! Lock key command.

use super::common::load_settings;
use clap::Args;
use std::path::Path;
use triskel_core::lock::harmonic_seed;
use triskel_core::{Clock, SystemClock};

#[derive(Args)]
pub struct KeygenArgs {
    /// Check this key against the current window instead of printing one
    #[arg(long, value_name = "KEY")]
    verify: Option<String>,

    /// Use this Unix time (seconds) instead of the system clock
    #[arg(long, value_name = "SECS")]
    at: Option<f64>,
}

pub fn run(args: KeygenArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let generator = settings.key_generator()?;
    let now = args.at.unwrap_or_else(|| SystemClock.now());
    let aligned = generator.align(now);

    if let Some(candidate) = args.verify {
        if generator.verify_at(candidate.trim(), now) {
            println!("Key valid for window starting at {aligned}");
            return Ok(());
        }
        anyhow::bail!("Key does not match the window starting at {aligned}");
    }

    println!("Window start: {aligned} (window {}s)", generator.window_secs());
    println!("Harmonic seed: {}", harmonic_seed(aligned));
    println!("Key: {}", generator.key_for(now));
    Ok(())
}
