//! Phase triple validation command.

use clap::Args;
use std::path::PathBuf;
use triskel_core::{PhaseTriple, PhaseTripleValidator};
use triskel_io::read_waveform;

#[derive(Args)]
pub struct ValidateArgs {
    /// X member (0°)
    #[arg(value_name = "X")]
    x: PathBuf,

    /// Y member (120°)
    #[arg(value_name = "Y")]
    y: PathBuf,

    /// Z member (240°)
    #[arg(value_name = "Z")]
    z: PathBuf,

    /// Accepted deviation from 120° in degrees
    #[arg(long, default_value = "10.0")]
    tolerance: f64,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let triple = PhaseTriple::new(
        read_waveform(&args.x)?,
        read_waveform(&args.y)?,
        read_waveform(&args.z)?,
    )?;
    let validator = PhaseTripleValidator::new().with_tolerance(args.tolerance);

    println!("Validating phase triple (tolerance ±{:.1}°)...", args.tolerance);
    let verdict = triple.validate(&validator)?;
    println!("{verdict}");

    if !verdict.is_valid() {
        anyhow::bail!("Phase triple failed validation");
    }
    Ok(())
}
