//! Obfuscation and deobfuscation of WAV files.

use super::common::load_settings;
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};
use triskel_config::ObfuscationPolicy;
use triskel_core::SpectralObfuscator;
use triskel_io::{WavSpec, load_waveform, write_waveform};

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    /// Additive keyed Gaussian noise
    Noise,
    /// Block-wise spectral phase scrambling
    Smear,
}

impl From<Policy> for ObfuscationPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Noise => ObfuscationPolicy::Noise,
            Policy::Smear => ObfuscationPolicy::Smear,
        }
    }
}

#[derive(Args)]
pub struct ObfuscateArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Policy (defaults to the configured policy)
    #[arg(long, value_enum)]
    policy: Option<Policy>,

    /// Smear seed (overrides the configured seed and noise key)
    #[arg(long)]
    seed: Option<u64>,
}

pub fn run(args: ObfuscateArgs, config: Option<&Path>, reverse: bool) -> anyhow::Result<()> {
    let mut settings = load_settings(config)?;
    if args.seed.is_some() {
        settings.obfuscation.seed = args.seed;
    }
    let policy = args
        .policy
        .map(ObfuscationPolicy::from)
        .unwrap_or(settings.obfuscation.policy);

    let obfuscator: Box<dyn SpectralObfuscator> = match policy {
        ObfuscationPolicy::None => anyhow::bail!(
            "Obfuscation policy is 'none'; pass --policy noise or --policy smear"
        ),
        ObfuscationPolicy::Noise => Box::new(settings.noise_mask()?),
        ObfuscationPolicy::Smear => {
            let keyed =
                settings.obfuscation.seed.is_some() || settings.secrets.noise_key.is_some();
            if !keyed && reverse {
                anyhow::bail!(
                    "Smear deobfuscation needs --seed, [obfuscation] seed or a noise key"
                );
            }
            let scrambler = settings.smear_scrambler();
            if !keyed {
                println!("Smear seed: {} (needed to deobfuscate)", scrambler.seed());
            }
            Box::new(scrambler)
        }
    };

    let input = load_waveform(&args.input, settings.signal.sample_rate)?;
    let (verb, output) = if reverse {
        ("Deobfuscated", obfuscator.unmask(&input)?)
    } else {
        ("Obfuscated", obfuscator.mask(&input)?)
    };
    write_waveform(&args.output, &output, WavSpec::default())?;

    println!(
        "{verb} {} with {} -> {}",
        args.input.display(),
        obfuscator.name(),
        args.output.display()
    );
    Ok(())
}
