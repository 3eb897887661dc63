//! Signal generation command.

use super::common::{load_settings, parse_harmonic};
use clap::{Args, Subcommand};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use triskel_core::{HarmonicVector, Multiplier, Waveform};
use triskel_io::{WavSpec, write_waveform};

#[derive(Args)]
pub struct GenerateArgs {
    #[command(subcommand)]
    command: GenerateCommand,
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Synthesize a harmonic vector into a carrier
    Signal {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Harmonics as multiplier:amplitude (default: 1/m for each configured multiplier)
        #[arg(long, value_parser = parse_harmonic, value_delimiter = ',')]
        harmonics: Vec<(Multiplier, f64)>,

        /// Base frequency in Hz (defaults to the configured base)
        #[arg(long)]
        base_freq: Option<f64>,

        /// Common phase shift in degrees
        #[arg(long, default_value = "0.0")]
        phase: f64,

        /// Duration in seconds (defaults to the configured duration)
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Synthesize the 0°, 120° and 240° members of a phase triple
    Triple {
        /// Output WAV path; members are written as <stem>_x, <stem>_y and <stem>_z
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Harmonics as multiplier:amplitude
        #[arg(long, value_parser = parse_harmonic, value_delimiter = ',')]
        harmonics: Vec<(Multiplier, f64)>,

        /// Base frequency in Hz
        #[arg(long)]
        base_freq: Option<f64>,

        /// Duration in seconds
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Generate a sum of plain sine tones (test fixtures, feedback replays)
    Tone {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Frequency in Hz; repeat or comma-separate for several partials
        #[arg(long, value_delimiter = ',', default_values_t = [440.0])]
        freq: Vec<f64>,

        /// Amplitude of each partial
        #[arg(long, default_value = "0.5")]
        amplitude: f64,

        /// Duration in seconds
        #[arg(long, default_value = "1.0")]
        duration: f64,

        /// Sample rate (defaults to the configured rate)
        #[arg(long)]
        sample_rate: Option<u32>,
    },
}

fn vector_or_default(pairs: Vec<(Multiplier, f64)>, configured: &[Multiplier]) -> HarmonicVector {
    if pairs.is_empty() {
        HarmonicVector::reciprocal(configured.iter().copied())
    } else {
        HarmonicVector::from_pairs(pairs)
    }
}

/// `dir/stem.ext` to `dir/stem_<suffix>.ext`.
fn member_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "triple".to_owned());
    let ext = output
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wav".to_owned());
    output.with_file_name(format!("{stem}_{suffix}.{ext}"))
}

pub fn run(args: GenerateArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let mut settings = load_settings(config)?;

    match args.command {
        GenerateCommand::Signal {
            output,
            harmonics,
            base_freq,
            phase,
            duration,
        } => {
            if let Some(d) = duration {
                settings.signal.duration = d;
            }
            let base = base_freq.unwrap_or(settings.signal.base_freq);
            let vector = vector_or_default(harmonics, &settings.signal.harmonics);

            println!("Synthesizing {vector} at {base:.1} Hz...");
            let waveform = settings
                .synthesizer()
                .synthesize(&vector, base, phase.to_radians())?;
            write_waveform(&output, &waveform, WavSpec::default())?;
            println!(
                "Wrote {} ({:.2}s) to {}",
                waveform.len(),
                waveform.duration_secs(),
                output.display()
            );
        }

        GenerateCommand::Triple {
            output,
            harmonics,
            base_freq,
            duration,
        } => {
            if let Some(d) = duration {
                settings.signal.duration = d;
            }
            let base = base_freq.unwrap_or(settings.signal.base_freq);
            let vector = vector_or_default(harmonics, &settings.signal.harmonics);

            println!("Synthesizing phase triple of {vector} at {base:.1} Hz...");
            let triple = settings.synthesizer().synthesize_triple(&vector, base)?;
            for (member, suffix) in triple.members().into_iter().zip(["x", "y", "z"]) {
                let path = member_path(&output, suffix);
                write_waveform(&path, member, WavSpec::default())?;
                println!("  {} -> {}", suffix.to_uppercase(), path.display());
            }
        }

        GenerateCommand::Tone {
            output,
            freq,
            amplitude,
            duration,
            sample_rate,
        } => {
            let rate = sample_rate.unwrap_or(settings.signal.sample_rate);
            let n = (duration * f64::from(rate)) as usize;
            let sr = f64::from(rate);
            let samples = (0..n)
                .map(|i| {
                    let t = i as f64 / sr;
                    freq.iter()
                        .map(|f| amplitude * (2.0 * PI * f * t).sin())
                        .sum()
                })
                .collect();
            let waveform = Waveform::new(samples, rate)?;
            write_waveform(&output, &waveform, WavSpec::default())?;
            println!(
                "Wrote {} partial(s) at {:?} Hz, {:.2}s to {}",
                freq.len(),
                freq,
                duration,
                output.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_paths_keep_directory_and_extension() {
        let base = Path::new("/tmp/out/carrier.wav");
        assert_eq!(member_path(base, "y"), PathBuf::from("/tmp/out/carrier_y.wav"));
    }

    #[test]
    fn default_vector_is_reciprocal() {
        let v = vector_or_default(Vec::new(), &[3, 6, 9]);
        assert_eq!(v.multipliers(), vec![3, 6, 9]);
        assert!((v.get(3).unwrap() - 1.0 / 3.0).abs() < 1e-12);
    }
}
