//! Triskel CLI - encode, key, obfuscate and transmit harmonic signatures.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "triskel")]
#[command(author, version, about = "Triskel harmonic transmission CLI", long_about = None)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the harmonic signature of a WAV file
    Encode(commands::encode::EncodeArgs),

    /// Run the full pipeline and emit a carrier
    Transmit(commands::transmit::TransmitArgs),

    /// Print or verify the current lock key
    Keygen(commands::keygen::KeygenArgs),

    /// Synthesize signals, phase triples and test tones
    Generate(commands::generate::GenerateArgs),

    /// Check three WAV files for 120° phase symmetry
    Validate(commands::validate::ValidateArgs),

    /// Obfuscate a WAV file
    Obfuscate(commands::obfuscate::ObfuscateArgs),

    /// Undo obfuscation of a WAV file
    Deobfuscate(commands::obfuscate::ObfuscateArgs),

    /// Listen for harmonic feedback and report the lock state
    Listen(commands::listen::ListenArgs),

    /// List audio devices
    Devices(commands::devices::DevicesArgs),

    /// Show or create the settings file
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for --json output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Encode(args) => commands::encode::run(args, config),
        Commands::Transmit(args) => commands::transmit::run(args, config),
        Commands::Keygen(args) => commands::keygen::run(args, config),
        Commands::Generate(args) => commands::generate::run(args, config),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Obfuscate(args) => commands::obfuscate::run(args, config, false),
        Commands::Deobfuscate(args) => commands::obfuscate::run(args, config, true),
        Commands::Listen(args) => commands::listen::run(args, config),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Config(args) => commands::config::run(args, config),
    }
}
