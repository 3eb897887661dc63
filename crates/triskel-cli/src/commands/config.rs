//! Settings inspection and initialization command.

use super::common::load_settings;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use triskel_config::{Secrets, Settings, config_file, env_var_for};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective settings (secrets are never printed)
    Show,

    /// Write a default settings file
    Init {
        /// Destination (defaults to the user config file)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs, config: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let settings = load_settings(config)?;
            print!("{}", settings.to_toml()?);
            println!("\n# secrets");
            for (name, set) in secret_status(&settings.secrets) {
                println!(
                    "# {name}: {} ({})",
                    if set { "set" } else { "not set" },
                    env_var_for(name)
                );
            }
        }

        ConfigCommand::Init { path, force } => {
            let path = path.unwrap_or_else(config_file);
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            Settings::default().save(&path)?;
            println!("Wrote default settings to {}", path.display());
            println!("Set secrets via {}* environment variables.", triskel_config::ENV_PREFIX);
        }
    }
    Ok(())
}

fn secret_status(secrets: &Secrets) -> [(&'static str, bool); 3] {
    [
        ("encryption_key", secrets.encryption_key.is_some()),
        ("noise_key", secrets.noise_key.is_some()),
        ("entropy_salt", secrets.entropy_salt.is_some()),
    ]
}
