//! TOML settings file format.
//!
//! ```toml
//! [signal]
//! sample_rate = 44100
//! base_freq = 111.0
//! duration = 1.0
//! harmonics = [3, 6, 9]
//! fundamental_limit_hz = 1000.0
//!
//! [cipher]
//! max_offset_hz = 240.0
//!
//! [obfuscation]
//! policy = "noise"        # none | noise | smear
//! noise_strength = 0.2
//! smear_strength = 0.03
//! block_size = 1024
//! # seed = 42           # smear seed; derived from the noise key if absent
//!
//! [lock]
//! window_secs = 1.0
//! threshold = 0.3
//! listen_secs = 1.0
//! require_lock = true
//!
//! [secrets]
//! encryption_key = "..."
//! noise_key = "..."
//! entropy_salt = "..."
//! ```
//!
//! Every section and field is optional. Secrets are read but never written
//! back: [`Settings::to_toml`] and [`Settings::save`] omit them.

use crate::error::ConfigError;
use crate::validation::validate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use triskel_core::cipher::DEFAULT_MAX_OFFSET_HZ;
use triskel_core::codec::DEFAULT_FUNDAMENTAL_LIMIT_HZ;
use triskel_core::lock::{DEFAULT_LOCK_THRESHOLD, DEFAULT_WINDOW_SECS};
use triskel_core::obfuscate::{DEFAULT_BLOCK_SIZE, DEFAULT_NOISE_STRENGTH, DEFAULT_SMEAR_STRENGTH};
use triskel_core::{CANONICAL_HARMONICS, DEFAULT_SAMPLE_RATE, Multiplier};

/// Prefix of the environment variables that override secrets.
pub const ENV_PREFIX: &str = "TRISKEL_";

/// Default base frequency in Hz.
pub const DEFAULT_BASE_FREQ: f64 = 111.0;

/// Environment variable that overrides the named secret.
pub fn env_var_for(secret: &str) -> String {
    format!("{ENV_PREFIX}{}", secret.to_uppercase())
}

/// Signal shape shared by every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalSettings {
    /// Sample rate in Hz for every stage.
    pub sample_rate: u32,
    /// Base frequency the harmonics are multiples of.
    pub base_freq: f64,
    /// Synthesized waveform length in seconds.
    pub duration: f64,
    /// Harmonic multipliers to encode.
    pub harmonics: Vec<Multiplier>,
    /// Upper bound of the fundamental search.
    pub fundamental_limit_hz: f64,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            base_freq: DEFAULT_BASE_FREQ,
            duration: 1.0,
            harmonics: CANONICAL_HARMONICS.to_vec(),
            fundamental_limit_hz: DEFAULT_FUNDAMENTAL_LIMIT_HZ,
        }
    }
}

/// Keyed permutation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherSettings {
    /// Largest frequency offset added to a harmonic.
    pub max_offset_hz: f64,
}

impl Default for CipherSettings {
    fn default() -> Self {
        Self {
            max_offset_hz: DEFAULT_MAX_OFFSET_HZ,
        }
    }
}

/// Which obfuscation stage the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObfuscationPolicy {
    /// No obfuscation.
    None,
    /// Keyed additive Gaussian noise.
    #[default]
    Noise,
    /// Spectral smear with block phase scaling.
    Smear,
}

impl fmt::Display for ObfuscationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObfuscationPolicy::None => "none",
            ObfuscationPolicy::Noise => "noise",
            ObfuscationPolicy::Smear => "smear",
        })
    }
}

impl std::str::FromStr for ObfuscationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ObfuscationPolicy::None),
            "noise" => Ok(ObfuscationPolicy::Noise),
            "smear" => Ok(ObfuscationPolicy::Smear),
            other => Err(format!("unknown obfuscation policy '{other}' (none|noise|smear)")),
        }
    }
}

/// Obfuscation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObfuscationSettings {
    /// Policy to apply in secure mode.
    pub policy: ObfuscationPolicy,
    /// Noise standard deviation for the noise policy.
    pub noise_strength: f64,
    /// Per-bin smear deviation for the smear policy.
    pub smear_strength: f64,
    /// Block length for smear phase scaling.
    pub block_size: usize,
    /// Explicit smear seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ObfuscationSettings {
    fn default() -> Self {
        Self {
            policy: ObfuscationPolicy::default(),
            noise_strength: DEFAULT_NOISE_STRENGTH,
            smear_strength: DEFAULT_SMEAR_STRENGTH,
            block_size: DEFAULT_BLOCK_SIZE,
            seed: None,
        }
    }
}

/// Lock protocol settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    /// Key window length in seconds.
    pub window_secs: f64,
    /// Minimum per-harmonic amplitude for a lock.
    pub threshold: f64,
    /// Feedback listening window in seconds.
    pub listen_secs: f64,
    /// Whether transmission waits for a feedback lock.
    pub require_lock: bool,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
            threshold: DEFAULT_LOCK_THRESHOLD,
            listen_secs: 1.0,
            require_lock: true,
        }
    }
}

/// Caller-supplied secrets. Deserialized, never serialized.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Secrets {
    /// Key for the harmonic cipher.
    #[serde(skip_serializing)]
    pub encryption_key: Option<String>,
    /// Key for the noise mask (and smear seed fallback).
    #[serde(skip_serializing)]
    pub noise_key: Option<String>,
    /// Salt mixed into lock keys.
    #[serde(skip_serializing)]
    pub entropy_salt: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &Option<String>| s.as_ref().map(|_| "<redacted>");
        f.debug_struct("Secrets")
            .field("encryption_key", &redact(&self.encryption_key))
            .field("noise_key", &redact(&self.noise_key))
            .field("entropy_salt", &redact(&self.entropy_salt))
            .finish()
    }
}

impl Secrets {
    /// Names of the secrets, as used in `[secrets]` and the environment.
    pub const NAMES: [&'static str; 3] = ["encryption_key", "noise_key", "entropy_salt"];

    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "encryption_key" => Some(&mut self.encryption_key),
            "noise_key" => Some(&mut self.noise_key),
            "entropy_salt" => Some(&mut self.entropy_salt),
            _ => None,
        }
    }
}

/// Complete triskel configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `[signal]`
    pub signal: SignalSettings,
    /// `[cipher]`
    pub cipher: CipherSettings,
    /// `[obfuscation]`
    pub obfuscation: ObfuscationSettings,
    /// `[lock]`
    pub lock: LockSettings,
    /// `[secrets]`
    pub secrets: Secrets,
}

impl Settings {
    /// Parse and validate a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(toml_str)?;
        validate(&settings)?;
        Ok(settings)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let settings = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Load `path` if given, else the user config file if it exists, else
    /// defaults. Environment overrides are applied last.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(p) => Self::load(p)?,
            None => {
                let default_path = crate::paths::config_file();
                if default_path.is_file() {
                    Self::load(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env();
        Ok(settings)
    }

    /// Serialize without secrets.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to `path` without secrets, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Override secrets from `TRISKEL_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Override secrets from any variable lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for name in Secrets::NAMES {
            let var = env_var_for(name);
            if let Some(value) = lookup(&var).filter(|v| !v.is_empty())
                && let Some(slot) = self.secrets.slot(name)
            {
                tracing::debug!(var = %var, "secret taken from environment");
                *slot = Some(value);
            }
        }
    }

    /// Check every value range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(validate(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.signal.harmonics, vec![3, 6, 9]);
        assert_eq!(settings.signal.base_freq, 111.0);
        assert_eq!(settings.obfuscation.policy, ObfuscationPolicy::Noise);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = Settings::from_toml(
            r#"
            [signal]
            base_freq = 222.0

            [obfuscation]
            policy = "smear"
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(settings.signal.base_freq, 222.0);
        assert_eq!(settings.signal.sample_rate, 44100);
        assert_eq!(settings.obfuscation.policy, ObfuscationPolicy::Smear);
        assert_eq!(settings.obfuscation.seed, Some(42));
        assert_eq!(settings.lock, LockSettings::default());
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = Settings::from_toml("[obfuscation]\npolicy = \"rot13\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn out_of_range_is_a_validation_error() {
        let err = Settings::from_toml("[lock]\nwindow_secs = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn secrets_are_read_but_not_written() {
        let settings = Settings::from_toml(
            r#"
            [secrets]
            encryption_key = "IX369"
            noise_key = "hush"
            "#,
        )
        .unwrap();
        assert_eq!(settings.secrets.encryption_key.as_deref(), Some("IX369"));

        let out = settings.to_toml().unwrap();
        assert!(!out.contains("IX369"), "got: {out}");
        assert!(!out.contains("hush"), "got: {out}");
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut settings = Settings::default();
        settings.secrets.entropy_salt = Some("pepper".into());
        let dbg = format!("{settings:?}");
        assert!(!dbg.contains("pepper"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn overrides_replace_secrets() {
        let mut settings = Settings::default();
        settings.secrets.noise_key = Some("from-file".into());
        settings.apply_overrides(|var| match var {
            "TRISKEL_ENCRYPTION_KEY" => Some("IX369".into()),
            "TRISKEL_NOISE_KEY" => Some(String::new()),
            _ => None,
        });
        assert_eq!(settings.secrets.encryption_key.as_deref(), Some("IX369"));
        assert_eq!(settings.secrets.noise_key.as_deref(), Some("from-file"));
        assert!(settings.secrets.entropy_salt.is_none());
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("SMEAR".parse::<ObfuscationPolicy>(), Ok(ObfuscationPolicy::Smear));
        assert!("xor".parse::<ObfuscationPolicy>().is_err());
        assert_eq!(ObfuscationPolicy::None.to_string(), "none");
    }

    #[test]
    fn env_var_names() {
        assert_eq!(env_var_for("entropy_salt"), "TRISKEL_ENTROPY_SALT");
    }
}
