//! Configuration for the triskel transmission chain.
//!
//! # Features
//!
//! - **Settings file**: `[signal]`, `[cipher]`, `[obfuscation]`, `[lock]` and
//!   `[secrets]` sections in TOML
//! - **Secrets**: read from the file or `TRISKEL_*` environment variables,
//!   never written back
//! - **Validation**: all range problems reported together
//! - **Builders**: codec, cipher, synthesizer, obfuscator, monitor and key
//!   generator straight from a [`Settings`]
//! - **Paths**: platform-specific config directory
//!
//! # Example
//!
//! ```rust,no_run
//! use triskel_config::Settings;
//!
//! let settings = Settings::resolve(None).unwrap();
//! let stages = settings.pipeline_stages(true).unwrap();
//! ```

mod components;
mod error;
mod settings;

/// Platform-specific configuration paths.
pub mod paths;

/// Range checks for loaded settings.
pub mod validation;

pub use error::ConfigError;
pub use paths::{config_file, ensure_user_config_dir, user_config_dir};
pub use settings::{
    CipherSettings, DEFAULT_BASE_FREQ, ENV_PREFIX, LockSettings, ObfuscationPolicy,
    ObfuscationSettings, Secrets, Settings, SignalSettings, env_var_for,
};
pub use validation::{ValidationError, ValidationResult, validate};
