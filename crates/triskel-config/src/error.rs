//! Error types for configuration operations.

use crate::settings::env_var_for;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, validating or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A value is out of range or malformed.
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// A component needs a secret that was not supplied.
    #[error("missing secret '{0}' (set it in [secrets] or via {env})", env = env_var_for(.0))]
    MissingSecret(&'static str),

    /// A core component rejected its parameters.
    #[error(transparent)]
    Core(#[from] triskel_core::Error),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    #[test]
    fn read_file_display() {
        let err = ConfigError::read_file("/a/b.toml", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to read file"), "got: {msg}");
        assert!(msg.contains("/a/b.toml"), "got: {msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn create_dir_factory_produces_correct_variant() {
        let err = ConfigError::create_dir("/dir/path", mock_io_err());
        let ConfigError::CreateDir { path, .. } = &err else {
            panic!("expected CreateDir, got {err:?}");
        };
        assert_eq!(path, std::path::Path::new("/dir/path"));
    }

    #[test]
    fn missing_secret_names_env_var() {
        let msg = ConfigError::MissingSecret("noise_key").to_string();
        assert!(msg.contains("noise_key"), "got: {msg}");
        assert!(msg.contains("TRISKEL_NOISE_KEY"), "got: {msg}");
    }

    #[test]
    fn core_errors_are_transparent() {
        let err = ConfigError::from(triskel_core::Error::invalid_input("bad window"));
        assert_eq!(err.to_string(), "invalid input: bad window");
    }
}
