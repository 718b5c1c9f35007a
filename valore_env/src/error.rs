//! Error types for the VALORE environment layer.

use thiserror::Error;

/// Errors that can occur while reading the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// A setting was present but could not be parsed
    #[error("Invalid value {value:?} for setting {key}")]
    InvalidSetting { key: String, value: String },

    /// A setting parsed but is outside its allowed range
    #[error("Setting {key} out of range: {reason}")]
    OutOfRange { key: String, reason: String },
}

impl EnvError {
    /// Creates an invalid-setting error.
    pub fn invalid(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            value: value.into(),
        }
    }
}
