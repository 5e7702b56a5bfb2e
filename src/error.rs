//! Error types for the tariff store
//!
//! Reads through the settings store never fail; these errors surface only
//! from writes, configuration loading and the HTTP server.

use thiserror::Error;

/// Result type alias for tariff store operations
pub type Result<T> = std::result::Result<T, TariffError>;

/// Main error type for the tariff store
#[derive(Debug, Error)]
pub enum TariffError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Key-value backend errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// HTTP/Web server errors
    #[error("Web server error: {message}")]
    Web { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },
}

impl TariffError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        TariffError::Config {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        TariffError::Storage {
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        TariffError::Serialization {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        TariffError::Io {
            message: message.into(),
        }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        TariffError::Web {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        TariffError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for TariffError {
    fn from(err: std::io::Error) -> Self {
        TariffError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for TariffError {
    fn from(err: serde_yaml::Error) -> Self {
        TariffError::serialization(err.to_string())
    }
}

impl From<serde_json::Error> for TariffError {
    fn from(err: serde_json::Error) -> Self {
        TariffError::serialization(err.to_string())
    }
}
