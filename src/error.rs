//! Error types and handling for Tariffwatch
//!
//! Every failure inside a refresh cycle is recoverable: it degrades specific
//! tariff fields and is logged. Only configuration problems stop the process
//! at startup.

use thiserror::Error;

/// Result type alias for Tariffwatch operations
pub type Result<T> = std::result::Result<T, TariffWatchError>;

/// Main error type for Tariffwatch
#[derive(Debug, Error)]
pub enum TariffWatchError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// DNS, connect and other transport errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Request exceeded the configured timeout
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Provider answered with a non-success status
    #[error("API error: {message}")]
    Api { message: String },

    /// Serialization/deserialization errors (JSON, YAML)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Fee page text did not yield the expected values
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// No spot price record covers the current hour
    #[error("No data: {message}")]
    NoData { message: String },

    /// Electricity spot price still unknown after a refresh
    #[error("Tariff not yet available: {message}")]
    NotYetAvailable { message: String },

    /// Metrics backend rejected or did not receive a point
    #[error("Metrics sink error: {message}")]
    Sink { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },
}

impl TariffWatchError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new no-data error
    pub fn no_data<S: Into<String>>(message: S) -> Self {
        Self::NoData {
            message: message.into(),
        }
    }

    /// Create a new not-yet-available condition
    pub fn not_yet_available<S: Into<String>>(message: S) -> Self {
        Self::NotYetAvailable {
            message: message.into(),
        }
    }

    /// Create a new metrics sink error
    pub fn sink<S: Into<String>>(message: S) -> Self {
        Self::Sink {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the pipeline can carry on after this error
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config { .. } | Self::Validation { .. })
    }
}

impl From<std::io::Error> for TariffWatchError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for TariffWatchError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<serde_json::Error> for TariffWatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<reqwest::Error> for TariffWatchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if err.is_decode() {
            Self::serialization(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<chrono::ParseError> for TariffWatchError {
    fn from(err: chrono::ParseError) -> Self {
        Self::validation("datetime".to_string(), err.to_string())
    }
}
