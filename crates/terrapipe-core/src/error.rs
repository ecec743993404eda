//! Error types for the Terrapipe core library
//!
//! This module defines the error handling system for Terrapipe, using
//! thiserror for ergonomic error definitions and anyhow for flexible
//! error sources.

use thiserror::Error;

/// Main error type for configuration validation
///
/// Every failure surfaced to a caller is one of these variants; the
/// variants mirror how a configuration can be wrong rather than where
/// the failure was detected. Validation is fail-fast, so a caller sees
/// exactly one error describing the first problem in section order.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Wrong container type or shape for a section or field
    #[error("invalid \"{section}\" section: {message}")]
    Structural { section: String, message: String },

    /// A field names a key absent from its target section
    #[error("{context} refers to \"{name}\" which is not defined in \"{section}\"")]
    Reference {
        context: String,
        section: String,
        name: String,
    },

    /// A callable reference failed to resolve to a registered symbol
    #[error("cannot resolve callable {reference} for {context}: {message}")]
    Resolution {
        context: String,
        reference: String,
        message: String,
    },

    /// Required field missing or empty, bad numeric value, or
    /// mutually-exclusive fields both/neither set
    #[error("{context}: {message}")]
    Constraint { context: String, message: String },

    /// Non-empty body supplied for a section whose logic does not exist yet
    #[error("\"{section}\" is not implemented; remove the section or leave it empty")]
    Unimplemented { section: String },

    /// A runtime-settings field (config key or environment override) is
    /// out of range
    #[error("invalid runtime setting {variable}: {message}")]
    Environment { variable: String, message: String },

    /// The configuration document could not be decoded
    #[error("cannot decode configuration document: {message}")]
    Decode {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// IO errors while reading a configuration file
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our ConfigError type
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    /// Create a structural error for a section
    pub fn structural(section: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Structural {
            section: section.into(),
            message: message.into(),
        }
    }

    /// Create a constraint error at a context path
    pub fn constraint(context: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Constraint {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a referential error at a context path
    pub fn reference(
        context: impl Into<String>,
        section: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        ConfigError::Reference {
            context: context.into(),
            section: section.into(),
            name: name.into(),
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Decode {
            message: err.to_string(),
            source: anyhow::Error::new(err),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Decode {
            message: err.to_string(),
            source: anyhow::Error::new(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
