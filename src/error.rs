//! Configuration loading errors.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while reading, validating or resolving a configuration.
///
/// Every variant is fatal to the caller's startup; a failed load never yields
/// a partially populated configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A value has the wrong shape for its field.
    #[error("Invalid configuration at `{field}`: {message}")]
    Parse {
        /// Path of the offending field, e.g. `rules.header-max-length[2]`.
        field: String,
        /// What was expected and what was found.
        message: String,
    },

    /// A named base ruleset in `extends` cannot be resolved.
    #[error("Cannot resolve extends target `{name}`")]
    UnknownExtendsTarget {
        /// The unresolved identifier or path.
        name: String,
    },

    /// A severity is not one of the accepted encodings.
    #[error("Invalid severity at `{field}`: {value} (expected 0, 1, 2, \"disabled\", \"warning\" or \"error\")")]
    InvalidSeverity {
        /// Path of the offending field.
        field: String,
        /// The rejected value as written in the source.
        value: String,
    },

    /// The document is not well-formed JSON, YAML or module data.
    #[error("Malformed configuration document: {message}")]
    Syntax {
        /// Reader diagnostic.
        message: String,
    },

    /// The configuration file could not be read.
    #[error("Failed to read configuration file {}", path.display())]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Discovery found no configuration file.
    #[error("No configuration file found (searched: {})", searched.join(", "))]
    NotFound {
        /// File names that were looked for.
        searched: Vec<String>,
    },
}

impl ConfigError {
    /// Creates a shape error for `field`.
    #[must_use]
    pub fn parse(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an unresolved-extends error.
    #[must_use]
    pub fn unknown_extends(name: impl Into<String>) -> Self {
        Self::UnknownExtendsTarget { name: name.into() }
    }

    /// Creates an invalid-severity error.
    #[must_use]
    pub fn invalid_severity(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidSeverity {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a syntax error from a reader diagnostic.
    #[must_use]
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Returns the offending field path, when the error has one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Parse { field, .. } | Self::InvalidSeverity { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Describes a JSON value's kind for error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
