use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a construction call failed. None of these are retried.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// A template exists but no schema is registered for the class.
    #[error("unknown class '{0}'")]
    UnknownClass(String),

    /// The template store has no template for the class.
    #[error("no template for class '{class}' at {location}")]
    TemplateNotFound { class: String, location: String },

    /// The template exists but could not be read.
    #[error("failed to read template for class '{class}' at {}", .location.display())]
    TemplateUnreadable {
        class: String,
        location: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The generated source is invalid or does not match the class schema.
    #[error("bad instantiation of '{instance}' from class '{class}': {reason}")]
    BadInstantiation {
        class: String,
        instance: String,
        reason: String,
    },

    /// A namespace, container or function name is already owned by another instance.
    #[error("instance '{instance}' collides on '{namespace}' already owned by '{owner}'")]
    NameCollision {
        instance: String,
        namespace: String,
        owner: String,
    },
}

impl ConstructionError {
    pub(crate) fn bad_instantiation(class: &str, instance: &str, reason: impl Into<String>) -> Self {
        ConstructionError::BadInstantiation {
            class: class.to_string(),
            instance: instance.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure while dispatching a behavior on a live instance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error("reference error: {0}")]
    ReferenceError(String),
    #[error("type error: {0}")]
    TypeError(String),
    #[error("range error: {0}")]
    RangeError(String),
}

/// Failure while loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid class '{class}': {reason}")]
    InvalidClass { class: String, reason: String },
}
