//! Application startup errors.

use std::path::PathBuf;

use mapseed_bootstrap::BootstrapError;
use mapseed_core::error::ClientError;
use thiserror::Error;

/// Errors raised while assembling and starting the client.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required setting is missing or malformed.
    #[error("invalid setting {name}: {reason}")]
    Setting {
        /// Environment variable name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A settings file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON document did not parse.
    #[error("failed to parse {path} as JSON: {source}")]
    Json {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A YAML document did not parse.
    #[error("failed to parse {path} as YAML: {source}")]
    Yaml {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration or a collaborator could not be set up.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The startup sequence failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}
