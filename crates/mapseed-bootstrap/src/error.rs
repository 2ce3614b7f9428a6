//! Bootstrap error types.

use mapseed_core::error::ClientError;
use thiserror::Error;

/// Errors that stop the startup sequence.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The sequence already ran for this orchestrator.
    #[error("bootstrap already started")]
    AlreadyStarted,

    /// Datasets are configured but none could be loaded.
    #[error("none of the {configured} configured datasets could be loaded")]
    NoDatasetsLoaded {
        /// Number of configured datasets.
        configured: usize,
    },

    /// Localization could not be initialized.
    #[error("localization failed to initialize: {0}")]
    Localization(#[source] ClientError),
}
