//! Mapseed Bootstrap — application startup for the Mapseed client.
//!
//! Runs the ordered startup sequence once per application lifetime: session,
//! datasets, forms, user, configuration fan-out and localization. It then
//! signals readiness, installs the global listeners and loads places in the
//! background.

pub mod application;
pub mod domain;
pub mod error;

pub use application::listeners::InstalledListeners;
pub use application::orchestrator::{
    BootstrapDeps, BootstrapOptions, Bootstrapped, MountedApp, Orchestrator,
};
pub use application::places::{PlaceLoadSummary, PlaceLoader};
pub use application::readiness::{BootstrapStatus, Readiness};
pub use domain::report::{BootstrapReport, BootstrapStep, DatasetFailure, StepOutcome};
pub use error::BootstrapError;
