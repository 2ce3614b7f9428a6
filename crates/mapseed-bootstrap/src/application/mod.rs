//! Startup orchestration over the collaborator traits.

pub mod listeners;
pub mod orchestrator;
pub mod places;
pub mod readiness;
