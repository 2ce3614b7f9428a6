//! Pure startup logic: step reporting and internal link detection.

pub mod links;
pub mod report;
