//! Mapseed Core — shared domain types and collaborator contracts.
//!
//! This crate defines the data model (datasets, users, places, forms,
//! configuration) and the traits the bootstrap and localization layers
//! consume. It contains no network or rendering code.

pub mod analytics;
pub mod api;
pub mod config;
pub mod cookies;
pub mod dataset;
pub mod error;
pub mod forms;
pub mod history;
pub mod host;
pub mod place;
pub mod retry;
pub mod store;
pub mod translation;
pub mod user;
