//! Mapseed API Client — HTTP implementations of the collaborator contracts.
//!
//! [`HttpMapseedApi`] talks to the Mapseed REST backend with a cookie-aware
//! `reqwest` client so the session cookie travels with every request.
//! [`HttpTranslationService`] calls the machine translation endpoint.

mod http;
pub mod mapseed;
pub mod translation;

pub use mapseed::HttpMapseedApi;
pub use translation::HttpTranslationService;
