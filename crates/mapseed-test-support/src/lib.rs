//! Shared test fakes and utilities for the Mapseed client.

mod analytics;
mod api;
mod journal;
mod store;
mod translation;

pub use analytics::{AnalyticsEvent, RecordingAnalytics};
pub use api::FakeMapseedApi;
pub use journal::Journal;
pub use store::{RecordingStore, StoreAction};
pub use translation::{FakeTranslationService, TranslationGate};
