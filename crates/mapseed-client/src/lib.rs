//! Mapseed Client — the application around the startup sequence.
//!
//! Holds the typed state container the bootstrap publishes into, maps
//! locations to templates, selects the view the shell renders, and wires
//! everything together from environment settings.

pub mod app;
pub mod error;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod settings;
pub mod state;

pub use app::{App, LanguageState, Overflow, PageView, View};
pub use error::AppError;
pub use routes::{Route, Template};
pub use runtime::{ClientRuntime, Services};
pub use services::{DisabledTranslationService, TracingAnalytics};
pub use settings::Settings;
pub use state::{AppStore, MapStyle};
