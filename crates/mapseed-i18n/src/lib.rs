//! Mapseed i18n — localization with machine translation fallback.
//!
//! Lookups that miss the preloaded resource bundle are handed to the
//! [`resolver::MissingTranslationResolver`], which caches a translated (or
//! fallback) value per language, namespace and key and coalesces concurrent
//! requests for the same entry.

pub mod bundle;
pub mod classifier;
pub mod localization;
pub mod resolver;

pub use bundle::{ResourceBundle, SharedBundle, TranslationKey};
pub use classifier::{KeyClassifier, StaticKeyClassifier, UI_SOURCE_LANGUAGE};
pub use localization::{Localization, LocalizationOptions};
pub use resolver::{MissingTranslationResolver, Resolution, ResolvedTranslation};
