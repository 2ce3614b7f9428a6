//! Classification of non-configurable UI text.
//!
//! Hard-coded UI strings ship in the preloaded bundle in the UI source
//! language. Such keys never need machine translation in that language.

use std::collections::HashSet;

use crate::bundle::ResourceBundle;

/// Language all non-configurable UI strings are authored in.
pub const UI_SOURCE_LANGUAGE: &str = "en";

/// Decides whether a key denotes non-configurable UI text in a language.
pub trait KeyClassifier: Send + Sync {
    /// Returns `true` if `key` is fixed UI text in `language`.
    fn is_non_configurable(&self, key: &str, language: &str) -> bool;
}

/// Classifier backed by the keys of the preloaded bundle.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyClassifier {
    ui_language: String,
    keys: HashSet<String>,
}

impl StaticKeyClassifier {
    /// Collects every key `bundle` defines for `ui_language`.
    #[must_use]
    pub fn from_bundle(bundle: &ResourceBundle, ui_language: &str) -> Self {
        Self {
            ui_language: ui_language.to_owned(),
            keys: bundle.keys(ui_language).map(str::to_owned).collect(),
        }
    }
}

impl KeyClassifier for StaticKeyClassifier {
    fn is_non_configurable(&self, key: &str, language: &str) -> bool {
        language == self.ui_language && self.keys.contains(key)
    }
}
