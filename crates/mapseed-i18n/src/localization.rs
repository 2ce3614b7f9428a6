//! Localization facade: current language, lookups and missing-key handling.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use mapseed_core::config::Language;
use mapseed_core::translation::TranslationService;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::bundle::{ResourceBundle, SharedBundle, TranslationKey};
use crate::classifier::{StaticKeyClassifier, UI_SOURCE_LANGUAGE};
use crate::resolver::{MissingTranslationResolver, ResolvedTranslation};

/// Settings for [`Localization::init`].
#[derive(Debug, Clone)]
pub struct LocalizationOptions {
    /// Language of configured content; also the initial language.
    pub default_language: Language,
    /// Languages offered to the user.
    pub available_languages: Vec<Language>,
    /// Budget for one translation service call.
    pub translation_timeout: Duration,
}

/// Localization state shared by the whole application.
#[derive(Debug)]
pub struct Localization {
    language: RwLock<String>,
    default_language: Language,
    available_languages: Vec<Language>,
    bundle: Arc<SharedBundle>,
    resolver: MissingTranslationResolver,
}

impl Localization {
    /// Installs `resources` and wires the missing-key resolver to
    /// `translator`. The bundle is in place when this returns.
    #[must_use]
    pub fn init(
        options: LocalizationOptions,
        resources: ResourceBundle,
        translator: Arc<dyn TranslationService>,
    ) -> Self {
        let classifier = Arc::new(StaticKeyClassifier::from_bundle(&resources, UI_SOURCE_LANGUAGE));
        let preloaded = resources.len();
        let bundle = Arc::new(SharedBundle::new(resources));
        let resolver = MissingTranslationResolver::new(
            &options.default_language.code,
            translator,
            classifier,
            Arc::clone(&bundle),
            options.translation_timeout,
        );

        info!(
            language = %options.default_language.code,
            preloaded,
            "localization initialized"
        );

        Self {
            language: RwLock::new(options.default_language.code.clone()),
            default_language: options.default_language,
            available_languages: options.available_languages,
            bundle,
            resolver,
        }
    }

    /// The current language code.
    #[must_use]
    pub fn language(&self) -> String {
        self.language
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The default language.
    #[must_use]
    pub fn default_language(&self) -> &Language {
        &self.default_language
    }

    /// Languages offered to the user.
    #[must_use]
    pub fn available_languages(&self) -> &[Language] {
        &self.available_languages
    }

    /// Switches the current language.
    pub fn change_language(&self, code: &str) {
        *self.language.write().unwrap_or_else(PoisonError::into_inner) = code.to_owned();
        info!(language = code, "language changed");
    }

    /// Looks up `key` in the current language.
    ///
    /// On a miss the fallback (or the key, when no fallback was given) is
    /// returned right away and the entry is resolved in the background;
    /// subscribers are notified once it lands.
    #[must_use]
    pub fn translate(&self, namespace: &str, key: &str, fallback: Option<&str>) -> String {
        let language = self.language();
        if let Some(text) = self.bundle.lookup(&language, namespace, key) {
            return text;
        }

        let fallback = fallback.unwrap_or(key).to_owned();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let resolver = self.resolver.clone();
                let namespace = namespace.to_owned();
                let key = key.to_owned();
                let source = fallback.clone();
                runtime.spawn(async move {
                    resolver.resolve(&language, &namespace, &key, &source).await;
                });
            }
            Err(_) => debug!(key, "no async runtime; missing key left unresolved"),
        }
        fallback
    }

    /// Resolves a missing `key` in the current language and waits for the
    /// result.
    pub async fn resolve_missing(
        &self,
        namespace: &str,
        key: &str,
        fallback: &str,
    ) -> ResolvedTranslation {
        let language = self.language();
        self.resolver.resolve(&language, namespace, key, fallback).await
    }

    /// Receives every entry added or changed from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TranslationKey> {
        self.bundle.subscribe()
    }

    /// The shared resource bundle.
    #[must_use]
    pub fn bundle(&self) -> &Arc<SharedBundle> {
        &self.bundle
    }
}
