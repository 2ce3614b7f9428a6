//! Missing-translation resolver.
//!
//! Supplies display text for keys absent from the resource bundle. Misses
//! in a non-default language go to the external translation service. The
//! result (or the fallback on failure) is cached in the shared bundle, and
//! concurrent misses for the same entry share one outbound request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use mapseed_core::translation::{TranslationRequest, TranslationService};
use tracing::{debug, warn};

use crate::bundle::{SharedBundle, TranslationKey};
use crate::classifier::KeyClassifier;

/// How a missing key was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The key itself was supplied as fallback; the key is shown.
    Misconfigured,
    /// Default language; the fallback is already correct.
    DefaultLanguage,
    /// An earlier resolution already cached the entry.
    Cached,
    /// Another request for the entry is in flight; the fallback is shown
    /// until it settles.
    Coalesced,
    /// The translation service produced the text.
    Translated,
    /// The translation service failed, timed out or returned nothing; the
    /// fallback is cached.
    Degraded,
}

/// Text produced for a missing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTranslation {
    /// Display text.
    pub text: String,
    /// Resolution path taken.
    pub resolution: Resolution,
}

impl ResolvedTranslation {
    fn new(text: &str, resolution: Resolution) -> Self {
        Self {
            text: text.to_owned(),
            resolution,
        }
    }
}

type PendingTranslation = Shared<BoxFuture<'static, ResolvedTranslation>>;
type InFlight = Arc<Mutex<HashMap<TranslationKey, PendingTranslation>>>;

/// Resolves missing keys, caching one value per (language, namespace, key).
///
/// Lock order is in-flight map, then bundle.
#[derive(Clone)]
pub struct MissingTranslationResolver {
    default_language: String,
    translator: Arc<dyn TranslationService>,
    classifier: Arc<dyn KeyClassifier>,
    bundle: Arc<SharedBundle>,
    in_flight: InFlight,
    timeout: Duration,
}

impl std::fmt::Debug for MissingTranslationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MissingTranslationResolver")
            .field("default_language", &self.default_language)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MissingTranslationResolver {
    /// Creates a resolver writing into `bundle`.
    #[must_use]
    pub fn new(
        default_language: &str,
        translator: Arc<dyn TranslationService>,
        classifier: Arc<dyn KeyClassifier>,
        bundle: Arc<SharedBundle>,
        timeout: Duration,
    ) -> Self {
        Self {
            default_language: default_language.to_owned(),
            translator,
            classifier,
            bundle,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    /// Number of outstanding translation requests.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Resolves `key` in `namespace` for `language`, using `fallback` as the
    /// source text. Every path ends with a value cached for the entry,
    /// except a coalesced non-configurable key, whose pending request
    /// caches it.
    pub async fn resolve(
        &self,
        language: &str,
        namespace: &str,
        key: &str,
        fallback: &str,
    ) -> ResolvedTranslation {
        let entry = TranslationKey::new(language, namespace, key);

        if key == fallback {
            debug!(language, namespace, key, "missing key has no fallback text");
            self.bundle.add_resource(&entry, key);
            return ResolvedTranslation::new(key, Resolution::Misconfigured);
        }

        if language == self.default_language {
            self.bundle.add_resource(&entry, fallback);
            return ResolvedTranslation::new(fallback, Resolution::DefaultLanguage);
        }

        let pending = {
            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            if let Some(text) = self.bundle.get(&entry) {
                return ResolvedTranslation {
                    text,
                    resolution: Resolution::Cached,
                };
            }

            if let Some(pending) = in_flight.get(&entry) {
                if self.classifier.is_non_configurable(key, language) {
                    return ResolvedTranslation::new(fallback, Resolution::Coalesced);
                }
                pending.clone()
            } else {
                let pending = self.request(entry.clone(), fallback.to_owned());
                in_flight.insert(entry, pending.clone());
                pending
            }
        };

        pending.await
    }

    fn request(&self, entry: TranslationKey, fallback: String) -> PendingTranslation {
        let translator = Arc::clone(&self.translator);
        let bundle = Arc::clone(&self.bundle);
        let in_flight = Arc::clone(&self.in_flight);
        let timeout = self.timeout;
        let degraded = ResolvedTranslation::new(&fallback, Resolution::Degraded);

        let work = async move {
            let request = TranslationRequest {
                text: fallback.clone(),
                target: entry.language.clone(),
            };
            let resolved = match tokio::time::timeout(timeout, translator.translate(&request)).await
            {
                Ok(Ok(Some(response))) if !response.body.is_empty() => ResolvedTranslation {
                    text: response.body,
                    resolution: Resolution::Translated,
                },
                Ok(Ok(_)) => {
                    debug!(language = %entry.language, key = %entry.key, "translation service returned nothing");
                    ResolvedTranslation::new(&fallback, Resolution::Degraded)
                }
                Ok(Err(err)) => {
                    warn!(language = %entry.language, key = %entry.key, error = %err, "translation failed");
                    ResolvedTranslation::new(&fallback, Resolution::Degraded)
                }
                Err(_) => {
                    warn!(
                        language = %entry.language,
                        key = %entry.key,
                        timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                        "translation timed out"
                    );
                    ResolvedTranslation::new(&fallback, Resolution::Degraded)
                }
            };

            {
                let mut pending = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
                bundle.add_resource(&entry, &resolved.text);
                pending.remove(&entry);
            }
            resolved
        };

        // Spawned so the entry lands even if every caller is dropped.
        let task = tokio::spawn(work);
        async move {
            task.await.unwrap_or_else(|err| {
                warn!(error = %err, "translation task ended abnormally");
                degraded
            })
        }
        .boxed()
        .shared()
    }
}
