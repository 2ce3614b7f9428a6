//! Shared test helpers for orchestrator integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use mapseed_bootstrap::{BootstrapDeps, BootstrapOptions, Orchestrator};
use mapseed_core::config::ClientConfig;
use mapseed_core::cookies::MemoryCookieStore;
use mapseed_core::history::MemoryHistory;
use mapseed_core::host::{HeadlessHost, Viewport};
use mapseed_core::retry::{Backoff, RetryPolicy};
use mapseed_i18n::ResourceBundle;
use mapseed_test_support::{
    FakeMapseedApi, FakeTranslationService, Journal, RecordingAnalytics, RecordingStore,
};
use serde_json::{Value, json};

pub const API_ROOT: &str = "https://api.test/api/v2/";

/// Canonical URL of a dataset owned by `alice`.
pub fn dataset_url(slug: &str) -> String {
    format!("{API_ROOT}alice/datasets/{slug}")
}

/// Configuration document with one dataset per slug, all owned by `alice`.
pub fn config_json(slugs: &[&str]) -> Value {
    let datasets: Vec<Value> = slugs
        .iter()
        .map(|slug| {
            json!({
                "datasetSlug": slug,
                "user": "alice",
                "clientSlug": format!("{slug}-client"),
                "anonymousPermissions": [{"abilities": ["retrieve"], "submission_set": "*"}],
                "placeConfirmationModal": {"isEnabled": true},
            })
        })
        .collect();

    json!({
        "app": {"title": "Seed Map", "apiRoot": API_ROOT},
        "flavor": {
            "slug": "seedmap",
            "datasets": datasets,
            "defaultLanguage": {"code": "en", "label": "English"},
            "availableLanguages": [
                {"code": "en", "label": "English"},
                {"code": "es", "label": "Español"}
            ],
        },
        "map": {"zoom": 12},
        "leftSidebar": {"is_enabled": false},
        "right_sidebar": {"is_visible_default": false},
        "support": {},
        "pages": [{"slug": "about"}],
        "nav_bar": [],
        "custom_components": {},
        "mapStyle": {"layers": []},
    })
}

/// Parses [`config_json`].
pub fn config(slugs: &[&str]) -> ClientConfig {
    serde_json::from_value(config_json(slugs)).unwrap()
}

/// Options with short, fixed retry delays.
pub fn fast_options() -> BootstrapOptions {
    BootstrapOptions {
        retry: RetryPolicy {
            max_retries: 2,
            backoff: Backoff::Constant(Duration::from_millis(10)),
            attempt_timeout: Duration::from_secs(1),
        },
        translation_timeout: Duration::from_secs(1),
        page_concurrency: 2,
    }
}

/// Fakes for every collaborator, sharing one journal.
pub struct Harness {
    pub journal: Journal,
    pub api: Arc<FakeMapseedApi>,
    pub store: Arc<RecordingStore>,
    pub cookies: Arc<MemoryCookieStore>,
    pub analytics: Arc<RecordingAnalytics>,
    pub translator: Arc<FakeTranslationService>,
    pub host: Arc<HeadlessHost>,
    pub history: Arc<MemoryHistory>,
}

impl Harness {
    /// Builds the fakes; `configure` sets up the backend.
    pub fn new(configure: impl FnOnce(FakeMapseedApi) -> FakeMapseedApi) -> Self {
        Self::with_analytics(configure, RecordingAnalytics::new())
    }

    /// Like [`Harness::new`] with a specific analytics sink.
    pub fn with_analytics(
        configure: impl FnOnce(FakeMapseedApi) -> FakeMapseedApi,
        analytics: RecordingAnalytics,
    ) -> Self {
        let journal = Journal::new();
        Self {
            api: Arc::new(configure(FakeMapseedApi::new().with_journal(journal.clone()))),
            store: Arc::new(RecordingStore::new().with_journal(journal.clone())),
            cookies: Arc::new(MemoryCookieStore::new()),
            analytics: Arc::new(analytics),
            translator: Arc::new(FakeTranslationService::returning("traducido")),
            host: Arc::new(HeadlessHost::new(Viewport {
                width: 1280,
                height: 800,
            })),
            history: Arc::new(MemoryHistory::new("/")),
            journal,
        }
    }

    pub fn deps(&self) -> BootstrapDeps {
        BootstrapDeps {
            api: self.api.clone(),
            store: self.store.clone(),
            cookies: self.cookies.clone(),
            analytics: self.analytics.clone(),
            translator: self.translator.clone(),
            host: self.host.clone(),
            history: self.history.clone(),
        }
    }

    pub fn orchestrator(&self, config: ClientConfig) -> Orchestrator {
        let mut resources = ResourceBundle::new();
        resources.add_resource("en", "ui", "submitButton", "Submit");
        Orchestrator::new(self.deps(), Arc::new(config), resources, fast_options())
    }
}
