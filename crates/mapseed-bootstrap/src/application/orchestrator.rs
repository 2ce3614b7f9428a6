//! Bootstrap orchestrator.
//!
//! [`Orchestrator::initialize`] runs the startup sequence once: session,
//! datasets, forms, user, configuration fan-out and localization, then
//! flips the readiness signal. [`Orchestrator::mount`] additionally installs
//! the global listeners and starts place loading in the background.
//!
//! Each step contains its own failures. A missing session, flavor or user
//! degrades to a safe default, and a failing dataset is reported without
//! aborting its siblings. Readiness fails only when no usable application
//! can be produced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use mapseed_core::analytics::{Analytics, AnalyticsProfile};
use mapseed_core::api::MapseedApi;
use mapseed_core::config::ClientConfig;
use mapseed_core::cookies::{CookieStore, SESSION_COOKIE_NAME};
use mapseed_core::dataset::Dataset;
use mapseed_core::error::ClientError;
use mapseed_core::forms::merge_forms;
use mapseed_core::history::History;
use mapseed_core::host::Host;
use mapseed_core::retry::RetryPolicy;
use mapseed_core::store::{ConfigSection, Store, UiComponent};
use mapseed_core::translation::TranslationService;
use mapseed_core::user::User;
use mapseed_i18n::{Localization, LocalizationOptions, ResourceBundle};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::application::listeners::InstalledListeners;
use crate::application::places::{PlaceLoadSummary, PlaceLoader};
use crate::application::readiness::Readiness;
use crate::domain::report::{BootstrapReport, BootstrapStep, DatasetFailure, StepOutcome};
use crate::error::BootstrapError;

/// Collaborators the startup sequence talks to.
#[derive(Clone)]
pub struct BootstrapDeps {
    /// Backend API.
    pub api: Arc<dyn MapseedApi>,
    /// Global state container.
    pub store: Arc<dyn Store>,
    /// Cookie jar holding the session identifier.
    pub cookies: Arc<dyn CookieStore>,
    /// Analytics sink.
    pub analytics: Arc<dyn Analytics>,
    /// Machine translation service for missing keys.
    pub translator: Arc<dyn TranslationService>,
    /// Host environment events.
    pub host: Arc<dyn Host>,
    /// Navigation history.
    pub history: Arc<dyn History>,
}

/// Timeouts, retries and concurrency limits of the startup sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapOptions {
    /// Policy for session, dataset and user fetches. The flavor fetch uses
    /// the same per-attempt timeout without retries.
    pub retry: RetryPolicy,
    /// Budget for one translation service call.
    pub translation_timeout: Duration,
    /// Concurrent place page requests per dataset.
    pub page_concurrency: usize,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            translation_timeout: Duration::from_secs(3),
            page_concurrency: 4,
        }
    }
}

/// Data produced by a successful startup sequence.
#[derive(Debug)]
pub struct Bootstrapped {
    /// Loaded datasets in configuration order.
    pub datasets: Vec<Dataset>,
    /// The current user.
    pub user: User,
    /// Initialized localization.
    pub localization: Arc<Localization>,
    /// Per-step outcomes.
    pub report: BootstrapReport,
}

/// Runs the startup sequence once per application lifetime.
pub struct Orchestrator {
    deps: BootstrapDeps,
    config: Arc<ClientConfig>,
    options: BootstrapOptions,
    resources: Mutex<Option<ResourceBundle>>,
    readiness: Readiness,
    started: AtomicBool,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("flavor", &self.config.flavor.slug)
            .field("options", &self.options)
            .field("readiness", &self.readiness.status())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator for `config`. `resources` is the preloaded
    /// localization bundle.
    #[must_use]
    pub fn new(
        deps: BootstrapDeps,
        config: Arc<ClientConfig>,
        resources: ResourceBundle,
        options: BootstrapOptions,
    ) -> Self {
        Self {
            deps,
            config,
            options,
            resources: Mutex::new(Some(resources)),
            readiness: Readiness::new(),
            started: AtomicBool::new(false),
        }
    }

    /// The readiness signal flipped by [`Self::initialize`].
    #[must_use]
    pub fn readiness(&self) -> Readiness {
        self.readiness.clone()
    }

    /// Runs steps 1 to 6 and flips the readiness signal.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError::AlreadyStarted` on a second call,
    /// `BootstrapError::NoDatasetsLoaded` when datasets are configured but
    /// none could be loaded, and `BootstrapError::Localization` when the
    /// default language is not configured. Readiness is failed in the last
    /// two cases.
    #[instrument(skip_all, name = "bootstrap", fields(flavor = %self.config.flavor.slug))]
    pub async fn initialize(&self) -> Result<Bootstrapped, BootstrapError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(BootstrapError::AlreadyStarted);
        }

        let mut report = BootstrapReport::default();
        self.acquire_session(&mut report).await;
        let datasets = self.load_datasets(&mut report).await;
        self.load_forms(&datasets, &mut report).await;
        let user = self.load_user(&datasets, &mut report).await;
        self.publish_config(&datasets);
        report.record(BootstrapStep::Config, StepOutcome::Completed);

        let localization = match self.init_localization() {
            Ok(localization) => localization,
            Err(err) => {
                self.readiness
                    .fail(BootstrapStep::Localization, err.to_string());
                return Err(err);
            }
        };
        report.record(BootstrapStep::Localization, StepOutcome::Completed);

        let configured = self.config.flavor.datasets.len();
        if configured > 0 && datasets.is_empty() {
            let err = BootstrapError::NoDatasetsLoaded { configured };
            self.readiness.fail(BootstrapStep::Datasets, err.to_string());
            return Err(err);
        }

        self.readiness.mark_ready();
        Ok(Bootstrapped {
            datasets,
            user,
            localization,
            report,
        })
    }

    /// Initializes, installs the global listeners and starts loading places.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::initialize`].
    pub async fn mount(&self) -> Result<MountedApp, BootstrapError> {
        let mut bootstrapped = self.initialize().await?;

        let listeners = InstalledListeners::install(
            Arc::clone(&self.deps.host),
            Arc::clone(&self.deps.history),
            Arc::clone(&self.deps.store),
            Arc::clone(&self.deps.analytics),
        );
        bootstrapped
            .report
            .record(BootstrapStep::Listeners, StepOutcome::Completed);

        let loader = PlaceLoader::new(
            Arc::clone(&self.deps.api),
            Arc::clone(&self.deps.store),
            self.options.page_concurrency,
        );
        let datasets = bootstrapped.datasets.clone();
        let user = bootstrapped.user.clone();
        let places = tokio::spawn(async move { loader.load(&datasets, &user).await });

        Ok(MountedApp {
            bootstrapped,
            listeners,
            places: Some(places),
        })
    }

    async fn acquire_session(&self, report: &mut BootstrapReport) {
        let outcome = self
            .options
            .retry
            .run("session", || self.deps.api.session())
            .await;

        let step = match outcome {
            Ok(Some(session)) => {
                self.deps.cookies.set(SESSION_COOKIE_NAME, &session.sessionid);
                debug!("session cookie stored");
                StepOutcome::Completed
            }
            Ok(None) => StepOutcome::Skipped,
            Err(err) => {
                warn!(step = "session", error = %err, "no session; continuing anonymously");
                StepOutcome::Degraded(err.to_string())
            }
        };
        report.record(BootstrapStep::Session, step);
    }

    async fn load_datasets(&self, report: &mut BootstrapReport) -> Vec<Dataset> {
        let api_root = self.config.app.api_root.as_str();
        let fetches = self.config.flavor.datasets.iter().map(|dataset_config| async move {
            let record = self
                .options
                .retry
                .run("dataset", || {
                    self.deps
                        .api
                        .dataset(&dataset_config.user, &dataset_config.dataset_slug)
                })
                .await;
            (dataset_config, record)
        });

        let mut datasets = Vec::new();
        for (dataset_config, outcome) in join_all(fetches).await {
            match outcome {
                Ok(record) => datasets.push(Dataset::merge(record, dataset_config, api_root)),
                Err(error) => {
                    warn!(
                        step = "datasets",
                        dataset = %dataset_config.dataset_slug,
                        error = %error,
                        "dataset failed to load"
                    );
                    report.record_dataset_failure(DatasetFailure {
                        dataset_slug: dataset_config.dataset_slug.clone(),
                        error,
                    });
                }
            }
        }

        let failed = report.dataset_failures().len();
        let step = if failed == 0 {
            StepOutcome::Completed
        } else {
            StepOutcome::Degraded(format!(
                "{failed} of {} datasets failed to load",
                self.config.flavor.datasets.len()
            ))
        };
        report.record(BootstrapStep::Datasets, step);

        info!(loaded = datasets.len(), failed, "datasets loaded");
        self.deps.store.load_datasets(datasets.clone());
        datasets
    }

    async fn load_forms(&self, datasets: &[Dataset], report: &mut BootstrapReport) {
        let policy = RetryPolicy::once(self.options.retry.attempt_timeout);
        let outcome = policy
            .run("flavor", || self.deps.api.flavor(&self.config.flavor.slug))
            .await;

        let step = match outcome {
            Ok(Some(flavor)) => {
                let api_forms = flavor.forms.unwrap_or_default();
                let forms = merge_forms(&api_forms, &self.config.flavor.forms, datasets);
                info!(forms = forms.len(), "forms loaded");
                self.deps.store.load_forms(forms);
                StepOutcome::Completed
            }
            Ok(None) => StepOutcome::Skipped,
            Err(err) => {
                warn!(step = "flavor", error = %err, "flavor unavailable; no forms loaded");
                StepOutcome::Degraded(err.to_string())
            }
        };
        report.record(BootstrapStep::Flavor, step);
    }

    async fn load_user(&self, datasets: &[Dataset], report: &mut BootstrapReport) -> User {
        let outcome = self
            .options
            .retry
            .run("user", || self.deps.api.current_user())
            .await;

        let anonymous = || User::anonymous(self.deps.cookies.get(SESSION_COOKIE_NAME).as_deref());
        let (user, step) = match outcome {
            Ok(Some(record)) => {
                let user = User::authenticated(record);
                self.identify(&user);
                (user, StepOutcome::Completed)
            }
            Ok(None) => (anonymous(), StepOutcome::Completed),
            Err(err) => {
                warn!(step = "user", error = %err, "user unavailable; continuing anonymously");
                (anonymous(), StepOutcome::Degraded(err.to_string()))
            }
        };
        report.record(BootstrapStep::User, step);

        info!(authenticated = user.is_authenticated, "user loaded");
        self.deps.store.load_user(user.clone(), datasets);
        user
    }

    fn identify(&self, user: &User) {
        let Some(id) = user.id else {
            return;
        };
        let analytics = &self.deps.analytics;
        let profile = AnalyticsProfile {
            id,
            name: user.name.clone().unwrap_or_default(),
            username: user.username.clone().unwrap_or_default(),
        };

        let results = [
            analytics.identify(id),
            analytics.track("Successful login"),
            analytics.set_profile(&profile),
        ];
        for err in results.into_iter().filter_map(Result::err) {
            warn!(error = %err, "analytics identification failed");
        }
    }

    fn publish_config(&self, datasets: &[Dataset]) {
        let config = &self.config;
        let store = &self.deps.store;

        let mut sections = vec![
            ConfigSection::App(config.app.clone()),
            ConfigSection::Map(config.map.clone()),
            ConfigSection::LeftSidebar(config.left_sidebar.clone()),
            ConfigSection::RightSidebar(config.right_sidebar.clone()),
        ];
        if let Some(featured) = &config.featured_places {
            sections.push(ConfigSection::FeaturedPlaces(featured.clone()));
        }
        sections.extend([
            ConfigSection::Support(config.support.clone()),
            ConfigSection::Pages(config.pages.clone()),
            ConfigSection::NavBar(config.nav_bar.clone()),
            ConfigSection::CustomComponents(config.custom_components.clone()),
            ConfigSection::MapStyle {
                style: config.map_style.clone(),
                datasets: datasets.to_vec(),
            },
            ConfigSection::Flavor(config.flavor.clone()),
        ]);
        if let Some(dashboard) = &config.dashboard {
            sections.push(ConfigSection::Dashboard(dashboard.clone()));
        }

        debug!(sections = sections.len(), "publishing configuration");
        for section in sections {
            store.load_config(section);
        }
        if config.right_sidebar.is_visible_default {
            store.update_ui_visibility(UiComponent::RightSidebar, true);
        }
    }

    fn init_localization(&self) -> Result<Arc<Localization>, BootstrapError> {
        let flavor = &self.config.flavor;
        if flavor.default_language.code.is_empty() {
            return Err(BootstrapError::Localization(ClientError::Misconfiguration(
                "flavor.defaultLanguage.code is empty".into(),
            )));
        }

        let resources = self
            .resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_default();
        let options = LocalizationOptions {
            default_language: flavor.default_language.clone(),
            available_languages: flavor.available_languages.clone(),
            translation_timeout: self.options.translation_timeout,
        };
        Ok(Arc::new(Localization::init(
            options,
            resources,
            Arc::clone(&self.deps.translator),
        )))
    }
}

/// A mounted application: startup data, installed listeners and the
/// background place loading task.
#[derive(Debug)]
pub struct MountedApp {
    bootstrapped: Bootstrapped,
    listeners: InstalledListeners,
    places: Option<JoinHandle<PlaceLoadSummary>>,
}

impl MountedApp {
    /// Loaded datasets in configuration order.
    #[must_use]
    pub fn datasets(&self) -> &[Dataset] {
        &self.bootstrapped.datasets
    }

    /// The current user.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.bootstrapped.user
    }

    /// Initialized localization.
    #[must_use]
    pub fn localization(&self) -> &Arc<Localization> {
        &self.bootstrapped.localization
    }

    /// Per-step outcomes.
    #[must_use]
    pub fn report(&self) -> &BootstrapReport {
        &self.bootstrapped.report
    }

    /// Returns `true` until [`Self::unmount`].
    #[must_use]
    pub fn listeners_installed(&self) -> bool {
        self.listeners.is_installed()
    }

    /// Waits for place loading to settle. Returns `None` when it was already
    /// awaited or the task ended abnormally.
    pub async fn places_loaded(&mut self) -> Option<PlaceLoadSummary> {
        let task = self.places.take()?;
        match task.await {
            Ok(summary) => Some(summary),
            Err(err) => {
                warn!(error = %err, "place loading task ended abnormally");
                None
            }
        }
    }

    /// Removes the global listeners. Place loading, if still running, is
    /// left to finish so the load status still settles.
    pub fn unmount(mut self) {
        self.listeners.dispose();
        info!("application unmounted");
    }
}
