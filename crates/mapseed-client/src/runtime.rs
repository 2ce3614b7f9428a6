//! Wiring of the store, host, history and startup sequence.

use std::sync::Arc;

use mapseed_bootstrap::{BootstrapDeps, BootstrapOptions, MountedApp, Orchestrator};
use mapseed_core::analytics::Analytics;
use mapseed_core::api::MapseedApi;
use mapseed_core::config::ClientConfig;
use mapseed_core::cookies::MemoryCookieStore;
use mapseed_core::history::MemoryHistory;
use mapseed_core::host::{HeadlessHost, Viewport};
use mapseed_core::translation::TranslationService;
use mapseed_i18n::ResourceBundle;

use crate::app::App;
use crate::error::AppError;
use crate::state::AppStore;

/// External services the client talks to.
#[derive(Clone)]
pub struct Services {
    /// Backend API.
    pub api: Arc<dyn MapseedApi>,
    /// Machine translation for missing keys.
    pub translator: Arc<dyn TranslationService>,
    /// Analytics sink.
    pub analytics: Arc<dyn Analytics>,
}

/// A client instance without a window system.
pub struct ClientRuntime {
    store: Arc<AppStore>,
    host: Arc<HeadlessHost>,
    history: Arc<MemoryHistory>,
    orchestrator: Orchestrator,
    app: App,
}

impl std::fmt::Debug for ClientRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRuntime")
            .field("orchestrator", &self.orchestrator)
            .field("app", &self.app)
            .finish_non_exhaustive()
    }
}

impl ClientRuntime {
    /// Assembles a client for `config` starting at `initial_path`.
    #[must_use]
    pub fn new(
        config: Arc<ClientConfig>,
        resources: ResourceBundle,
        services: Services,
        viewport: Viewport,
        initial_path: &str,
        options: BootstrapOptions,
    ) -> Self {
        let store = Arc::new(AppStore::new());
        let host = Arc::new(HeadlessHost::new(viewport));
        let history = Arc::new(MemoryHistory::new(initial_path));
        let deps = BootstrapDeps {
            api: services.api,
            store: store.clone(),
            cookies: Arc::new(MemoryCookieStore::new()),
            analytics: services.analytics,
            translator: services.translator,
            host: host.clone(),
            history: history.clone(),
        };
        let orchestrator = Orchestrator::new(deps, config, resources, options);
        let app = App::new(Arc::clone(&store), history.clone(), orchestrator.readiness());

        Self {
            store,
            host,
            history,
            orchestrator,
            app,
        }
    }

    /// Runs the startup sequence and attaches its localization to the shell.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Bootstrap` when startup fails; the shell then
    /// shows the error view.
    pub async fn mount(&self) -> Result<MountedApp, AppError> {
        let mounted = self.orchestrator.mount().await?;
        self.app.attach_localization(Arc::clone(mounted.localization()));
        Ok(mounted)
    }

    /// The application shell.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The state container.
    #[must_use]
    pub fn store(&self) -> &Arc<AppStore> {
        &self.store
    }

    /// The host delivering resize and click events.
    #[must_use]
    pub fn host(&self) -> &HeadlessHost {
        &self.host
    }

    /// The navigation history.
    #[must_use]
    pub fn history(&self) -> &MemoryHistory {
        &self.history
    }
}
