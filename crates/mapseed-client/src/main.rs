//! Mapseed client entry point.
//!
//! Starts the client against a live backend without a window system and
//! logs what the shell shows.

use std::error::Error;
use std::sync::Arc;

use mapseed_api_client::{HttpMapseedApi, HttpTranslationService};
use mapseed_bootstrap::BootstrapOptions;
use mapseed_client::{
    ClientRuntime, DisabledTranslationService, Services, Settings, TracingAnalytics, View,
};
use mapseed_core::translation::TranslationService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Mapseed client");

    // Read configuration from environment.
    let settings = Settings::from_env()?;
    let config = Arc::new(settings.load_config()?);
    let resources = settings.load_locales()?;

    // Build collaborators.
    let translator: Arc<dyn TranslationService> = match &settings.translate_url {
        Some(url) => Arc::new(HttpTranslationService::new(url)?),
        None => {
            tracing::info!("machine translation disabled");
            Arc::new(DisabledTranslationService)
        }
    };
    let services = Services {
        api: Arc::new(HttpMapseedApi::new(&config.app.api_root)?),
        translator,
        analytics: Arc::new(TracingAnalytics),
    };

    let runtime = ClientRuntime::new(
        config,
        resources,
        services,
        settings.viewport(),
        &settings.initial_path,
        BootstrapOptions::default(),
    );

    let mounted = runtime.mount().await;
    log_view(&runtime.app().view());
    let mut mounted = mounted?;

    if mounted.report().is_degraded() {
        tracing::warn!(steps = ?mounted.report().steps(), "started in degraded mode");
    }

    if let Some(summary) = mounted.places_loaded().await {
        tracing::info!(
            datasets_loaded = summary.datasets_loaded,
            datasets_failed = summary.datasets_failed,
            pages = summary.pages,
            places = summary.places,
            "places loaded"
        );
    }

    mounted.unmount();
    Ok(())
}

fn log_view(view: &View) {
    match view {
        View::Loading => tracing::info!("still loading"),
        View::Error { step, message } => {
            tracing::error!(step = %step, message = %message, "startup failed");
        }
        View::Page(page) => tracing::info!(
            route = ?page.route,
            template = %page.template,
            header = page.show_header,
            overflow = page.overflow.as_css(),
            cookie_consent = page.show_cookie_consent,
            "ready"
        ),
    }
}
