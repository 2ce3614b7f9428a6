//! Top-level view selection.
//!
//! [`App`] decides what the shell shows: a loading indicator until startup
//! settles, an error view when it fails, and otherwise the template for the
//! current location.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use mapseed_bootstrap::{BootstrapStatus, BootstrapStep, Readiness};
use mapseed_core::config::Language;
use mapseed_core::history::History;
use mapseed_core::host::Layout;
use mapseed_i18n::Localization;
use tracing::{info, warn};

use crate::routes::{Route, Template};
use crate::state::AppStore;

/// CSS overflow mode of the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Content may spill over, so multi-page reports print in full.
    Visible,
    /// The shell never scrolls; panels scroll themselves.
    Hidden,
    /// The shell scrolls when needed.
    Auto,
}

impl Overflow {
    /// Overflow for `template` under `layout`.
    #[must_use]
    pub fn for_view(template: Template, layout: Layout) -> Self {
        match (template, layout) {
            (Template::Report, _) => Self::Visible,
            (_, Layout::Desktop) => Self::Hidden,
            (_, Layout::Mobile) => Self::Auto,
        }
    }

    /// The CSS keyword.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Auto => "auto",
        }
    }
}

/// Language menu state.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageState {
    /// Current language code.
    pub current: String,
    /// Language of configured content.
    pub default: Language,
    /// Other languages offered.
    pub available: Vec<Language>,
}

/// Everything the shell needs to render a ready application.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    /// The route being rendered.
    pub route: Route,
    /// Template chosen by the route.
    pub template: Template,
    /// Whether the site header is shown.
    pub show_header: bool,
    /// Shell overflow mode.
    pub overflow: Overflow,
    /// Whether the cookie consent banner is shown.
    pub show_cookie_consent: bool,
    /// Slug of the custom page opened in the content panel, when the route
    /// names a configured page.
    pub content_page: Option<String>,
    /// Language menu state; absent until localization is attached.
    pub language: Option<LanguageState>,
    /// Whether the start page was already shown this session.
    pub start_page_viewed: bool,
}

/// What the shell shows.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Startup is still running.
    Loading,
    /// Startup failed; nothing interactive can be shown.
    Error {
        /// Step that failed.
        step: BootstrapStep,
        /// Reason shown to the user.
        message: String,
    },
    /// The application is ready.
    Page(Box<PageView>),
}

/// Application shell state.
pub struct App {
    store: Arc<AppStore>,
    history: Arc<dyn History>,
    readiness: Readiness,
    localization: OnceLock<Arc<Localization>>,
    start_page_viewed: AtomicBool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("location", &self.history.location().pathname)
            .field("readiness", &self.readiness.status())
            .field("start_page_viewed", &self.is_start_page_viewed())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Creates the shell over `store`, navigating through `history` and
    /// gated by `readiness`.
    #[must_use]
    pub fn new(store: Arc<AppStore>, history: Arc<dyn History>, readiness: Readiness) -> Self {
        Self {
            store,
            history,
            readiness,
            localization: OnceLock::new(),
            start_page_viewed: AtomicBool::new(false),
        }
    }

    /// Attaches localization once startup produced it. Later calls are
    /// ignored.
    pub fn attach_localization(&self, localization: Arc<Localization>) {
        if self.localization.set(localization).is_err() {
            warn!("localization already attached");
        }
    }

    /// Selects the current view.
    ///
    /// On `/new` with no dataset accepting new places, navigates to `/` and
    /// renders the map.
    #[must_use]
    pub fn view(&self) -> View {
        match self.readiness.status() {
            BootstrapStatus::Loading => View::Loading,
            BootstrapStatus::Failed { step, message } => View::Error { step, message },
            BootstrapStatus::Ready => View::Page(Box::new(self.page_view())),
        }
    }

    fn page_view(&self) -> PageView {
        let mut route = Route::parse(&self.history.location().pathname);
        if matches!(route, Route::NewPlace { .. })
            && self.store.datasets_with_create_places_ability().is_empty()
        {
            info!("no dataset accepts new places; redirecting to the map");
            self.history.push("/");
            route = Route::Map;
        }

        let template = route.template();
        let content_page = match &route {
            Route::Page { page_slug } if self.store.page_exists(page_slug) => {
                Some(page_slug.clone())
            }
            _ => None,
        };

        PageView {
            template,
            show_header: route.shows_header(),
            overflow: Overflow::for_view(template, self.store.layout()),
            show_cookie_consent: self
                .store
                .app_config()
                .is_some_and(|app| app.enable_cookie_consent),
            content_page,
            language: self.language_state(),
            start_page_viewed: self.is_start_page_viewed(),
            route,
        }
    }

    fn language_state(&self) -> Option<LanguageState> {
        self.localization.get().map(|localization| LanguageState {
            current: localization.language(),
            default: localization.default_language().clone(),
            available: localization.available_languages().to_vec(),
        })
    }

    /// Switches the UI language. Returns `false` when localization is not
    /// attached yet or `code` is not one of the offered languages.
    pub fn change_language(&self, code: &str) -> bool {
        let Some(localization) = self.localization.get() else {
            warn!(language = code, "language change before localization");
            return false;
        };
        let offered = localization.default_language().code == code
            || localization
                .available_languages()
                .iter()
                .any(|language| language.code == code);
        if !offered {
            warn!(language = code, "language not offered");
            return false;
        }
        localization.change_language(code);
        true
    }

    /// Records that the start page was shown.
    pub fn view_start_page(&self) {
        self.start_page_viewed.store(true, Ordering::Relaxed);
    }

    /// Whether the start page was already shown.
    #[must_use]
    pub fn is_start_page_viewed(&self) -> bool {
        self.start_page_viewed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mapseed_core::config::{AppConfig, PageConfig};
    use mapseed_core::dataset::{
        Ability, Dataset, DatasetConfig, DatasetRecord, PLACES_SUBMISSION_SET, Permission,
    };
    use mapseed_core::history::MemoryHistory;
    use mapseed_core::store::{ConfigSection, Store};
    use mapseed_i18n::{LocalizationOptions, ResourceBundle};
    use mapseed_test_support::FakeTranslationService;
    use serde_json::Map;

    use super::*;

    fn dataset(anonymous_create: bool) -> Dataset {
        let anonymous_permissions = if anonymous_create {
            vec![Permission {
                abilities: vec![Ability::Create],
                submission_set: PLACES_SUBMISSION_SET.into(),
            }]
        } else {
            Vec::new()
        };
        Dataset::merge(
            DatasetRecord::default(),
            &DatasetConfig {
                dataset_slug: "trees".into(),
                user: "alice".into(),
                client_slug: "street-trees".into(),
                anonymous_permissions,
                place_confirmation_modal: None,
            },
            "http://api.test/",
        )
    }

    fn ready_app(path: &str) -> (App, Arc<AppStore>, Arc<MemoryHistory>) {
        let store = Arc::new(AppStore::new());
        let history = Arc::new(MemoryHistory::new(path));
        let readiness = Readiness::new();
        readiness.mark_ready();
        let app = App::new(Arc::clone(&store), history.clone(), readiness);
        (app, store, history)
    }

    fn localization() -> Arc<Localization> {
        Arc::new(Localization::init(
            LocalizationOptions {
                default_language: Language::default(),
                available_languages: vec![Language {
                    code: "es".into(),
                    label: "Español".into(),
                }],
                translation_timeout: Duration::from_secs(1),
            },
            ResourceBundle::new(),
            Arc::new(FakeTranslationService::returning_nothing()),
        ))
    }

    fn page(view: View) -> PageView {
        match view {
            View::Page(page) => *page,
            other => panic!("expected a page view, got {other:?}"),
        }
    }

    #[test]
    fn test_view_follows_readiness() {
        // Arrange
        let store = Arc::new(AppStore::new());
        let readiness = Readiness::new();
        let app = App::new(store, Arc::new(MemoryHistory::new("/")), readiness.clone());

        // Act
        let loading = app.view();
        readiness.fail(BootstrapStep::Datasets, "no dataset could be loaded");
        let failed = app.view();

        // Assert
        assert_eq!(loading, View::Loading);
        assert_eq!(
            failed,
            View::Error {
                step: BootstrapStep::Datasets,
                message: "no dataset could be loaded".into()
            }
        );
    }

    #[test]
    fn test_new_place_without_creatable_dataset_redirects_home() {
        // Arrange
        let (app, store, history) = ready_app("/new/report");
        store.load_datasets(vec![dataset(false)]);

        // Act
        let view = page(app.view());

        // Assert
        assert_eq!(view.route, Route::Map);
        assert_eq!(history.pushed(), vec!["/".to_owned()]);
    }

    #[test]
    fn test_new_place_with_creatable_dataset_renders_map() {
        // Arrange
        let (app, store, history) = ready_app("/new");
        store.load_datasets(vec![dataset(true)]);

        // Act
        let view = page(app.view());

        // Assert
        assert_eq!(view.route, Route::NewPlace { form_id: None });
        assert_eq!(view.template, Template::Map);
        assert!(history.pushed().is_empty());
    }

    #[test]
    fn test_overflow_depends_on_template_and_layout() {
        assert_eq!(
            Overflow::for_view(Template::Report, Layout::Desktop),
            Overflow::Visible
        );
        assert_eq!(
            Overflow::for_view(Template::Map, Layout::Desktop),
            Overflow::Hidden
        );
        assert_eq!(Overflow::for_view(Template::List, Layout::Mobile), Overflow::Auto);
        assert_eq!(Overflow::Hidden.as_css(), "hidden");
    }

    #[test]
    fn test_report_route_hides_header_and_overflows() {
        // Arrange
        let (app, store, _history) = ready_app("/print-report/street-trees/42");
        store.update_layout(Layout::Mobile);

        // Act
        let view = page(app.view());

        // Assert
        assert_eq!(view.template, Template::Report);
        assert!(!view.show_header);
        assert_eq!(view.overflow, Overflow::Visible);
    }

    #[test]
    fn test_cookie_consent_and_content_page_come_from_config() {
        // Arrange
        let (app, store, _history) = ready_app("/page/about");
        store.load_config(ConfigSection::App(AppConfig {
            title: "Seed Map".into(),
            api_root: "http://api.test/".into(),
            enable_cookie_consent: true,
            attributes: Map::new(),
        }));
        store.load_config(ConfigSection::Pages(vec![PageConfig {
            slug: "about".into(),
            attributes: Map::new(),
        }]));

        // Act
        let view = page(app.view());

        // Assert
        assert!(view.show_cookie_consent);
        assert_eq!(view.content_page.as_deref(), Some("about"));
        assert_eq!(view.template, Template::Map);
    }

    #[test]
    fn test_unknown_page_renders_map_without_content() {
        let (app, _store, _history) = ready_app("/page/missing");

        let view = page(app.view());

        assert!(view.content_page.is_none());
        assert_eq!(view.template, Template::Map);
    }

    #[test]
    fn test_change_language_accepts_offered_languages_only() {
        // Arrange
        let (app, _store, _history) = ready_app("/");
        let before = app.change_language("es");
        app.attach_localization(localization());

        // Act
        let changed = app.change_language("es");
        let rejected = app.change_language("fr");

        // Assert
        assert!(!before);
        assert!(changed);
        assert!(!rejected);
        let language = page(app.view()).language.unwrap();
        assert_eq!(language.current, "es");
        assert_eq!(language.default.code, "en");
    }

    #[test]
    fn test_start_page_viewed_flag() {
        let (app, _store, _history) = ready_app("/");
        assert!(!page(app.view()).start_page_viewed);

        app.view_start_page();

        assert!(page(app.view()).start_page_viewed);
    }
}
