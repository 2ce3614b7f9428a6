//! In-memory application state fed by the bootstrap.
//!
//! [`AppStore`] implements the [`Store`] contract. Every load or update
//! replaces its slice of state under one write lock, so readers never see a
//! half-applied call. Selectors return owned snapshots.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use mapseed_core::config::{
    AppConfig, FlavorConfig, PageConfig, PlaceFilterConfig, RightSidebarConfig, SectionConfig,
};
use mapseed_core::dataset::Dataset;
use mapseed_core::forms::Form;
use mapseed_core::host::Layout;
use mapseed_core::place::{Place, PlacePage, PlacesLoadStatus};
use mapseed_core::store::{ConfigSection, Store, UiComponent};
use mapseed_core::user::{self, User};
use tracing::debug;

/// Map styling bound to the datasets it was resolved against.
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    /// Style settings.
    pub style: SectionConfig,
    /// Client slugs of the datasets the style covers, in configuration order.
    pub dataset_client_slugs: Vec<String>,
}

#[derive(Debug, Default)]
struct AppState {
    datasets: Vec<Dataset>,
    forms: Vec<Form>,
    user: Option<User>,
    app: Option<AppConfig>,
    flavor: Option<FlavorConfig>,
    map: SectionConfig,
    left_sidebar: SectionConfig,
    right_sidebar: RightSidebarConfig,
    featured_places: Option<SectionConfig>,
    support: SectionConfig,
    pages: Vec<PageConfig>,
    nav_bar: SectionConfig,
    custom_components: SectionConfig,
    map_style: Option<MapStyle>,
    dashboard: Option<SectionConfig>,
    visibility: HashMap<UiComponent, bool>,
    layout: Layout,
    places_status: PlacesLoadStatus,
    places: HashMap<(String, String), Vec<Place>>,
}

/// Typed state container for the client.
#[derive(Debug, Default)]
pub struct AppStore {
    state: RwLock<AppState>,
}

impl AppStore {
    /// Empty store: no datasets, no user, desktop layout, places unloaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loaded datasets in configuration order.
    #[must_use]
    pub fn datasets(&self) -> Vec<Dataset> {
        self.read().datasets.clone()
    }

    /// The dataset routed as `client_slug`.
    #[must_use]
    pub fn dataset_by_client_slug(&self, client_slug: &str) -> Option<Dataset> {
        self.read()
            .datasets
            .iter()
            .find(|dataset| dataset.client_slug == client_slug)
            .cloned()
    }

    /// The current user, once loaded.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Merged form definitions.
    #[must_use]
    pub fn forms(&self) -> Vec<Form> {
        self.read().forms.clone()
    }

    /// Application settings, once loaded.
    #[must_use]
    pub fn app_config(&self) -> Option<AppConfig> {
        self.read().app.clone()
    }

    /// Deployment settings, once loaded.
    #[must_use]
    pub fn flavor_config(&self) -> Option<FlavorConfig> {
        self.read().flavor.clone()
    }

    /// Configured place filters; empty before the flavor section is loaded.
    #[must_use]
    pub fn place_filters(&self) -> Vec<PlaceFilterConfig> {
        self.read()
            .flavor
            .as_ref()
            .map(|flavor| flavor.place_filters.clone())
            .unwrap_or_default()
    }

    /// Returns `true` if a custom page is configured under `slug`.
    #[must_use]
    pub fn page_exists(&self, slug: &str) -> bool {
        self.read().pages.iter().any(|page| page.slug == slug)
    }

    /// Custom page settings.
    #[must_use]
    pub fn pages(&self) -> Vec<PageConfig> {
        self.read().pages.clone()
    }

    /// Places published for the dataset `dataset_slug` owned by `user`, in
    /// publication order.
    #[must_use]
    pub fn places(&self, user: &str, dataset_slug: &str) -> Vec<Place> {
        self.read()
            .places
            .get(&(user.to_owned(), dataset_slug.to_owned()))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of places published across all datasets.
    #[must_use]
    pub fn place_count(&self) -> usize {
        self.read().places.values().map(Vec::len).sum()
    }

    /// Global places load status.
    #[must_use]
    pub fn places_load_status(&self) -> PlacesLoadStatus {
        self.read().places_status
    }

    /// Current layout.
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.read().layout
    }

    /// Whether `component` is shown. Regions start hidden.
    #[must_use]
    pub fn is_visible(&self, component: UiComponent) -> bool {
        self.read()
            .visibility
            .get(&component)
            .copied()
            .unwrap_or(false)
    }

    /// Datasets the current user may add places to. An unloaded user is
    /// treated as anonymous.
    #[must_use]
    pub fn datasets_with_create_places_ability(&self) -> Vec<Dataset> {
        let state = self.read();
        match &state.user {
            Some(current) => user::datasets_with_create_places_ability(current, &state.datasets),
            None => user::datasets_with_create_places_ability(
                &User::anonymous(None),
                &state.datasets,
            ),
        }
    }

    /// Datasets whose protected places the current user may read.
    #[must_use]
    pub fn datasets_with_access_protected_places_ability(&self) -> Vec<Dataset> {
        let state = self.read();
        state.user.as_ref().map_or_else(Vec::new, |current| {
            user::datasets_with_access_protected_places_ability(current, &state.datasets)
        })
    }

    /// Map styling, once loaded.
    #[must_use]
    pub fn map_style(&self) -> Option<MapStyle> {
        self.read().map_style.clone()
    }

    /// Dashboard settings, if the deployment enables a dashboard.
    #[must_use]
    pub fn dashboard_config(&self) -> Option<SectionConfig> {
        self.read().dashboard.clone()
    }

    /// Featured places settings, if the deployment enables them.
    #[must_use]
    pub fn featured_places_config(&self) -> Option<SectionConfig> {
        self.read().featured_places.clone()
    }

    /// Map settings.
    #[must_use]
    pub fn map_config(&self) -> SectionConfig {
        self.read().map.clone()
    }

    /// Left sidebar settings.
    #[must_use]
    pub fn left_sidebar_config(&self) -> SectionConfig {
        self.read().left_sidebar.clone()
    }

    /// Right sidebar settings.
    #[must_use]
    pub fn right_sidebar_config(&self) -> RightSidebarConfig {
        self.read().right_sidebar.clone()
    }

    /// Support settings.
    #[must_use]
    pub fn support_config(&self) -> SectionConfig {
        self.read().support.clone()
    }

    /// Navigation bar settings.
    #[must_use]
    pub fn nav_bar_config(&self) -> SectionConfig {
        self.read().nav_bar.clone()
    }

    /// Custom component overrides.
    #[must_use]
    pub fn custom_components_config(&self) -> SectionConfig {
        self.read().custom_components.clone()
    }
}

impl Store for AppStore {
    fn load_datasets(&self, datasets: Vec<Dataset>) {
        self.write().datasets = datasets;
    }

    fn load_forms(&self, forms: Vec<Form>) {
        self.write().forms = forms;
    }

    fn load_user(&self, user: User, datasets: &[Dataset]) {
        debug!(
            token = %user.token,
            datasets = datasets.len(),
            "user loaded"
        );
        self.write().user = Some(user);
    }

    fn load_config(&self, section: ConfigSection) {
        let mut state = self.write();
        match section {
            ConfigSection::App(app) => state.app = Some(app),
            ConfigSection::Map(map) => state.map = map,
            ConfigSection::LeftSidebar(config) => state.left_sidebar = config,
            ConfigSection::RightSidebar(config) => state.right_sidebar = config,
            ConfigSection::FeaturedPlaces(config) => state.featured_places = Some(config),
            ConfigSection::Support(config) => state.support = config,
            ConfigSection::Pages(pages) => state.pages = pages,
            ConfigSection::NavBar(config) => state.nav_bar = config,
            ConfigSection::CustomComponents(config) => state.custom_components = config,
            ConfigSection::MapStyle { style, datasets } => {
                state.map_style = Some(MapStyle {
                    style,
                    dataset_client_slugs: datasets
                        .into_iter()
                        .map(|dataset| dataset.client_slug)
                        .collect(),
                });
            }
            ConfigSection::Dashboard(config) => state.dashboard = Some(config),
            ConfigSection::Flavor(flavor) => state.flavor = Some(flavor),
        }
    }

    fn update_ui_visibility(&self, component: UiComponent, visible: bool) {
        self.write().visibility.insert(component, visible);
    }

    fn update_layout(&self, layout: Layout) {
        self.write().layout = layout;
    }

    fn update_places_load_status(&self, status: PlacesLoadStatus) {
        self.write().places_status = status;
    }

    fn load_places(&self, page: PlacePage, dataset: &Dataset) {
        self.write()
            .places
            .entry((dataset.user.clone(), dataset.dataset_slug.clone()))
            .or_default()
            .extend(page.places);
    }
}

#[cfg(test)]
mod tests {
    use mapseed_core::dataset::{DatasetConfig, DatasetRecord, Permission};
    use mapseed_core::user::UserRecord;
    use serde_json::{Value, json};

    use super::*;

    fn dataset(slug: &str, anonymous_create: bool) -> Dataset {
        let anonymous_permissions = if anonymous_create {
            vec![serde_json::from_value::<Permission>(json!({
                "abilities": ["create"],
                "submission_set": "places"
            }))
            .unwrap()]
        } else {
            Vec::new()
        };
        Dataset::merge(
            DatasetRecord::default(),
            &DatasetConfig {
                dataset_slug: slug.into(),
                user: "alice".into(),
                client_slug: format!("{slug}-client"),
                anonymous_permissions,
                place_confirmation_modal: None,
            },
            "http://api.test/",
        )
    }

    fn place(id: u64) -> Place {
        Place(json!({"id": id, "type": "Feature"}))
    }

    #[test]
    fn test_new_store_starts_empty() {
        let store = AppStore::new();

        assert!(store.datasets().is_empty());
        assert!(store.user().is_none());
        assert_eq!(store.layout(), Layout::Desktop);
        assert_eq!(store.places_load_status(), PlacesLoadStatus::Unloaded);
        assert!(!store.is_visible(UiComponent::RightSidebar));
        assert!(store.place_filters().is_empty());
    }

    #[test]
    fn test_dataset_by_client_slug_finds_loaded_dataset() {
        // Arrange
        let store = AppStore::new();
        store.load_datasets(vec![dataset("trees", false), dataset("bikes", false)]);

        // Act
        let found = store.dataset_by_client_slug("bikes-client");
        let missing = store.dataset_by_client_slug("bikes");

        // Assert
        assert_eq!(found.map(|d| d.dataset_slug), Some("bikes".to_owned()));
        assert!(missing.is_none());
    }

    #[test]
    fn test_create_ability_treats_unloaded_user_as_anonymous() {
        // Arrange
        let store = AppStore::new();
        store.load_datasets(vec![dataset("trees", true), dataset("bikes", false)]);

        // Act
        let creatable = store.datasets_with_create_places_ability();

        // Assert
        assert_eq!(creatable.len(), 1);
        assert_eq!(creatable[0].dataset_slug, "trees");
        assert!(store.datasets_with_access_protected_places_ability().is_empty());
    }

    #[test]
    fn test_protected_access_follows_group_permissions() {
        // Arrange
        let store = AppStore::new();
        let trees = dataset("trees", false);
        store.load_datasets(vec![trees.clone()]);
        let record: UserRecord = serde_json::from_value(json!({
            "id": 3,
            "username": "ada",
            "groups": [{
                "dataset": trees.url(),
                "name": "administrators",
                "permissions": [{"abilities": ["can_access_protected", "create"], "submission_set": "places"}]
            }]
        }))
        .unwrap();

        // Act
        store.load_user(User::authenticated(record), &[trees]);

        // Assert
        assert_eq!(store.datasets_with_access_protected_places_ability().len(), 1);
        assert_eq!(store.datasets_with_create_places_ability().len(), 1);
        assert_eq!(store.user().and_then(|u| u.id), Some(3));
    }

    #[test]
    fn test_load_config_sections_feed_their_selectors() {
        // Arrange
        let store = AppStore::new();
        let flavor: FlavorConfig = serde_json::from_value(json!({
            "slug": "seedmap",
            "placeFilters": [{
                "placeProperty": "species",
                "operator": "includes",
                "datasetSlug": "trees",
                "value": "oak",
                "label": "Oaks"
            }]
        }))
        .unwrap();
        let pages: Vec<PageConfig> =
            serde_json::from_value(json!([{"slug": "about", "title": "About"}])).unwrap();

        // Act
        store.load_config(ConfigSection::Flavor(flavor));
        store.load_config(ConfigSection::Pages(pages));
        store.load_config(ConfigSection::Dashboard(SectionConfig(json!({"title": "Stats"}))));
        store.load_config(ConfigSection::MapStyle {
            style: SectionConfig(json!({"layers": []})),
            datasets: vec![dataset("trees", false)],
        });

        // Assert
        assert_eq!(store.place_filters()[0].label, "Oaks");
        assert!(store.page_exists("about"));
        assert!(!store.page_exists("contact"));
        assert_eq!(
            store.dashboard_config().map(|d| d.0["title"].clone()),
            Some(Value::from("Stats"))
        );
        assert!(store.featured_places_config().is_none());
        assert_eq!(
            store.map_style().map(|s| s.dataset_client_slugs),
            Some(vec!["trees-client".to_owned()])
        );
    }

    #[test]
    fn test_load_places_appends_pages_per_dataset() {
        // Arrange
        let store = AppStore::new();
        let trees = dataset("trees", false);
        let bikes = dataset("bikes", false);

        // Act
        store.load_places(
            PlacePage {
                page: 1,
                num_pages: 2,
                places: vec![place(1), place(2)],
            },
            &trees,
        );
        store.load_places(
            PlacePage {
                page: 2,
                num_pages: 2,
                places: vec![place(3)],
            },
            &trees,
        );
        store.load_places(
            PlacePage {
                page: 1,
                num_pages: 1,
                places: vec![place(9)],
            },
            &bikes,
        );

        // Assert
        let ids: Vec<Option<u64>> = store
            .places("alice", "trees")
            .iter()
            .map(Place::id)
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(store.place_count(), 4);
        assert!(store.places("alice", "unknown").is_empty());
    }

    #[test]
    fn test_places_are_kept_apart_for_same_slug_under_different_owners() {
        // Arrange
        let store = AppStore::new();
        let alices = dataset("reports", false);
        let mut bobs = dataset("reports", false);
        bobs.user = "bob".into();

        // Act
        store.load_places(
            PlacePage {
                page: 1,
                num_pages: 1,
                places: vec![place(1)],
            },
            &alices,
        );
        store.load_places(
            PlacePage {
                page: 1,
                num_pages: 1,
                places: vec![place(2), place(3)],
            },
            &bobs,
        );

        // Assert
        let alice_ids: Vec<Option<u64>> = store
            .places("alice", "reports")
            .iter()
            .map(Place::id)
            .collect();
        assert_eq!(alice_ids, vec![Some(1)]);
        assert_eq!(store.places("bob", "reports").len(), 2);
        assert_eq!(store.place_count(), 3);
    }

    #[test]
    fn test_visibility_and_layout_updates() {
        let store = AppStore::new();

        store.update_ui_visibility(UiComponent::RightSidebar, true);
        store.update_layout(Layout::Mobile);
        store.update_places_load_status(PlacesLoadStatus::Loading);

        assert!(store.is_visible(UiComponent::RightSidebar));
        assert!(!store.is_visible(UiComponent::ContentPanel));
        assert_eq!(store.layout(), Layout::Mobile);
        assert_eq!(store.places_load_status(), PlacesLoadStatus::Loading);
    }
}
