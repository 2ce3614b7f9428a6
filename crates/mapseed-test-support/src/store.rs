//! Recording store — a `Store` that logs every publication.

use std::sync::Mutex;

use mapseed_core::dataset::Dataset;
use mapseed_core::forms::Form;
use mapseed_core::host::Layout;
use mapseed_core::place::{PlacePage, PlacesLoadStatus};
use mapseed_core::store::{ConfigSection, Store, UiComponent};
use mapseed_core::user::User;

use crate::journal::Journal;

/// One call received by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    /// `load_datasets`, with the dataset slugs in order.
    Datasets(Vec<String>),
    /// `load_forms`, with the form ids in order.
    Forms(Vec<String>),
    /// `load_user`.
    User(User),
    /// `load_config`.
    Config(ConfigSection),
    /// `update_ui_visibility`.
    UiVisibility(UiComponent, bool),
    /// `update_layout`.
    Layout(Layout),
    /// `update_places_load_status`.
    PlacesLoadStatus(PlacesLoadStatus),
    /// `load_places`, with the dataset slug and page number.
    Places {
        /// Owning dataset.
        dataset_slug: String,
        /// Page number.
        page: u32,
        /// Number of places on the page.
        count: usize,
    },
}

/// A store that records every call in order and keeps the loaded datasets.
///
/// Calls are also written to the journal as `store:<operation>`.
#[derive(Debug, Default)]
pub struct RecordingStore {
    journal: Journal,
    actions: Mutex<Vec<StoreAction>>,
    datasets: Mutex<Vec<Dataset>>,
}

impl RecordingStore {
    /// Create an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes calls to `journal` instead of a private one.
    #[must_use]
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Returns a snapshot of all recorded actions.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn actions(&self) -> Vec<StoreAction> {
        self.actions.lock().unwrap().clone()
    }

    /// Returns the datasets from the last `load_datasets` call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn datasets(&self) -> Vec<Dataset> {
        self.datasets.lock().unwrap().clone()
    }

    /// Returns the user from the last `load_user` call.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.actions().into_iter().rev().find_map(|action| match action {
            StoreAction::User(user) => Some(user),
            _ => None,
        })
    }

    /// Returns the names of all published configuration sections.
    #[must_use]
    pub fn config_sections(&self) -> Vec<&'static str> {
        self.actions()
            .iter()
            .filter_map(|action| match action {
                StoreAction::Config(section) => Some(section.name()),
                _ => None,
            })
            .collect()
    }

    /// Returns every places load status in the order it was set.
    #[must_use]
    pub fn load_statuses(&self) -> Vec<PlacesLoadStatus> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                StoreAction::PlacesLoadStatus(status) => Some(status),
                _ => None,
            })
            .collect()
    }

    /// Returns `(dataset_slug, page)` for every published place page.
    #[must_use]
    pub fn place_pages(&self) -> Vec<(String, u32)> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                StoreAction::Places {
                    dataset_slug, page, ..
                } => Some((dataset_slug, page)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, entry: String, action: StoreAction) {
        self.journal.record(entry);
        self.actions.lock().unwrap().push(action);
    }
}

impl Store for RecordingStore {
    fn load_datasets(&self, datasets: Vec<Dataset>) {
        let slugs = datasets.iter().map(|d| d.dataset_slug.clone()).collect();
        self.datasets.lock().unwrap().clone_from(&datasets);
        self.push("store:load_datasets".into(), StoreAction::Datasets(slugs));
    }

    fn load_forms(&self, forms: Vec<Form>) {
        let ids = forms.into_iter().map(|form| form.id).collect();
        self.push("store:load_forms".into(), StoreAction::Forms(ids));
    }

    fn load_user(&self, user: User, _datasets: &[Dataset]) {
        self.push("store:load_user".into(), StoreAction::User(user));
    }

    fn load_config(&self, section: ConfigSection) {
        self.push(
            format!("store:load_config:{}", section.name()),
            StoreAction::Config(section),
        );
    }

    fn update_ui_visibility(&self, component: UiComponent, visible: bool) {
        self.push(
            "store:update_ui_visibility".into(),
            StoreAction::UiVisibility(component, visible),
        );
    }

    fn update_layout(&self, layout: Layout) {
        self.push("store:update_layout".into(), StoreAction::Layout(layout));
    }

    fn update_places_load_status(&self, status: PlacesLoadStatus) {
        self.push(
            format!("store:places_status:{status:?}"),
            StoreAction::PlacesLoadStatus(status),
        );
    }

    fn load_places(&self, page: PlacePage, dataset: &Dataset) {
        self.push(
            format!("store:load_places:{}:{}", dataset.dataset_slug, page.page),
            StoreAction::Places {
                dataset_slug: dataset.dataset_slug.clone(),
                page: page.page,
                count: page.places.len(),
            },
        );
    }
}
