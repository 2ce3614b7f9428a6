//! State container contract.
//!
//! The bootstrap publishes its results through named load and update
//! operations. Implementations apply each call atomically.

use crate::config::{AppConfig, FlavorConfig, PageConfig, RightSidebarConfig, SectionConfig};
use crate::dataset::Dataset;
use crate::forms::Form;
use crate::host::Layout;
use crate::place::{PlacePage, PlacesLoadStatus};
use crate::user::User;

/// One independently published configuration section.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSection {
    /// Application settings.
    App(AppConfig),
    /// Map settings.
    Map(SectionConfig),
    /// Left sidebar settings.
    LeftSidebar(SectionConfig),
    /// Right sidebar settings.
    RightSidebar(RightSidebarConfig),
    /// Featured places.
    FeaturedPlaces(SectionConfig),
    /// Support settings.
    Support(SectionConfig),
    /// Custom pages.
    Pages(Vec<PageConfig>),
    /// Navigation bar settings.
    NavBar(SectionConfig),
    /// Custom component overrides.
    CustomComponents(SectionConfig),
    /// Map styling, resolved against the loaded datasets.
    MapStyle {
        /// Style settings.
        style: SectionConfig,
        /// Datasets the style refers to.
        datasets: Vec<Dataset>,
    },
    /// Dashboard settings.
    Dashboard(SectionConfig),
    /// Deployment settings.
    Flavor(FlavorConfig),
}

impl ConfigSection {
    /// Stable section name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::App(_) => "app",
            Self::Map(_) => "map",
            Self::LeftSidebar(_) => "left_sidebar",
            Self::RightSidebar(_) => "right_sidebar",
            Self::FeaturedPlaces(_) => "featured_places",
            Self::Support(_) => "support",
            Self::Pages(_) => "pages",
            Self::NavBar(_) => "nav_bar",
            Self::CustomComponents(_) => "custom_components",
            Self::MapStyle { .. } => "map_style",
            Self::Dashboard(_) => "dashboard",
            Self::Flavor(_) => "flavor",
        }
    }
}

/// UI regions whose visibility is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiComponent {
    /// The right sidebar.
    RightSidebar,
    /// The content panel.
    ContentPanel,
}

/// Global state container fed by the bootstrap.
pub trait Store: Send + Sync {
    /// Publishes the loaded datasets, in configuration order.
    fn load_datasets(&self, datasets: Vec<Dataset>);

    /// Publishes the merged form definitions.
    fn load_forms(&self, forms: Vec<Form>);

    /// Publishes the current user with the datasets its permissions refer to.
    fn load_user(&self, user: User, datasets: &[Dataset]);

    /// Publishes one configuration section.
    fn load_config(&self, section: ConfigSection);

    /// Shows or hides a UI region.
    fn update_ui_visibility(&self, component: UiComponent, visible: bool);

    /// Records the current layout.
    fn update_layout(&self, layout: Layout);

    /// Records the global places load status.
    fn update_places_load_status(&self, status: PlacesLoadStatus);

    /// Publishes one page of places for `dataset`.
    fn load_places(&self, page: PlacePage, dataset: &Dataset);
}
