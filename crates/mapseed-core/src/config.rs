//! Flavor configuration document.
//!
//! Sections the client core reads are typed. Sections consumed only by
//! views are kept as opaque JSON.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dataset::DatasetConfig;
use crate::error::ClientError;
use crate::forms::FormRecord;

/// A configuration section passed through to views unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionConfig(pub Value);

impl SectionConfig {
    /// Returns `true` when the section was omitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_null()
    }
}

/// A selectable UI language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Language code, e.g. `en`.
    pub code: String,
    /// Human-readable label.
    pub label: String,
}

impl Default for Language {
    fn default() -> Self {
        Self {
            code: "en".to_owned(),
            label: "English".to_owned(),
        }
    }
}

/// Application-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Site title.
    #[serde(default)]
    pub title: String,
    /// Backend API root, ending in `/`.
    pub api_root: String,
    /// Show the cookie consent banner.
    #[serde(default)]
    pub enable_cookie_consent: bool,
    /// Remaining settings.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Comparison used by a place filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Property equals the value.
    Equals,
    /// Property (a list) includes the value.
    Includes,
}

/// A place filter offered in the map UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceFilterConfig {
    /// Place property compared by the filter.
    pub place_property: String,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Dataset the filter applies to.
    pub dataset_slug: String,
    /// String or number to compare with.
    pub value: Value,
    /// Label shown in the filter menu.
    pub label: String,
    /// Optional icon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Deployment ("flavor") settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlavorConfig {
    /// Flavor slug on the backend.
    pub slug: String,
    /// Datasets shown by this deployment.
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
    /// Supplemental form fields keyed by form id.
    #[serde(default)]
    pub forms: Vec<FormRecord>,
    /// Language of configured content.
    #[serde(default)]
    pub default_language: Language,
    /// Languages offered in the header.
    #[serde(default)]
    pub available_languages: Vec<Language>,
    /// Place filters.
    #[serde(default)]
    pub place_filters: Vec<PlaceFilterConfig>,
    /// Remaining settings.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Right sidebar settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RightSidebarConfig {
    /// Open the sidebar on startup.
    #[serde(default)]
    pub is_visible_default: bool,
    /// Remaining settings.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// A custom content page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Route slug, as in `/page/{slug}`.
    pub slug: String,
    /// Remaining settings.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// The whole client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Application settings.
    pub app: AppConfig,
    /// Deployment settings.
    pub flavor: FlavorConfig,
    /// Map settings.
    #[serde(default)]
    pub map: SectionConfig,
    /// Left sidebar settings.
    #[serde(default, rename = "leftSidebar")]
    pub left_sidebar: SectionConfig,
    /// Right sidebar settings.
    #[serde(default)]
    pub right_sidebar: RightSidebarConfig,
    /// Featured places, if enabled.
    #[serde(default, rename = "featuredPlaces")]
    pub featured_places: Option<SectionConfig>,
    /// Support settings.
    #[serde(default)]
    pub support: SectionConfig,
    /// Custom pages.
    #[serde(default)]
    pub pages: Vec<PageConfig>,
    /// Navigation bar settings.
    #[serde(default)]
    pub nav_bar: SectionConfig,
    /// Custom component overrides.
    #[serde(default)]
    pub custom_components: SectionConfig,
    /// Map styling keyed by dataset.
    #[serde(default, rename = "mapStyle")]
    pub map_style: SectionConfig,
    /// Dashboard settings, if enabled.
    #[serde(default)]
    pub dashboard: Option<SectionConfig>,
}

impl ClientConfig {
    /// Checks invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` if the API root is empty or
    /// lacks a trailing `/`, the default language code is empty, or two
    /// datasets share a client slug.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.app.api_root.is_empty() || !self.app.api_root.ends_with('/') {
            return Err(ClientError::Misconfiguration(format!(
                "app.apiRoot must end with '/': {:?}",
                self.app.api_root
            )));
        }
        if self.flavor.default_language.code.is_empty() {
            return Err(ClientError::Misconfiguration(
                "flavor.defaultLanguage.code must not be empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        for dataset in &self.flavor.datasets {
            if !seen.insert(dataset.client_slug.as_str()) {
                return Err(ClientError::Misconfiguration(format!(
                    "duplicate dataset clientSlug {:?}",
                    dataset.client_slug
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Value {
        json!({
            "app": {"title": "Seed Map", "apiRoot": "http://api.test/", "enableCookieConsent": true},
            "flavor": {
                "slug": "seedmap",
                "defaultLanguage": {"code": "en", "label": "English"},
                "availableLanguages": [{"code": "es", "label": "Español"}],
                "datasets": [{
                    "datasetSlug": "trees",
                    "user": "alice",
                    "clientSlug": "street-trees",
                    "anonymousPermissions": [{"abilities": ["create"], "submission_set": "places"}]
                }],
                "placeFilters": [{
                    "placeProperty": "species",
                    "operator": "equals",
                    "datasetSlug": "trees",
                    "value": "oak",
                    "label": "Oaks"
                }]
            },
            "right_sidebar": {"is_visible_default": true, "component": "StoryNavigator"},
            "pages": [{"slug": "about", "title": "About"}],
            "dashboard": null
        })
    }

    #[test]
    fn test_deserializes_typed_and_opaque_sections() {
        let config: ClientConfig = serde_json::from_value(sample()).unwrap();

        assert_eq!(config.app.api_root, "http://api.test/");
        assert!(config.app.enable_cookie_consent);
        assert_eq!(config.flavor.datasets[0].client_slug, "street-trees");
        assert_eq!(config.flavor.available_languages[0].code, "es");
        assert_eq!(config.flavor.place_filters[0].operator, FilterOperator::Equals);
        assert!(config.right_sidebar.is_visible_default);
        assert_eq!(config.right_sidebar.attributes["component"], "StoryNavigator");
        assert_eq!(config.pages[0].slug, "about");
        assert!(config.dashboard.is_none());
        assert!(config.featured_places.is_none());
        assert!(config.map.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_api_root_without_trailing_slash() {
        let mut config: ClientConfig = serde_json::from_value(sample()).unwrap();
        config.app.api_root = "http://api.test".into();

        assert!(matches!(
            config.validate(),
            Err(ClientError::Misconfiguration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_client_slugs() {
        let mut config: ClientConfig = serde_json::from_value(sample()).unwrap();
        let duplicate = config.flavor.datasets[0].clone();
        config.flavor.datasets.push(duplicate);

        assert!(matches!(
            config.validate(),
            Err(ClientError::Misconfiguration(_))
        ));
    }
}
