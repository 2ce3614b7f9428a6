//! Places: paginated backend content, loaded per dataset.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A place as served by the backend (a GeoJSON feature).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Place(pub Value);

impl Place {
    /// Backend identifier of the place, if present.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.0
            .get("id")
            .or_else(|| self.0.pointer("/properties/id"))
            .and_then(Value::as_u64)
    }
}

/// Parameters of a single place page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceQuery {
    /// Backend URL of the dataset.
    pub dataset_url: String,
    /// 1-based page number.
    pub page: u32,
    /// Embed comments and supports.
    pub include_submissions: bool,
    /// Embed tags.
    pub include_tags: bool,
    /// Include private places (requires protected access).
    pub include_private: bool,
}

impl PlaceQuery {
    /// Query for `page` of `dataset_url` with submissions and tags embedded.
    #[must_use]
    pub fn new(dataset_url: impl Into<String>, page: u32, include_private: bool) -> Self {
        Self {
            dataset_url: dataset_url.into(),
            page,
            include_submissions: true,
            include_tags: true,
            include_private,
        }
    }
}

/// One page of places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacePage {
    /// 1-based page number.
    pub page: u32,
    /// Total number of pages for the dataset.
    pub num_pages: u32,
    /// Places on this page.
    pub places: Vec<Place>,
}

/// Global load status of place data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacesLoadStatus {
    /// Loading has not started.
    #[default]
    Unloaded,
    /// Page requests are outstanding.
    Loading,
    /// Every page request has settled.
    Loaded,
}
