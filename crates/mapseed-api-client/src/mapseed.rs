//! REST client for the Mapseed backend.

use async_trait::async_trait;
use mapseed_core::api::{MapseedApi, SessionRecord};
use mapseed_core::dataset::DatasetRecord;
use mapseed_core::error::ClientError;
use mapseed_core::forms::FlavorRecord;
use mapseed_core::place::{Place, PlacePage, PlaceQuery};
use mapseed_core::user::UserRecord;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::http::{cookie_client, ensure_success, optional_json, required_json, transport};

#[derive(Debug, Default, Deserialize)]
struct PageMetadata {
    page: Option<u32>,
    num_pages: Option<u32>,
}

/// GeoJSON feature collection with pagination metadata.
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Value>,
    #[serde(default)]
    metadata: Option<PageMetadata>,
}

/// Query string of a place page request. Flags are sent as bare keys.
fn place_query_string(query: &PlaceQuery) -> String {
    let flags = [
        ("include_submissions", query.include_submissions),
        ("include_tags", query.include_tags),
        ("include_private", query.include_private),
    ];
    let mut parts: Vec<String> = flags
        .iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(flag, _)| (*flag).to_owned())
        .collect();
    parts.push(format!("page={}", query.page));
    parts.push("format=json".to_owned());
    parts.join("&")
}

/// `MapseedApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMapseedApi {
    client: Client,
    api_root: String,
}

impl HttpMapseedApi {
    /// Creates a client for the backend rooted at `api_root` (ending in `/`)
    /// with its own cookie jar.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` if the HTTP client cannot be
    /// built.
    pub fn new(api_root: &str) -> Result<Self, ClientError> {
        Ok(Self::with_client(cookie_client()?, api_root))
    }

    /// Creates a client sharing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: Client, api_root: &str) -> Self {
        Self {
            client,
            api_root: api_root.to_owned(),
        }
    }

    /// The backend root URL.
    #[must_use]
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ClientError> {
        debug!(url, "GET");
        self.client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport(&e))
    }
}

#[async_trait]
impl MapseedApi for HttpMapseedApi {
    #[instrument(skip(self))]
    async fn session(&self) -> Result<Option<SessionRecord>, ClientError> {
        let url = format!("{}utils/session-key?format=json", self.api_root);
        let response = self.get(&url).await?;
        let status = response.status();
        if status.is_success() {
            return optional_json(response).await;
        }
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url,
            });
        }
        debug!(status = status.as_u16(), "backend issued no session");
        Ok(None)
    }

    #[instrument(skip(self))]
    async fn dataset(&self, owner: &str, dataset_slug: &str) -> Result<DatasetRecord, ClientError> {
        let url = format!("{}{owner}/datasets/{dataset_slug}", self.api_root);
        let response = ensure_success(self.get(&url).await?)?;
        required_json(response).await
    }

    #[instrument(skip(self))]
    async fn flavor(&self, flavor_slug: &str) -> Result<Option<FlavorRecord>, ClientError> {
        let url = format!("{}flavors/{flavor_slug}", self.api_root);
        let response = self.get(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        optional_json(ensure_success(response)?).await
    }

    #[instrument(skip(self))]
    async fn current_user(&self) -> Result<Option<UserRecord>, ClientError> {
        let url = format!("{}users/current", self.api_root);
        let response = self.get(&url).await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NO_CONTENT => Ok(None),
            _ => optional_json(ensure_success(response)?).await,
        }
    }

    #[instrument(skip(self, query), fields(dataset = %query.dataset_url, page = query.page))]
    async fn place_page(&self, query: &PlaceQuery) -> Result<PlacePage, ClientError> {
        let url = format!(
            "{}/places?{}",
            query.dataset_url.trim_end_matches('/'),
            place_query_string(query)
        );
        let response = ensure_success(self.get(&url).await?)?;
        let collection: FeatureCollection = required_json(response).await?;
        let metadata = collection.metadata.unwrap_or_default();

        Ok(PlacePage {
            page: metadata.page.unwrap_or(query.page),
            num_pages: metadata.num_pages.unwrap_or(1),
            places: collection.features.into_iter().map(Place).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_query_string_sends_flags_as_bare_keys() {
        let query = PlaceQuery::new("https://api.test/alice/datasets/trees", 3, true);

        assert_eq!(
            place_query_string(&query),
            "include_submissions&include_tags&include_private&page=3&format=json"
        );
    }

    #[test]
    fn test_place_query_string_omits_disabled_flags() {
        let query = PlaceQuery::new("https://api.test/alice/datasets/trees", 1, false);

        assert_eq!(
            place_query_string(&query),
            "include_submissions&include_tags&page=1&format=json"
        );
    }
}
