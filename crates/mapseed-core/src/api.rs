//! Backend API contract consumed during bootstrap.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dataset::DatasetRecord;
use crate::error::ClientError;
use crate::forms::FlavorRecord;
use crate::place::{PlacePage, PlaceQuery};
use crate::user::UserRecord;

/// Session descriptor issued by the backend on first contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque session identifier.
    pub sessionid: String,
}

/// REST endpoints of the Mapseed backend.
#[async_trait]
pub trait MapseedApi: Send + Sync {
    /// Requests a session. `Ok(None)` when the backend issues none.
    async fn session(&self) -> Result<Option<SessionRecord>, ClientError>;

    /// Fetches the canonical record of the dataset `dataset_slug` owned by
    /// `owner`. Any non-success status is an error.
    async fn dataset(&self, owner: &str, dataset_slug: &str) -> Result<DatasetRecord, ClientError>;

    /// Fetches flavor metadata. `Ok(None)` when the flavor is unknown.
    async fn flavor(&self, flavor_slug: &str) -> Result<Option<FlavorRecord>, ClientError>;

    /// Fetches the logged-in user. `Ok(None)` for anonymous sessions.
    async fn current_user(&self) -> Result<Option<UserRecord>, ClientError>;

    /// Fetches one page of places.
    async fn place_page(&self, query: &PlaceQuery) -> Result<PlacePage, ClientError>;
}
