//! Analytics sink contract. Every call is best-effort.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Profile properties attached to an identified user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsProfile {
    /// Backend identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Login name.
    pub username: String,
}

/// Destination for identification, events and page views.
pub trait Analytics: Send + Sync {
    /// Associates subsequent events with `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the sink rejects the call.
    fn identify(&self, user_id: u64) -> Result<(), ClientError>;

    /// Records a named event.
    ///
    /// # Errors
    ///
    /// Returns an error when the sink rejects the call.
    fn track(&self, event: &str) -> Result<(), ClientError>;

    /// Stores profile properties for the identified user.
    ///
    /// # Errors
    ///
    /// Returns an error when the sink rejects the call.
    fn set_profile(&self, profile: &AnalyticsProfile) -> Result<(), ClientError>;

    /// Records a page view for `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the sink rejects the call.
    fn record_page_view(&self, path: &str) -> Result<(), ClientError>;
}
