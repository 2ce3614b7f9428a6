//! Collaborators used when no external service is configured.

use async_trait::async_trait;
use mapseed_core::analytics::{Analytics, AnalyticsProfile};
use mapseed_core::error::ClientError;
use mapseed_core::translation::{TranslationRequest, TranslationResponse, TranslationService};
use tracing::info;

/// Analytics sink that writes every call to the log under the `analytics`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl Analytics for TracingAnalytics {
    fn identify(&self, user_id: u64) -> Result<(), ClientError> {
        info!(target: "analytics", user_id, "identify");
        Ok(())
    }

    fn track(&self, event: &str) -> Result<(), ClientError> {
        info!(target: "analytics", event, "track");
        Ok(())
    }

    fn set_profile(&self, profile: &AnalyticsProfile) -> Result<(), ClientError> {
        info!(
            target: "analytics",
            user_id = profile.id,
            username = %profile.username,
            "set profile"
        );
        Ok(())
    }

    fn record_page_view(&self, path: &str) -> Result<(), ClientError> {
        info!(target: "analytics", path, "page view");
        Ok(())
    }
}

/// Translation service that never produces a translation. Every missing key
/// resolves to its fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTranslationService;

#[async_trait]
impl TranslationService for DisabledTranslationService {
    async fn translate(
        &self,
        _request: &TranslationRequest,
    ) -> Result<Option<TranslationResponse>, ClientError> {
        Ok(None)
    }
}
