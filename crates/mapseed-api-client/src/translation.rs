//! HTTP client for the machine translation endpoint.

use async_trait::async_trait;
use mapseed_core::error::ClientError;
use mapseed_core::translation::{TranslationRequest, TranslationResponse, TranslationService};
use reqwest::Client;
use tracing::{debug, instrument};

use crate::http::{cookie_client, optional_json, transport};

/// `TranslationService` posting `{text, target}` to a translation endpoint.
///
/// A non-success status or an empty body yields no translation; only
/// transport failures and malformed bodies are errors.
#[derive(Debug, Clone)]
pub struct HttpTranslationService {
    client: Client,
    url: String,
}

impl HttpTranslationService {
    /// Creates a service posting to `url`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` if the HTTP client cannot be
    /// built.
    pub fn new(url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client: cookie_client()?,
            url: url.to_owned(),
        })
    }
}

#[async_trait]
impl TranslationService for HttpTranslationService {
    #[instrument(skip(self, request), fields(target = %request.target))]
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<Option<TranslationResponse>, ClientError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "translation endpoint declined");
            return Ok(None);
        }

        let translated: Option<TranslationResponse> = optional_json(response).await?;
        Ok(translated.filter(|response| !response.body.is_empty()))
    }
}
