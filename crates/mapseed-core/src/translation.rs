//! Machine translation service contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Request body sent to the translation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text to translate.
    pub text: String,
    /// Target language code.
    pub target: String,
}

/// Response body returned by the translation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    /// Translated text.
    pub body: String,
}

/// An external machine translation service.
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translate `request.text` into `request.target`. `Ok(None)` means the
    /// service produced nothing.
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<Option<TranslationResponse>, ClientError>;
}
