//! Response handling shared by the HTTP clients.

use std::time::Duration;

use mapseed_core::error::ClientError;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds a client that keeps cookies between requests.
pub(crate) fn cookie_client() -> Result<Client, ClientError> {
    Client::builder()
        .cookie_store(true)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| ClientError::Misconfiguration(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn transport(err: &reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

/// Fails with `ClientError::Status` unless the status is 2xx.
pub(crate) fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

/// Decodes a JSON body. An empty body or `null` yields `None`.
pub(crate) async fn optional_json<T: DeserializeOwned>(
    response: Response,
) -> Result<Option<T>, ClientError> {
    let body = response.text().await.map_err(|e| transport(&e))?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<T>>(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Decodes a required JSON body.
pub(crate) async fn required_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    optional_json(response)
        .await?
        .ok_or_else(|| ClientError::Decode("empty response body".into()))
}
