//! Fake translation service with call recording and an optional gate.

use std::sync::Mutex;

use async_trait::async_trait;
use mapseed_core::error::ClientError;
use mapseed_core::translation::{TranslationRequest, TranslationResponse, TranslationService};
use tokio::sync::watch;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Nothing,
    Failure,
    Hang,
}

/// Releases the requests held by a gated [`FakeTranslationService`].
#[derive(Debug)]
pub struct TranslationGate {
    sender: watch::Sender<bool>,
}

impl TranslationGate {
    /// Lets every pending and future request complete.
    pub fn open(&self) {
        self.sender.send_replace(true);
    }
}

/// A translation service answering every request the same way.
///
/// Requests are recorded before the answer is produced, so a gated request
/// counts as a call while it waits.
#[derive(Debug)]
pub struct FakeTranslationService {
    reply: Reply,
    gate: Option<watch::Receiver<bool>>,
    requests: Mutex<Vec<TranslationRequest>>,
}

impl FakeTranslationService {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            gate: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with `text`.
    #[must_use]
    pub fn returning(text: &str) -> Self {
        Self::with_reply(Reply::Text(text.to_owned()))
    }

    /// Answers every request with no translation.
    #[must_use]
    pub fn returning_nothing() -> Self {
        Self::with_reply(Reply::Nothing)
    }

    /// Fails every request with a transport error.
    #[must_use]
    pub fn failing() -> Self {
        Self::with_reply(Reply::Failure)
    }

    /// Never answers.
    #[must_use]
    pub fn hanging() -> Self {
        Self::with_reply(Reply::Hang)
    }

    /// Holds every request until the returned gate is opened.
    #[must_use]
    pub fn gated(mut self) -> (Self, TranslationGate) {
        let (sender, receiver) = watch::channel(false);
        self.gate = Some(receiver);
        (self, TranslationGate { sender })
    }

    /// Number of requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Returns a snapshot of all requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationService for FakeTranslationService {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<Option<TranslationResponse>, ClientError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.gate {
            let mut gate = gate.clone();
            let _ = gate.wait_for(|open| *open).await;
        }

        match &self.reply {
            Reply::Text(body) => Ok(Some(TranslationResponse { body: body.clone() })),
            Reply::Nothing => Ok(None),
            Reply::Failure => Err(ClientError::Transport("connection refused".into())),
            Reply::Hang => std::future::pending().await,
        }
    }
}
