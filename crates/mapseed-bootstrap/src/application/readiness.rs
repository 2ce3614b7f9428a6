//! Readiness signal gating the first interactive render.
//!
//! The status starts as `Loading` and settles exactly once, either to
//! `Ready` or to `Failed`. Later transitions are ignored.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use crate::domain::report::BootstrapStep;

/// Startup status observed by the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapStatus {
    /// Startup data is still being loaded.
    Loading,
    /// Session, datasets, user, configuration and localization are in place.
    Ready,
    /// Startup cannot produce a usable application.
    Failed {
        /// Step that failed.
        step: BootstrapStep,
        /// Human-readable reason.
        message: String,
    },
}

impl BootstrapStatus {
    /// Returns `true` once the status can no longer change.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// Shared handle on the readiness status. Clones observe the same signal.
#[derive(Debug, Clone)]
pub struct Readiness {
    sender: Arc<watch::Sender<BootstrapStatus>>,
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

impl Readiness {
    /// Creates a signal in the `Loading` state.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(BootstrapStatus::Loading);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// The current status.
    #[must_use]
    pub fn status(&self) -> BootstrapStatus {
        self.sender.borrow().clone()
    }

    /// Receives every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BootstrapStatus> {
        self.sender.subscribe()
    }

    /// Flips to `Ready`. Returns `false` if the status had already settled.
    pub fn mark_ready(&self) -> bool {
        let flipped = self.settle(BootstrapStatus::Ready);
        if flipped {
            info!("initial data loaded");
        }
        flipped
    }

    /// Flips to `Failed`. Returns `false` if the status had already settled.
    pub fn fail(&self, step: BootstrapStep, message: impl Into<String>) -> bool {
        let message = message.into();
        let flipped = self.settle(BootstrapStatus::Failed {
            step,
            message: message.clone(),
        });
        if flipped {
            error!(step = %step, reason = %message, "bootstrap failed");
        }
        flipped
    }

    /// Waits until the status settles and returns it.
    pub async fn settled(&self) -> BootstrapStatus {
        let mut receiver = self.subscribe();
        match receiver.wait_for(BootstrapStatus::is_settled).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }

    fn settle(&self, status: BootstrapStatus) -> bool {
        self.sender.send_if_modified(|current| {
            if current.is_settled() {
                false
            } else {
                *current = status;
                true
            }
        })
    }
}
