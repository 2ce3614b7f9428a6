//! Recording analytics sink.

use std::sync::Mutex;

use mapseed_core::analytics::{Analytics, AnalyticsProfile};
use mapseed_core::error::ClientError;

/// One call received by [`RecordingAnalytics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsEvent {
    /// `identify`.
    Identify(u64),
    /// `track`.
    Track(String),
    /// `set_profile`.
    Profile(AnalyticsProfile),
    /// `record_page_view`.
    PageView(String),
}

/// An analytics sink that records every call. A failing sink rejects every
/// call without recording it.
#[derive(Debug, Default)]
pub struct RecordingAnalytics {
    failing: bool,
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl RecordingAnalytics {
    /// Create a sink that accepts every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that rejects every call.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all recorded events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the recorded page view paths in order.
    #[must_use]
    pub fn page_views(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                AnalyticsEvent::PageView(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: AnalyticsEvent) -> Result<(), ClientError> {
        if self.failing {
            return Err(ClientError::Transport("analytics unavailable".into()));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

impl Analytics for RecordingAnalytics {
    fn identify(&self, user_id: u64) -> Result<(), ClientError> {
        self.record(AnalyticsEvent::Identify(user_id))
    }

    fn track(&self, event: &str) -> Result<(), ClientError> {
        self.record(AnalyticsEvent::Track(event.to_owned()))
    }

    fn set_profile(&self, profile: &AnalyticsProfile) -> Result<(), ClientError> {
        self.record(AnalyticsEvent::Profile(profile.clone()))
    }

    fn record_page_view(&self, path: &str) -> Result<(), ClientError> {
        self.record(AnalyticsEvent::PageView(path.to_owned()))
    }
}
