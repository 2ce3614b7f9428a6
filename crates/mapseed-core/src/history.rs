//! Client-side navigation history: the contract and an in-memory stack.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// The current location of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Path component, e.g. `/list`.
    pub pathname: String,
}

/// Callback invoked after every navigation.
pub type LocationListener = Arc<dyn Fn(&Location) + Send + Sync>;

/// Identifies a history subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub u64);

/// Navigation history.
pub trait History: Send + Sync {
    /// Navigates to `path` without a page load.
    fn push(&self, path: &str);

    /// The current location.
    fn location(&self) -> Location;

    /// Registers `listener` for navigations.
    fn listen(&self, listener: LocationListener) -> Subscription;

    /// Disposes a subscription. Unknown subscriptions are ignored.
    fn unlisten(&self, subscription: Subscription);
}

#[derive(Default)]
struct HistoryState {
    entries: Vec<String>,
    next: u64,
    listeners: HashMap<u64, LocationListener>,
}

/// In-memory history stack.
pub struct MemoryHistory {
    state: Mutex<HistoryState>,
}

impl std::fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHistory")
            .field("location", &self.location())
            .finish_non_exhaustive()
    }
}

impl MemoryHistory {
    /// History positioned at `path`.
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            state: Mutex::new(HistoryState {
                entries: vec![path.to_owned()],
                ..HistoryState::default()
            }),
        }
    }

    /// Paths pushed since creation, excluding the initial path.
    #[must_use]
    pub fn pushed(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .skip(1)
            .cloned()
            .collect()
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }
}

impl History for MemoryHistory {
    fn push(&self, path: &str) {
        let listeners: Vec<LocationListener> = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.entries.push(path.to_owned());
            state.listeners.values().cloned().collect()
        };
        let location = Location {
            pathname: path.to_owned(),
        };
        for listener in listeners {
            listener(&location);
        }
    }

    fn location(&self) -> Location {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Location {
            pathname: state.entries.last().cloned().unwrap_or_default(),
        }
    }

    fn listen(&self, listener: LocationListener) -> Subscription {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.next += 1;
        let id = state.next;
        state.listeners.insert(id, listener);
        Subscription(id)
    }

    fn unlisten(&self, subscription: Subscription) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .remove(&subscription.0);
    }
}
