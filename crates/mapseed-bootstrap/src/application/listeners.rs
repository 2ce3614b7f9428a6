//! Global listeners installed for the lifetime of the mounted application.
//!
//! One resize listener keeps the store's layout current, one click
//! interceptor routes internal links on the client, and one history
//! subscription reports page views. All three are removed by
//! [`InstalledListeners::dispose`] or on drop.

use std::sync::Arc;

use mapseed_core::analytics::Analytics;
use mapseed_core::history::{History, Location, Subscription};
use mapseed_core::host::{EventDisposition, Host, HostEvent, Layout, ListenerHandle, ListenerKind};
use mapseed_core::store::Store;
use tracing::{debug, warn};

use crate::domain::links::internal_link_target;

/// Handles of the installed listeners.
pub struct InstalledListeners {
    host: Arc<dyn Host>,
    history: Arc<dyn History>,
    resize: Option<ListenerHandle>,
    click: Option<ListenerHandle>,
    navigation: Option<Subscription>,
}

impl std::fmt::Debug for InstalledListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstalledListeners")
            .field("resize", &self.resize)
            .field("click", &self.click)
            .field("navigation", &self.navigation)
            .finish_non_exhaustive()
    }
}

impl InstalledListeners {
    /// Publishes the current layout and installs the resize listener, the
    /// click interceptor and the page view subscription.
    #[must_use]
    pub fn install(
        host: Arc<dyn Host>,
        history: Arc<dyn History>,
        store: Arc<dyn Store>,
        analytics: Arc<dyn Analytics>,
    ) -> Self {
        store.update_layout(Layout::from_viewport(host.viewport()));

        let resize = host.add_listener(
            ListenerKind::Resize,
            Arc::new(move |event: &HostEvent| {
                if let HostEvent::Resize(viewport) = event {
                    store.update_layout(Layout::from_viewport(*viewport));
                }
                EventDisposition::Continue
            }),
        );

        let router = Arc::clone(&history);
        let click = host.add_listener(
            ListenerKind::Click,
            Arc::new(move |event: &HostEvent| {
                let HostEvent::Click(click) = event else {
                    return EventDisposition::Continue;
                };
                match internal_link_target(click) {
                    Some(path) => {
                        debug!(path, "routing internal link");
                        router.push(path);
                        EventDisposition::PreventDefault
                    }
                    None => EventDisposition::Continue,
                }
            }),
        );

        let navigation = history.listen(Arc::new(move |location: &Location| {
            if let Err(err) = analytics.record_page_view(&location.pathname) {
                warn!(path = %location.pathname, error = %err, "page view not recorded");
            }
        }));

        Self {
            host,
            history,
            resize: Some(resize),
            click: Some(click),
            navigation: Some(navigation),
        }
    }

    /// Returns `true` until the listeners are disposed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.resize.is_some() || self.click.is_some() || self.navigation.is_some()
    }

    /// Removes every listener. Calling it again has no effect.
    pub fn dispose(&mut self) {
        if let Some(handle) = self.resize.take() {
            self.host.remove_listener(handle);
        }
        if let Some(handle) = self.click.take() {
            self.host.remove_listener(handle);
        }
        if let Some(subscription) = self.navigation.take() {
            self.history.unlisten(subscription);
        }
    }
}

impl Drop for InstalledListeners {
    fn drop(&mut self) {
        self.dispose();
    }
}
