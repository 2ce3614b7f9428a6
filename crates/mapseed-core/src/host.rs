//! Host environment events: window resizes and document clicks.
//!
//! The host owns the event loop; the client registers handlers and must
//! remove them again on teardown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Viewport width above which the desktop layout applies.
pub const DESKTOP_MIN_WIDTH: u32 = 960;

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// Page layout derived from the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Wide screens.
    #[default]
    Desktop,
    /// Narrow screens.
    Mobile,
}

impl Layout {
    /// Layout for `viewport`.
    #[must_use]
    pub fn from_viewport(viewport: Viewport) -> Self {
        if viewport.width > DESKTOP_MIN_WIDTH {
            Self::Desktop
        } else {
            Self::Mobile
        }
    }
}

/// Attributes of a DOM element and, transitively, of its ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementAttributes {
    attributes: HashMap<String, String>,
    parent: Option<Box<ElementAttributes>>,
}

impl ElementAttributes {
    /// Element without attributes or parent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds attribute `name="value"`.
    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Sets the parent element.
    #[must_use]
    pub fn with_parent(mut self, parent: ElementAttributes) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Value of attribute `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The parent element, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&ElementAttributes> {
        self.parent.as_deref()
    }
}

/// A click anywhere in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickEvent {
    /// The clicked element; absent for synthetic events.
    pub target: Option<ElementAttributes>,
}

/// An event delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The window was resized.
    Resize(Viewport),
    /// The document was clicked.
    Click(ClickEvent),
}

/// Event category a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Window resize.
    Resize,
    /// Document click.
    Click,
}

impl HostEvent {
    /// Category of this event.
    #[must_use]
    pub fn kind(&self) -> ListenerKind {
        match self {
            Self::Resize(_) => ListenerKind::Resize,
            Self::Click(_) => ListenerKind::Click,
        }
    }
}

/// What the host should do after a handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Run the default action.
    Continue,
    /// Suppress the default action.
    PreventDefault,
}

/// Callback invoked for host events.
pub type EventHandler = Arc<dyn Fn(&HostEvent) -> EventDisposition + Send + Sync>;

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u64);

/// Registration of host event listeners.
pub trait Host: Send + Sync {
    /// Registers `handler` for events of `kind`.
    fn add_listener(&self, kind: ListenerKind, handler: EventHandler) -> ListenerHandle;

    /// Removes a previously registered listener. Unknown handles are ignored.
    fn remove_listener(&self, handle: ListenerHandle);

    /// Current viewport size.
    fn viewport(&self) -> Viewport;
}

#[derive(Default)]
struct Listeners {
    next: u64,
    registered: HashMap<u64, (ListenerKind, EventHandler)>,
}

/// Host without a window system. Events are delivered with
/// [`HeadlessHost::dispatch`].
pub struct HeadlessHost {
    viewport: Mutex<Viewport>,
    listeners: Mutex<Listeners>,
}

impl std::fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("viewport", &self.viewport())
            .field("listeners", &self.listener_total())
            .finish()
    }
}

impl HeadlessHost {
    /// Host with the given viewport and no listeners.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Mutex::new(viewport),
            listeners: Mutex::new(Listeners::default()),
        }
    }

    /// Number of listeners registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .registered
            .values()
            .filter(|(registered, _)| *registered == kind)
            .count()
    }

    fn listener_total(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .registered
            .len()
    }

    /// Delivers `event` to every listener of its kind. A resize also updates
    /// the viewport. Returns `PreventDefault` if any listener asked for it.
    pub fn dispatch(&self, event: &HostEvent) -> EventDisposition {
        if let HostEvent::Resize(viewport) = event {
            *self.viewport.lock().unwrap_or_else(PoisonError::into_inner) = *viewport;
        }
        // Handlers run without the lock so they may register or remove
        // listeners themselves.
        let handlers: Vec<EventHandler> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .registered
            .values()
            .filter(|(kind, _)| *kind == event.kind())
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        let mut disposition = EventDisposition::Continue;
        for handler in handlers {
            if handler(event) == EventDisposition::PreventDefault {
                disposition = EventDisposition::PreventDefault;
            }
        }
        disposition
    }
}

impl Host for HeadlessHost {
    fn add_listener(&self, kind: ListenerKind, handler: EventHandler) -> ListenerHandle {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.next += 1;
        let id = listeners.next;
        listeners.registered.insert(id, (kind, handler));
        ListenerHandle(id)
    }

    fn remove_listener(&self, handle: ListenerHandle) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .registered
            .remove(&handle.0);
    }

    fn viewport(&self) -> Viewport {
        *self.viewport.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
