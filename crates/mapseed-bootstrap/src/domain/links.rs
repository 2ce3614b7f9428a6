//! Internal navigation links.
//!
//! Any element marked `rel="internal"` with an `href` is routed on the
//! client. The marker is honored on the clicked element or its immediate
//! parent, so links in authored page content work too.

use mapseed_core::host::{ClickEvent, ElementAttributes};

/// `rel` value marking an internal link.
pub const INTERNAL_LINK_REL: &str = "internal";

fn internal_href(element: &ElementAttributes) -> Option<&str> {
    if element.get("rel") == Some(INTERNAL_LINK_REL) {
        element.get("href")
    } else {
        None
    }
}

/// Path a click should navigate to on the client, if any.
///
/// The clicked element is checked first, then its parent. A marked element
/// without an `href` does not count.
#[must_use]
pub fn internal_link_target(event: &ClickEvent) -> Option<&str> {
    let target = event.target.as_ref()?;
    internal_href(target).or_else(|| target.parent().and_then(internal_href))
}
