//! Client-side routes and the template each one renders.

use std::fmt;

/// Page template chosen by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// Map with sidebars and the content panel.
    Map,
    /// Place list.
    List,
    /// Dataset dashboard.
    Dashboard,
    /// Printable place report.
    Report,
    /// Static Sha template.
    Sha,
}

impl Template {
    /// Lowercase template name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::List => "list",
            Self::Dashboard => "dashboard",
            Self::Report => "report",
            Self::Sha => "sha",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed client-side location.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// `/`
    Map,
    /// `/{zoom}/{lat}/{lng}`, each a decimal with a fractional part.
    MapPosition {
        /// Zoom level.
        zoom: f64,
        /// Latitude.
        lat: f64,
        /// Longitude.
        lng: f64,
    },
    /// `/sha`
    Sha,
    /// `/list`
    List,
    /// `/new[/{formId}]`
    NewPlace {
        /// Form to open, if given.
        form_id: Option<String>,
    },
    /// `/dashboard`
    Dashboard,
    /// `/print-report/{datasetClientSlug}/{placeId}`
    PrintReport {
        /// Client slug of the place's dataset.
        dataset_client_slug: String,
        /// Place identifier.
        place_id: String,
    },
    /// `/page/{pageSlug}`
    Page {
        /// Custom page slug.
        page_slug: String,
    },
    /// `/{datasetClientSlug}/{placeId}`
    Place {
        /// Client slug of the place's dataset.
        dataset_client_slug: String,
        /// Place identifier.
        place_id: String,
    },
    /// `/{datasetClientSlug}/{placeId}/response/{responseId}`
    PlaceResponse {
        /// Client slug of the place's dataset.
        dataset_client_slug: String,
        /// Place identifier.
        place_id: String,
        /// Response (comment) identifier.
        response_id: String,
    },
    /// Anything else; rendered as the map.
    Unmatched(String),
}

impl Route {
    /// Parses a location pathname. Empty segments, such as a trailing
    /// slash, are ignored. Routes are tried in declaration order and the
    /// first match wins.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Map,
            [zoom, lat, lng]
                if is_decimal(zoom, false) && is_decimal(lat, true) && is_decimal(lng, true) =>
            {
                match (zoom.parse(), lat.parse(), lng.parse()) {
                    (Ok(zoom), Ok(lat), Ok(lng)) => Self::MapPosition { zoom, lat, lng },
                    _ => Self::Unmatched(path.to_owned()),
                }
            }
            ["sha"] => Self::Sha,
            ["list"] => Self::List,
            ["new", rest @ ..] => Self::NewPlace {
                form_id: rest.first().map(|id| (*id).to_owned()),
            },
            ["dashboard"] => Self::Dashboard,
            ["print-report", client_slug, place_id] => Self::PrintReport {
                dataset_client_slug: (*client_slug).to_owned(),
                place_id: (*place_id).to_owned(),
            },
            ["page", page_slug] => Self::Page {
                page_slug: (*page_slug).to_owned(),
            },
            [client_slug, place_id] => Self::Place {
                dataset_client_slug: (*client_slug).to_owned(),
                place_id: (*place_id).to_owned(),
            },
            [client_slug, place_id, "response", response_id] => Self::PlaceResponse {
                dataset_client_slug: (*client_slug).to_owned(),
                place_id: (*place_id).to_owned(),
                response_id: (*response_id).to_owned(),
            },
            _ => Self::Unmatched(path.to_owned()),
        }
    }

    /// The template this route renders.
    #[must_use]
    pub fn template(&self) -> Template {
        match self {
            Self::Sha => Template::Sha,
            Self::List => Template::List,
            Self::Dashboard => Template::Dashboard,
            Self::PrintReport { .. } => Template::Report,
            Self::Map
            | Self::MapPosition { .. }
            | Self::NewPlace { .. }
            | Self::Page { .. }
            | Self::Place { .. }
            | Self::PlaceResponse { .. }
            | Self::Unmatched(_) => Template::Map,
        }
    }

    /// Whether the site header is shown above the template.
    #[must_use]
    pub fn shows_header(&self) -> bool {
        !matches!(self, Self::Sha | Self::PrintReport { .. })
    }
}

/// Matches `-?\d*\.\d+`, the leading sign only when `signed`.
fn is_decimal(segment: &str, signed: bool) -> bool {
    let unsigned = if signed {
        segment.strip_prefix('-').unwrap_or(segment)
    } else {
        segment
    };
    let Some((whole, fraction)) = unsigned.split_once('.') else {
        return false;
    };
    whole.bytes().all(|b| b.is_ascii_digit())
        && !fraction.is_empty()
        && fraction.bytes().all(|b| b.is_ascii_digit())
}
