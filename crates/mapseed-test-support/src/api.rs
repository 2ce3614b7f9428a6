//! Fake backend API — a configurable `MapseedApi` for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mapseed_core::api::{MapseedApi, SessionRecord};
use mapseed_core::dataset::DatasetRecord;
use mapseed_core::error::ClientError;
use mapseed_core::forms::{FlavorRecord, FormRecord};
use mapseed_core::place::{Place, PlacePage, PlaceQuery};
use mapseed_core::user::UserRecord;
use serde_json::Value;

use crate::journal::Journal;

fn connection_refused() -> ClientError {
    ClientError::Transport("connection refused".into())
}

#[derive(Debug, Clone)]
enum Places {
    Pages(Vec<Vec<Value>>),
    Failing,
}

/// A backend fake configured with a builder.
///
/// Every call is written to the journal as `api:<endpoint>`, e.g.
/// `api:dataset:trees` or `api:places:<url>:2`. Unconfigured datasets
/// answer 404; unconfigured place URLs have one empty page. Session,
/// flavor and user are absent unless configured.
#[derive(Debug, Default)]
pub struct FakeMapseedApi {
    journal: Journal,
    session: Option<String>,
    session_failures: AtomicU32,
    session_failing: bool,
    datasets: HashMap<(String, String), Result<Value, u16>>,
    flavor: Option<FlavorRecord>,
    flavor_failing: bool,
    user: Option<UserRecord>,
    user_failing: bool,
    places: HashMap<String, Places>,
    place_delays: HashMap<(String, u32), Duration>,
    place_queries: Mutex<Vec<PlaceQuery>>,
}

impl FakeMapseedApi {
    /// Create a fake with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes calls to `journal` instead of a private one.
    #[must_use]
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Issues session `session_id`.
    #[must_use]
    pub fn with_session(mut self, session_id: &str) -> Self {
        self.session = Some(session_id.to_owned());
        self
    }

    /// Fails the first `failures` session calls with a transport error.
    #[must_use]
    pub fn with_session_failures(self, failures: u32) -> Self {
        self.session_failures.store(failures, Ordering::SeqCst);
        self
    }

    /// Fails every session call.
    #[must_use]
    pub fn with_failing_session(mut self) -> Self {
        self.session_failing = true;
        self
    }

    /// Serves `body` for the dataset `slug` owned by `owner`.
    #[must_use]
    pub fn with_dataset(mut self, owner: &str, slug: &str, body: Value) -> Self {
        self.datasets
            .insert((owner.to_owned(), slug.to_owned()), Ok(body));
        self
    }

    /// Answers `status` for the dataset `slug` owned by `owner`.
    #[must_use]
    pub fn with_dataset_status(mut self, owner: &str, slug: &str, status: u16) -> Self {
        self.datasets
            .insert((owner.to_owned(), slug.to_owned()), Err(status));
        self
    }

    /// Serves flavor metadata carrying `forms`.
    ///
    /// # Panics
    ///
    /// Panics if a form is not a JSON object.
    #[must_use]
    pub fn with_flavor_forms(mut self, forms: Vec<Value>) -> Self {
        let forms = forms
            .into_iter()
            .map(|form| serde_json::from_value::<FormRecord>(form).unwrap())
            .collect();
        self.flavor = Some(FlavorRecord {
            forms: Some(forms),
            attributes: serde_json::Map::new(),
        });
        self
    }

    /// Fails every flavor call.
    #[must_use]
    pub fn with_failing_flavor(mut self) -> Self {
        self.flavor_failing = true;
        self
    }

    /// Reports `user` as logged in.
    #[must_use]
    pub fn with_user(mut self, user: UserRecord) -> Self {
        self.user = Some(user);
        self
    }

    /// Fails every user call.
    #[must_use]
    pub fn with_failing_user(mut self) -> Self {
        self.user_failing = true;
        self
    }

    /// Serves `pages` (each a list of features) for the dataset at `url`.
    #[must_use]
    pub fn with_places(mut self, url: &str, pages: Vec<Vec<Value>>) -> Self {
        self.places.insert(url.to_owned(), Places::Pages(pages));
        self
    }

    /// Fails every place request for the dataset at `url`.
    #[must_use]
    pub fn with_failing_places(mut self, url: &str) -> Self {
        self.places.insert(url.to_owned(), Places::Failing);
        self
    }

    /// Delays the answer for `page` of the dataset at `url`.
    #[must_use]
    pub fn with_place_delay(mut self, url: &str, page: u32, delay: Duration) -> Self {
        self.place_delays.insert((url.to_owned(), page), delay);
        self
    }

    /// The journal this fake writes to.
    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Returns a snapshot of all place queries received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn place_queries(&self) -> Vec<PlaceQuery> {
        self.place_queries.lock().unwrap().clone()
    }

    /// Number of calls journaled for `endpoint`, e.g. `session`.
    #[must_use]
    pub fn call_count(&self, endpoint: &str) -> usize {
        let prefix = format!("api:{endpoint}");
        self.journal
            .entries()
            .iter()
            .filter(|entry| entry.starts_with(&prefix))
            .count()
    }
}

#[async_trait]
impl MapseedApi for FakeMapseedApi {
    async fn session(&self) -> Result<Option<SessionRecord>, ClientError> {
        self.journal.record("api:session");
        if self.session_failing {
            return Err(connection_refused());
        }
        if self
            .session_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
        {
            return Err(connection_refused());
        }
        Ok(self.session.clone().map(|sessionid| SessionRecord { sessionid }))
    }

    async fn dataset(&self, owner: &str, dataset_slug: &str) -> Result<DatasetRecord, ClientError> {
        self.journal.record(format!("api:dataset:{dataset_slug}"));
        match self
            .datasets
            .get(&(owner.to_owned(), dataset_slug.to_owned()))
        {
            Some(Ok(body)) => serde_json::from_value(body.clone())
                .map_err(|e| ClientError::Decode(e.to_string())),
            Some(Err(status)) => Err(ClientError::Status {
                status: *status,
                url: format!("{owner}/datasets/{dataset_slug}"),
            }),
            None => Err(ClientError::Status {
                status: 404,
                url: format!("{owner}/datasets/{dataset_slug}"),
            }),
        }
    }

    async fn flavor(&self, _flavor_slug: &str) -> Result<Option<FlavorRecord>, ClientError> {
        self.journal.record("api:flavor");
        if self.flavor_failing {
            return Err(connection_refused());
        }
        Ok(self.flavor.clone())
    }

    async fn current_user(&self) -> Result<Option<UserRecord>, ClientError> {
        self.journal.record("api:user");
        if self.user_failing {
            return Err(connection_refused());
        }
        Ok(self.user.clone())
    }

    async fn place_page(&self, query: &PlaceQuery) -> Result<PlacePage, ClientError> {
        self.journal
            .record(format!("api:places:{}:{}", query.dataset_url, query.page));
        self.place_queries.lock().unwrap().push(query.clone());

        if let Some(delay) = self
            .place_delays
            .get(&(query.dataset_url.clone(), query.page))
        {
            tokio::time::sleep(*delay).await;
        }

        let pages = match self.places.get(&query.dataset_url) {
            Some(Places::Failing) => return Err(connection_refused()),
            Some(Places::Pages(pages)) => pages.clone(),
            None => vec![Vec::new()],
        };
        let num_pages = u32::try_from(pages.len()).unwrap_or(u32::MAX);
        let index = usize::try_from(query.page.saturating_sub(1)).unwrap_or(usize::MAX);
        let Some(features) = pages.get(index) else {
            return Err(ClientError::Status {
                status: 404,
                url: format!("{}/places?page={}", query.dataset_url, query.page),
            });
        };

        Ok(PlacePage {
            page: query.page,
            num_pages,
            places: features.iter().cloned().map(Place).collect(),
        })
    }
}
