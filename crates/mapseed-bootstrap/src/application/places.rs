//! Place loading.
//!
//! Every dataset is fetched concurrently: page 1 first, then the remaining
//! pages with bounded concurrency. Pages are published in configuration
//! order of their datasets and in ascending page order within a dataset,
//! whatever order the responses arrive in. A dataset whose first page fails
//! is logged and skipped without affecting its siblings.

use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use mapseed_core::api::MapseedApi;
use mapseed_core::dataset::Dataset;
use mapseed_core::error::ClientError;
use mapseed_core::place::{PlacePage, PlaceQuery, PlacesLoadStatus};
use mapseed_core::store::Store;
use mapseed_core::user::{User, datasets_with_access_protected_places_ability};
use tracing::{info, instrument, warn};

/// Totals of a place loading run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceLoadSummary {
    /// Datasets with at least their first page loaded.
    pub datasets_loaded: usize,
    /// Datasets skipped after a failure.
    pub datasets_failed: usize,
    /// Pages published.
    pub pages: usize,
    /// Places published.
    pub places: usize,
}

/// Fetches place pages and publishes them to the store.
pub struct PlaceLoader {
    api: Arc<dyn MapseedApi>,
    store: Arc<dyn Store>,
    page_concurrency: usize,
}

impl PlaceLoader {
    /// Creates a loader issuing at most `page_concurrency` page requests per
    /// dataset at a time (at least one).
    #[must_use]
    pub fn new(api: Arc<dyn MapseedApi>, store: Arc<dyn Store>, page_concurrency: usize) -> Self {
        Self {
            api,
            store,
            page_concurrency: page_concurrency.max(1),
        }
    }

    /// Loads every page of every dataset.
    ///
    /// The store sees the status `Loading`, then the pages, then `Loaded`
    /// once every request has settled. Datasets the user has protected
    /// access to are requested with private places included.
    #[instrument(skip_all, fields(datasets = datasets.len()))]
    pub async fn load(&self, datasets: &[Dataset], user: &User) -> PlaceLoadSummary {
        self.store.update_places_load_status(PlacesLoadStatus::Loading);

        let protected: HashSet<String> =
            datasets_with_access_protected_places_ability(user, datasets)
                .iter()
                .map(|dataset| dataset.url().to_owned())
                .collect();

        let mut fetches = stream::iter(datasets.iter().cloned().map(|dataset| {
            let include_private = protected.contains(dataset.url());
            let api = Arc::clone(&self.api);
            let page_concurrency = self.page_concurrency;
            async move {
                let outcome =
                    fetch_dataset(api, &dataset, include_private, page_concurrency).await;
                (dataset, outcome)
            }
        }))
        .buffered(datasets.len().max(1));

        let mut summary = PlaceLoadSummary::default();
        while let Some((dataset, outcome)) = fetches.next().await {
            match outcome {
                Ok(pages) => {
                    summary.datasets_loaded += 1;
                    for page in pages {
                        summary.pages += 1;
                        summary.places += page.places.len();
                        self.store.load_places(page, &dataset);
                    }
                }
                Err(err) => {
                    summary.datasets_failed += 1;
                    warn!(
                        dataset = %dataset.dataset_slug,
                        error = %err,
                        "fail-to-fetch-places-from-dataset"
                    );
                }
            }
        }

        self.store.update_places_load_status(PlacesLoadStatus::Loaded);
        info!(
            loaded = summary.datasets_loaded,
            failed = summary.datasets_failed,
            pages = summary.pages,
            places = summary.places,
            "places loaded"
        );
        summary
    }
}

/// Fetches page 1, then the remaining pages with at most `page_concurrency`
/// requests in flight. Pages come back in ascending order; a failed later
/// page is skipped.
async fn fetch_dataset(
    api: Arc<dyn MapseedApi>,
    dataset: &Dataset,
    include_private: bool,
    page_concurrency: usize,
) -> Result<Vec<PlacePage>, ClientError> {
    let first = api
        .place_page(&PlaceQuery::new(dataset.url(), 1, include_private))
        .await?;

    let remaining: Vec<(u32, Result<PlacePage, ClientError>)> =
        stream::iter((2..=first.num_pages).map(|page| {
            let api = Arc::clone(&api);
            let query = PlaceQuery::new(dataset.url(), page, include_private);
            async move { (page, api.place_page(&query).await) }
        }))
        .buffered(page_concurrency)
        .collect()
        .await;

    let mut pages = vec![first];
    for (page, outcome) in remaining {
        match outcome {
            Ok(loaded) => pages.push(loaded),
            Err(err) => warn!(
                dataset = %dataset.dataset_slug,
                page,
                error = %err,
                "skipping place page"
            ),
        }
    }
    Ok(pages)
}
