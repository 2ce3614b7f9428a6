//! Integration tests for the HTTP backend client.

mod common;

use axum::Json;
use axum::Router;
use axum::extract::{Path, RawQuery};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use mapseed_api_client::HttpMapseedApi;
use mapseed_core::api::MapseedApi;
use mapseed_core::error::ClientError;
use mapseed_core::place::PlaceQuery;
use serde_json::json;

use common::{cookie_value, spawn_backend};

async fn session_key() -> Response {
    (
        [(header::SET_COOKIE, "sa-api-sessionid=abc123; Path=/")],
        Json(json!({"sessionid": "abc123"})),
    )
        .into_response()
}

async fn current_user(headers: HeaderMap) -> Response {
    let session = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| cookie_value(cookies, "sa-api-sessionid"));
    match session {
        Some("abc123") => Json(json!({
            "id": 42,
            "username": "alice",
            "avatar_url": "",
            "groups": [],
            "provider_type": "twitter",
        }))
        .into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn dataset(Path((owner, slug)): Path<(String, String)>) -> Response {
    match (owner.as_str(), slug.as_str()) {
        ("alice", "trees") => Json(json!({
            "url": "http://backend/api/v2/alice/datasets/trees",
            "display_name": "Street Trees",
        }))
        .into_response(),
        ("alice", "broken") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn flavor(Path(slug): Path<String>) -> Response {
    if slug == "seedmap" {
        Json(json!({"forms": [{"id": 1, "dataset": "http://backend/api/v2/alice/datasets/trees"}]}))
            .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn places(RawQuery(query): RawQuery) -> Response {
    let query = query.unwrap_or_default();
    let page = if query.contains("page=2") { 2 } else { 1 };
    Json(json!({
        "type": "FeatureCollection",
        "features": [{"type": "Feature", "id": page * 10, "properties": {"query": query}}],
        "metadata": {"page": page, "num_pages": 2},
    }))
    .into_response()
}

fn backend() -> Router {
    Router::new()
        .route("/api/v2/utils/session-key", get(session_key))
        .route("/api/v2/users/current", get(current_user))
        .route("/api/v2/flavors/{slug}", get(flavor))
        .route("/api/v2/{owner}/datasets/{slug}", get(dataset))
        .route("/api/v2/{owner}/datasets/{slug}/places", get(places))
}

async fn client() -> (HttpMapseedApi, String) {
    let base = spawn_backend(backend()).await;
    let api_root = format!("{base}/api/v2/");
    (HttpMapseedApi::new(&api_root).unwrap(), api_root)
}

#[tokio::test]
async fn test_session_cookie_is_sent_with_later_requests() {
    // Arrange
    let (api, _) = client().await;
    assert_eq!(api.current_user().await.unwrap(), None);

    // Act
    let session = api.session().await.unwrap();
    let user = api.current_user().await.unwrap();

    // Assert
    assert_eq!(session.unwrap().sessionid, "abc123");
    let user = user.unwrap();
    assert_eq!(user.id, 42);
    assert_eq!(user.username, "alice");
    assert_eq!(user.attributes["provider_type"], "twitter");
}

#[tokio::test]
async fn test_dataset_record_is_returned_verbatim() {
    let (api, _) = client().await;

    let record = api.dataset("alice", "trees").await.unwrap();

    assert_eq!(record.0["display_name"], "Street Trees");
}

#[tokio::test]
async fn test_dataset_non_success_status_is_an_error() {
    let (api, _) = client().await;

    let missing = api.dataset("alice", "unknown").await;
    let broken = api.dataset("alice", "broken").await;

    assert!(matches!(missing, Err(ClientError::Status { status: 404, .. })));
    let Err(broken) = broken else {
        panic!("expected an error");
    };
    assert!(matches!(broken, ClientError::Status { status: 500, .. }));
    assert!(broken.is_retryable());
}

#[tokio::test]
async fn test_unknown_flavor_is_absent() {
    let (api, _) = client().await;

    let known = api.flavor("seedmap").await.unwrap();
    let unknown = api.flavor("other").await.unwrap();

    assert_eq!(known.unwrap().forms.unwrap().len(), 1);
    assert!(unknown.is_none());
}

#[tokio::test]
async fn test_place_page_sends_flags_and_reads_metadata() {
    // Arrange
    let (api, api_root) = client().await;
    let dataset_url = format!("{api_root}alice/datasets/trees");

    // Act
    let page = api
        .place_page(&PlaceQuery::new(dataset_url, 2, true))
        .await
        .unwrap();

    // Assert
    assert_eq!(page.page, 2);
    assert_eq!(page.num_pages, 2);
    assert_eq!(page.places.len(), 1);
    assert_eq!(page.places[0].id(), Some(20));
    assert_eq!(
        page.places[0].0["properties"]["query"],
        "include_submissions&include_tags&include_private&page=2&format=json"
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    let api = HttpMapseedApi::new(&format!("http://{address}/api/v2/")).unwrap();

    let result = api.session().await;

    assert!(matches!(result, Err(ClientError::Transport(_))));
}
