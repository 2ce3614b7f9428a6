//! Startup of a whole client against a fake backend.

use std::sync::Arc;
use std::time::Duration;

use mapseed_bootstrap::{BootstrapError, BootstrapOptions, BootstrapStep};
use mapseed_client::{
    AppError, ClientRuntime, Overflow, Route, Services, Template, TracingAnalytics, View,
};
use mapseed_core::config::ClientConfig;
use mapseed_core::history::History;
use mapseed_core::host::{
    ClickEvent, ElementAttributes, EventDisposition, HostEvent, Viewport,
};
use mapseed_core::place::PlacesLoadStatus;
use mapseed_core::retry::{Backoff, RetryPolicy};
use mapseed_core::store::UiComponent;
use mapseed_i18n::ResourceBundle;
use mapseed_test_support::{FakeMapseedApi, FakeTranslationService};
use serde_json::{Value, json};

const API_ROOT: &str = "https://api.test/api/v2/";

fn config(right_sidebar_visible: bool) -> Arc<ClientConfig> {
    Arc::new(
        serde_json::from_value(json!({
            "app": {"title": "Seed Map", "apiRoot": API_ROOT, "enableCookieConsent": true},
            "flavor": {
                "slug": "seedmap",
                "datasets": [
                    {"datasetSlug": "trees", "user": "alice", "clientSlug": "street-trees"},
                    {"datasetSlug": "bikes", "user": "alice", "clientSlug": "bike-racks"}
                ],
                "defaultLanguage": {"code": "en", "label": "English"},
                "availableLanguages": [{"code": "es", "label": "Español"}]
            },
            "right_sidebar": {"is_visible_default": right_sidebar_visible},
            "pages": [{"slug": "about"}]
        }))
        .unwrap(),
    )
}

fn feature(id: u64) -> Value {
    json!({"type": "Feature", "id": id, "properties": {"title": format!("Place {id}")}})
}

fn options() -> BootstrapOptions {
    BootstrapOptions {
        retry: RetryPolicy {
            max_retries: 1,
            backoff: Backoff::Constant(Duration::from_millis(5)),
            attempt_timeout: Duration::from_secs(1),
        },
        translation_timeout: Duration::from_secs(1),
        page_concurrency: 2,
    }
}

fn runtime(api: FakeMapseedApi, initial_path: &str, right_sidebar_visible: bool) -> ClientRuntime {
    let mut resources = ResourceBundle::new();
    resources.add_resource("en", "ui", "submitButton", "Submit");
    ClientRuntime::new(
        config(right_sidebar_visible),
        resources,
        Services {
            api: Arc::new(api),
            translator: Arc::new(FakeTranslationService::returning("Enviar")),
            analytics: Arc::new(TracingAnalytics),
        },
        Viewport {
            width: 1280,
            height: 800,
        },
        initial_path,
        options(),
    )
}

fn backend() -> FakeMapseedApi {
    FakeMapseedApi::new()
        .with_session("abc123")
        .with_dataset("alice", "trees", json!({"display_name": "Street trees"}))
        .with_dataset("alice", "bikes", json!({"display_name": "Bike racks"}))
        .with_places(
            &format!("{API_ROOT}alice/datasets/trees"),
            vec![vec![feature(1), feature(2)], vec![feature(3)]],
        )
        .with_places(
            &format!("{API_ROOT}alice/datasets/bikes"),
            vec![vec![feature(10)]],
        )
}

#[tokio::test]
async fn test_mount_renders_map_and_loads_places() {
    // Arrange
    let runtime = runtime(backend(), "/", true);
    assert_eq!(runtime.app().view(), View::Loading);

    // Act
    let mut mounted = runtime.mount().await.unwrap();
    let view = runtime.app().view();
    let summary = mounted.places_loaded().await.unwrap();

    // Assert
    let View::Page(page) = view else {
        panic!("expected a page view, got {view:?}");
    };
    assert_eq!(page.route, Route::Map);
    assert_eq!(page.template, Template::Map);
    assert!(page.show_header);
    assert!(page.show_cookie_consent);
    assert_eq!(page.overflow, Overflow::Hidden);
    assert_eq!(page.language.map(|l| l.current), Some("en".to_owned()));

    let store = runtime.store();
    assert_eq!(store.datasets().len(), 2);
    assert!(store.is_visible(UiComponent::RightSidebar));
    assert_eq!(store.user().map(|u| u.token), Some("session:abc123".to_owned()));
    assert_eq!(summary.places, 4);
    assert_eq!(store.places("alice", "trees").len(), 3);
    assert_eq!(store.places("alice", "bikes").len(), 1);
    assert_eq!(store.places_load_status(), PlacesLoadStatus::Loaded);

    mounted.unmount();
}

#[tokio::test]
async fn test_failed_startup_renders_error_view() {
    // Arrange
    let api = FakeMapseedApi::new()
        .with_session("abc123")
        .with_dataset_status("alice", "trees", 500)
        .with_dataset_status("alice", "bikes", 404);
    let runtime = runtime(api, "/", false);

    // Act
    let result = runtime.mount().await;

    // Assert
    assert!(matches!(
        result,
        Err(AppError::Bootstrap(BootstrapError::NoDatasetsLoaded { configured: 2 }))
    ));
    assert!(matches!(
        runtime.app().view(),
        View::Error {
            step: BootstrapStep::Datasets,
            ..
        }
    ));
}

#[tokio::test]
async fn test_new_place_without_create_permission_redirects_home() {
    // Arrange
    let runtime = runtime(backend(), "/new", false);

    // Act
    let mounted = runtime.mount().await.unwrap();
    let view = runtime.app().view();

    // Assert
    let View::Page(page) = view else {
        panic!("expected a page view, got {view:?}");
    };
    assert_eq!(page.route, Route::Map);
    assert_eq!(runtime.history().pushed(), vec!["/".to_owned()]);

    mounted.unmount();
}

#[tokio::test]
async fn test_internal_link_click_and_resize_change_the_view() {
    // Arrange
    let runtime = runtime(backend(), "/", false);
    let mounted = runtime.mount().await.unwrap();

    // Act
    let disposition = runtime.host().dispatch(&HostEvent::Click(ClickEvent {
        target: Some(
            ElementAttributes::new()
                .with("rel", "internal")
                .with("href", "/print-report/street-trees/1"),
        ),
    }));
    runtime.host().dispatch(&HostEvent::Resize(Viewport {
        width: 600,
        height: 800,
    }));
    let report = runtime.app().view();
    runtime.history().push("/list");
    let list = runtime.app().view();

    // Assert
    assert_eq!(disposition, EventDisposition::PreventDefault);
    let (View::Page(report), View::Page(list)) = (report, list) else {
        panic!("expected page views");
    };
    assert_eq!(report.template, Template::Report);
    assert!(!report.show_header);
    assert_eq!(report.overflow, Overflow::Visible);
    assert_eq!(list.template, Template::List);
    assert_eq!(list.overflow, Overflow::Auto);

    mounted.unmount();
}

#[tokio::test]
async fn test_change_language_after_mount() {
    // Arrange
    let runtime = runtime(backend(), "/page/about", false);
    let mounted = runtime.mount().await.unwrap();
    let before = mounted.localization().translate("ui", "submitButton", None);

    // Act
    let changed = runtime.app().change_language("es");
    let view = runtime.app().view();

    // Assert
    assert!(changed);
    let View::Page(page) = view else {
        panic!("expected a page view, got {view:?}");
    };
    assert_eq!(page.content_page.as_deref(), Some("about"));
    assert_eq!(page.language.map(|l| l.current), Some("es".to_owned()));
    assert_eq!(before, "Submit");
    assert_eq!(mounted.localization().language(), "es");

    mounted.unmount();
}
