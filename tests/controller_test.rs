use httpmock::prelude::*;
use serde_json::json;
use softserve_map::adapters::http::HttpSource;
use softserve_map::core::controller::{LoadStatus, MapController};
use softserve_map::domain::model::{Toast, ToastLevel};
use softserve_map::{MapConfig, StaticPositionSource};
use std::time::Duration;

fn config_for(url: String) -> MapConfig {
    let mut config = MapConfig::default();
    config.source.url = url;
    config.source.timeout_seconds = 5;
    config
}

fn source() -> HttpSource {
    HttpSource::new(Duration::from_secs(5)).unwrap()
}

fn controller(
    config: MapConfig,
    position: StaticPositionSource,
) -> MapController<HttpSource, StaticPositionSource, Vec<Toast>> {
    MapController::new(config, source(), position, Vec::new())
}

#[tokio::test]
async fn test_start_renders_columnar_payload() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/stores.json");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "keys": ["NAME", "py", "px", "flavorType", "markerColor"],
                "data": [
                    ["A", "25.03", "121.5", "單口味", "blue"],
                    ["B", "bad", "121.5", "雙口味", "red"]
                ],
                "last_updated": "2024-01-01"
            }));
    });

    let mut controller = controller(
        config_for(server.url("/stores.json")),
        StaticPositionSource::at(25.04, 121.55),
    );
    let status = controller.start().await.unwrap();

    api_mock.assert();
    assert_eq!(status, LoadStatus::Loaded { stores: 1, rejected: 1 });
    assert_eq!(controller.map().markers().len(), 1);
    assert_eq!(controller.map().markers()[0].icon_key, "blue");
    assert_eq!(controller.map().timestamp_text(), Some("資料更新時間：2024-01-01"));
    assert!(!controller.loading().is_visible());

    // 自動定位成功：移到使用者位置，但不顯示提示
    let viewport = controller.map().viewport();
    assert_eq!(viewport.zoom, 15);
    assert_eq!(viewport.latitude, 25.04);
    assert!(controller.map().user_marker().is_some());
    assert!(controller.notifier().surface().is_empty());

    controller.shutdown();
}

#[tokio::test]
async fn test_failed_fetch_shows_single_toast_and_keeps_map_usable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stores.json");
        then.status(500);
    });

    let config = config_for(server.url("/stores.json"));
    let expected = config.messages.load_failed.clone();
    let mut controller = controller(config, StaticPositionSource::unsupported());

    let status = controller.start().await.unwrap();

    assert_eq!(status, LoadStatus::Failed);
    assert!(controller.map().is_initialized());
    assert!(controller.map().markers().is_empty());
    assert!(controller.result().is_none());
    assert!(!controller.loading().is_visible());

    // 自動定位失敗只寫日誌
    let toasts = controller.notifier().surface();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);
    assert_eq!(toasts[0].message, expected);
}

#[tokio::test]
async fn test_connection_refused_shows_offline_message() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let config = config_for(format!("http://127.0.0.1:{}/stores.json", port));
    let expected = config.messages.offline.clone();
    let mut controller = controller(config, StaticPositionSource::unsupported());

    assert_eq!(controller.start().await.unwrap(), LoadStatus::Failed);

    let toasts = controller.notifier().surface();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, expected);
}

#[tokio::test]
async fn test_malformed_payload_is_reported_once() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stores.json");
        then.status(200).json_body(json!({"stores": []}));
    });

    let mut controller = controller(
        config_for(server.url("/stores.json")),
        StaticPositionSource::unsupported(),
    );

    assert_eq!(controller.start().await.unwrap(), LoadStatus::Failed);
    assert_eq!(controller.notifier().surface().len(), 1);
}

#[tokio::test]
async fn test_user_initiated_locate_failure_is_throttled() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stores.json");
        then.status(200).json_body(json!([]));
    });

    let config = config_for(server.url("/stores.json"));
    let expected = config.messages.geo_not_supported.clone();
    let mut controller = controller(config, StaticPositionSource::unsupported());
    assert_eq!(
        controller.start().await.unwrap(),
        LoadStatus::Loaded { stores: 0, rejected: 0 }
    );

    assert!(controller.locate_user(true).await.is_none());
    assert!(controller.locate_user(true).await.is_none());

    let toasts = controller.notifier().surface();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, expected);
}

#[tokio::test]
async fn test_user_locate_starts_watch_and_applies_updates() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stores.json");
        then.status(200).json_body(json!([]));
    });

    let mut config = config_for(server.url("/stores.json"));
    config.location.auto_locate = false;
    let mut controller = controller(config, StaticPositionSource::at(22.62, 120.30));
    controller.start().await.unwrap();
    assert!(controller.map().user_marker().is_none());

    let coords = controller.locate_user(true).await.unwrap();
    assert_eq!(coords.latitude, 22.62);
    assert_eq!(controller.notifier().surface()[0].level, ToastLevel::Success);

    let mut applied = 0;
    for _ in 0..50 {
        applied += controller.apply_location_updates();
        if applied > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(applied, 1);
    let marker = controller.map().user_marker().unwrap();
    assert_eq!((marker.latitude, marker.longitude), (22.62, 120.30));
}

#[tokio::test]
async fn test_await_location_updates_waits_for_watch_report() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stores.json");
        then.status(200).json_body(json!([]));
    });

    let mut controller = controller(
        config_for(server.url("/stores.json")),
        StaticPositionSource::at(24.15, 120.67),
    );
    controller.start().await.unwrap();

    let applied = controller
        .await_location_updates(Duration::from_secs(2))
        .await;

    assert_eq!(applied, 1);
    let marker = controller.map().user_marker().unwrap();
    assert_eq!((marker.latitude, marker.longitude), (24.15, 120.67));
}

#[tokio::test]
async fn test_await_location_updates_returns_at_once_without_watch() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stores.json");
        then.status(200).json_body(json!([]));
    });

    let mut config = config_for(server.url("/stores.json"));
    config.location.auto_locate = false;
    let mut controller = controller(config, StaticPositionSource::at(24.15, 120.67));
    controller.start().await.unwrap();

    let started = std::time::Instant::now();
    let applied = controller
        .await_location_updates(Duration::from_secs(5))
        .await;

    assert_eq!(applied, 0);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(controller.map().user_marker().is_none());
}
