use auth::AuthorizationService;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode}
};
use config::Config;
use ingest_core::{GeoData, UaResolver};
use metrics_exporter_prometheus::PrometheusBuilder;
use registry::AppConfig;
use resolvers::WootheeUaResolver;
use serde_json::{Value, json};
use server::{AppState, create_router};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use testing::{MemoryFactSink, StaticGeoResolver};
use tower::ServiceExt;

const TOKEN: &str = "123qwe";
const CHROME_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_5) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/83.0.4103.97 Safari/537.36";

fn moscow() -> GeoData {
    GeoData {
        country: "RU".to_string(),
        region: "MOW".to_string(),
        city: "Moscow".to_string(),
        zip: "101194".to_string(),
        lat: Some(55.7527),
        lon: Some(37.6172)
    }
}

struct TestApp {
    router: Router,
    sink: Arc<MemoryFactSink>,
    geo: Arc<StaticGeoResolver>
}

fn test_app_with(static_dir: Option<&Path>, metrics: bool) -> TestApp {
    let mut config = Config::default();
    if let Some(dir) = static_dir {
        config.server.static_files_dir = dir.to_path_buf();
    }

    let authorization =
        AuthorizationService::new(&[TOKEN.to_string()], None, Duration::from_secs(30)).unwrap();
    let geo = Arc::new(StaticGeoResolver::new(moscow()));
    let app = Arc::new(AppConfig::new(
        config,
        "test-server".to_string(),
        geo.clone(),
        Arc::new(WootheeUaResolver::new()),
        Arc::new(authorization)
    ));

    let sink = Arc::new(MemoryFactSink::default());
    let preprocessor = Arc::new(events::ApiPreprocessor::new(&app));
    let handle = metrics.then(|| PrometheusBuilder::new().build_recorder().handle());
    let state = Arc::new(AppState::with_parts(app, preprocessor, sink.clone(), handle));

    TestApp {
        router: create_router(state),
        sink,
        geo
    }
}

fn test_app() -> TestApp {
    test_app_with(None, false)
}

fn post_event(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-real-ip", "95.82.232.185")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_ping() {
    let app = test_app();

    let response = app
        .router
        .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"pong");
}

#[tokio::test]
async fn test_health_reports_server_name() {
    let app = test_app();

    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["server_name"], "test-server");
}

#[tokio::test]
async fn test_click_event_is_enriched_and_delivered() {
    let app = test_app();
    let input = json!({
        "event": "click",
        "device_ctx": {"ip": "95.82.232.185", "ua": CHROME_UA}
    });

    let response = app
        .router
        .oneshot(post_event(
            &format!("/api/v1/event?token={TOKEN}"),
            &input.to_string()
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "ok"}));

    let facts = app.sink.facts();
    assert_eq!(facts.len(), 1);
    let fact = &facts[0];
    assert_eq!(fact["event"], "click");
    assert_eq!(fact["src"], "api");
    assert_eq!(fact["source_ip"], "95.82.232.185");
    assert_eq!(fact["device_ctx"]["ip"], "95.82.232.185");
    assert_eq!(fact["device_ctx"]["ua"], CHROME_UA);
    assert_eq!(fact["device_ctx"]["geo"], moscow().to_value());
    assert_eq!(
        fact["device_ctx"]["parsed_ua"],
        WootheeUaResolver::new().resolve(CHROME_UA).to_value()
    );
    assert_eq!(fact["device_ctx"]["parsed_ua"]["ua_family"], "Chrome");
    assert_eq!(app.geo.lookups(), vec!["95.82.232.185"]);
}

#[tokio::test]
async fn test_token_header_is_accepted() {
    let app = test_app();
    let mut request = post_event("/api/v1/event", r#"{"event":"view"}"#);
    request
        .headers_mut()
        .insert("x-auth-token", TOKEN.parse().unwrap());

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.sink.len(), 1);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = test_app();

    let response = app
        .router
        .oneshot(post_event("/api/v1/event", r#"{"event":"view"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.sink.is_empty());
}

#[tokio::test]
async fn test_wrong_token_is_unauthorized() {
    let app = test_app();

    let response = app
        .router
        .oneshot(post_event("/api/v1/event?token=nope", r#"{"event":"view"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app();

    let response = app
        .router
        .oneshot(post_event(&format!("/api/v1/event?token={TOKEN}"), "{\"event\":"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_JSON");
    assert!(app.sink.is_empty());
}

#[tokio::test]
async fn test_null_and_non_object_bodies_are_invalid_input() {
    for body in ["null", "[1,2]", "\"click\""] {
        let app = test_app();

        let response = app
            .router
            .oneshot(post_event(&format!("/api/v1/event?token={TOKEN}"), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(body_json(response).await["code"], "INVALID_INPUT");
        assert!(app.sink.is_empty());
    }
}

#[tokio::test]
async fn test_metrics_disabled_is_not_found() {
    let app = test_app();

    let response = app
        .router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_enabled_renders() {
    let app = test_app_with(None, true);

    let response = app
        .router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_static_files_served_under_s() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("lib.js"), "console.log('track');").unwrap();
    let app = test_app_with(Some(dir.path()), false);

    let response = app
        .router
        .oneshot(Request::builder().uri("/s/lib.js").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"console.log('track');");
}
