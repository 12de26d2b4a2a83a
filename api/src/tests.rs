use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shared::Config;
use tower::ServiceExt;

use crate::routes::router;
use crate::state::AppState;

const GOLDEN_CROSS: &str = include_str!("../../shared/tests/fixtures/golden_cross.py");

fn app_with(config: Config) -> Router {
    router(Arc::new(AppState::new(config)))
}

fn app() -> Router {
    app_with(Config::default())
}

fn app_for_dir(dir: &Path) -> Router {
    app_with(Config {
        strategies_path: dir.to_path_buf(),
        presets_path: dir.to_path_buf(),
        ..Config::default()
    })
}

fn post_code(uri: &str, code: &str) -> Request<Body> {
    let body = serde_json::json!({ "code": code });
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn read_body(resp: axum::response::Response) -> Vec<u8> {
    resp.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn json_body(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&read_body(resp).await).unwrap()
}

#[tokio::test]
async fn test_health() {
    let resp = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "ok");
}

#[tokio::test]
async fn test_parse_returns_strategy() {
    let resp = app()
        .oneshot(post_code("/api/strategy/parse", GOLDEN_CROSS))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = json_body(resp).await;
    assert_eq!(json["status"], "parsed");
    assert_eq!(json["strategy"]["name"], "BTC Golden Cross");
    assert_eq!(json["strategy"]["riskParams"]["leverage"], "20x");
}

#[tokio::test]
async fn test_parse_contentless_code_is_empty() {
    let resp = app()
        .oneshot(post_code("/api/strategy/parse", "print('hello')"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json, serde_json::json!({ "status": "empty" }));
}

#[tokio::test]
async fn test_oversized_code_is_rejected() {
    let app = app_with(Config {
        max_code_bytes: 64,
        ..Config::default()
    });
    let resp = app
        .oneshot(post_code("/api/strategy/parse", &"x = 1\n".repeat(20)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(json_body(resp).await["error"].as_str().unwrap().contains("64"));
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/strategy/parse")
        .header("content-type", "application/json")
        .body(Body::from("{\"source\": 1}"))
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert!(resp.status().is_client_error());
    assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
async fn test_flow_graph() {
    let resp = app()
        .oneshot(post_code("/api/strategy/flow", GOLDEN_CROSS))
        .await
        .unwrap();
    let json = json_body(resp).await;
    assert_eq!(json["status"], "parsed");
    assert_eq!(json["graph"]["nodes"][0]["id"], "ds-orderly");
    assert_eq!(json["graph"]["edges"][0]["id"], "ds-orderly->ind-sma");
}

#[tokio::test]
async fn test_stored_strategy_routes() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("golden_cross.py"), GOLDEN_CROSS).unwrap();
    std::fs::write(dir.path().join("blank.py"), "# nothing here\n").unwrap();
    let app = app_for_dir(dir.path());

    let resp = app.clone().oneshot(get("/api/strategies")).await.unwrap();
    assert_eq!(
        json_body(resp).await["strategies"],
        serde_json::json!(["blank", "golden_cross"])
    );

    let resp = app
        .clone()
        .oneshot(get("/api/strategies/golden_cross"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["strategy"]["strategyType"], "MA Crossover");

    let resp = app
        .clone()
        .oneshot(get("/api/strategies/golden_cross/report"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(read_body(resp).await).unwrap();
    assert!(html.contains("BTC Golden Cross"));

    let resp = app
        .oneshot(get("/api/strategies/blank/report"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_and_invalid_names() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_for_dir(dir.path());

    let resp = app
        .clone()
        .oneshot(get("/api/strategies/no_such_strategy_here"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.oneshot(get("/api/strategies/bad.name")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
