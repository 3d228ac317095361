//! End-to-end tests for the config routes against a temporary data file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use homedash_server::{create_router, ApiResponse, AppState, DashboardState};
use homedash_services::ConfigStore;
use tempfile::TempDir;
use tokio::sync::Notify;
use tower::ServiceExt;

struct TestApp {
    _dir: TempDir,
    data_file: PathBuf,
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data_file = dir.path().join("config.json");
        let index_page = dir.path().join("index.html");
        let dashboard = DashboardState::new(ConfigStore::new(&data_file)).shared();
        let state = AppState::new(dashboard, Arc::new(Notify::new()), index_page);

        Self {
            _dir: dir,
            data_file,
            state,
        }
    }

    fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    fn index_page(&self) -> &Path {
        self.state.index_page.as_path()
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn post(content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/update_config")
        .header("content-type", content_type)
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn json_update_creates_file_with_all_keys() {
    let app = TestApp::new();

    let (status, body) = send(
        app.router(),
        post(
            "application/json",
            r#"{"latitude": 40.0, "longitude": -75.0, "apiKey": "k"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response: ApiResponse = serde_json::from_slice(&body).unwrap();
    assert!(response.success);
    assert_eq!(response.message, "Configuration updated successfully!");

    let persisted: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&app.data_file).unwrap()).unwrap();
    assert_eq!(
        persisted,
        serde_json::json!({
            "apiKey": "k",
            "latitude": 40.0,
            "longitude": -75.0,
            "tasks": []
        })
    );
}

#[tokio::test]
async fn update_refreshes_memory_and_signals_loop() {
    let app = TestApp::new();

    let (status, _) = send(
        app.router(),
        post("application/json", r#"{"apiKey": "fresh"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.state.dashboard.lock().store.current().api_key, "fresh");
    tokio::time::timeout(Duration::from_secs(1), app.state.refresh.notified())
        .await
        .expect("refresh signal");
}

#[tokio::test]
async fn empty_form_is_rejected_without_writing() {
    let app = TestApp::new();

    let (status, body) = send(
        app.router(),
        post("application/x-www-form-urlencoded", ""),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: ApiResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        response,
        ApiResponse {
            success: false,
            message: "No JSON or form data provided".to_string(),
        }
    );
    assert!(!app.data_file.exists());
}

#[tokio::test]
async fn malformed_json_is_rejected_without_writing() {
    let app = TestApp::new();
    std::fs::write(&app.data_file, r#"{"apiKey": "keep"}"#).unwrap();

    let (status, body) = send(app.router(), post("application/json", "{oops")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: ApiResponse = serde_json::from_slice(&body).unwrap();
    assert!(!response.success);
    assert_eq!(
        std::fs::read_to_string(&app.data_file).unwrap(),
        r#"{"apiKey": "keep"}"#
    );
}

#[tokio::test]
async fn non_numeric_latitude_is_rejected() {
    let app = TestApp::new();

    let (status, _) = send(
        app.router(),
        post("application/json", r#"{"latitude": "north"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!app.data_file.exists());
}

#[tokio::test]
async fn form_update_merges_over_existing_document() {
    let app = TestApp::new();
    std::fs::write(
        &app.data_file,
        r#"{"apiKey": "k", "latitude": 1.0, "longitude": 2.0, "tasks": []}"#,
    )
    .unwrap();

    let tasks = r#"[{"taskText":"Bins out","isChecked":true}]"#;
    let form = format!(
        "latitude=10.5&tasks={}",
        url::form_urlencoded::byte_serialize(tasks.as_bytes()).collect::<String>()
    );
    let (status, _) = send(
        app.router(),
        post("application/x-www-form-urlencoded", form),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(app.router(), get("/get_config")).await;
    let document: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(document["apiKey"], "k");
    assert_eq!(document["latitude"], 10.5);
    assert_eq!(document["longitude"], 2.0);
    assert_eq!(document["tasks"][0]["taskText"], "Bins out");
    assert_eq!(document["tasks"][0]["isChecked"], true);
}

#[tokio::test]
async fn get_config_without_file_returns_defaults() {
    let app = TestApp::new();

    let (status, body) = send(app.router(), get("/get_config")).await;

    assert_eq!(status, StatusCode::OK);
    let document: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        document,
        serde_json::json!({"apiKey": "", "latitude": 0.0, "longitude": 0.0, "tasks": []})
    );
}

#[tokio::test]
async fn get_config_with_malformed_file_returns_defaults() {
    let app = TestApp::new();
    std::fs::write(&app.data_file, "not json").unwrap();

    let (status, body) = send(app.router(), get("/get_config")).await;

    assert_eq!(status, StatusCode::OK);
    let document: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(document["apiKey"], "");
}

#[tokio::test]
async fn get_config_returns_stored_values_verbatim() {
    let app = TestApp::new();
    std::fs::write(
        &app.data_file,
        r#"{"apiKey": "k", "latitude": 40, "longitude": -75, "tasks": [], "theme": "dark"}"#,
    )
    .unwrap();

    let (_, body) = send(app.router(), get("/get_config")).await;

    let document: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        document,
        serde_json::json!({"apiKey": "k", "latitude": 40, "longitude": -75, "tasks": [], "theme": "dark"})
    );
}

#[tokio::test]
async fn mistyped_task_does_not_wipe_other_fields() {
    let app = TestApp::new();
    std::fs::write(
        &app.data_file,
        r#"{"apiKey":"secret","latitude":40,"longitude":-75,"tasks":[{"taskText":"a","isChecked":"yes"}]}"#,
    )
    .unwrap();

    let (_, body) = send(app.router(), get("/get_config")).await;
    let document: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(document["apiKey"], "secret");
    assert_eq!(document["tasks"][0]["isChecked"], false);

    let (status, _) = send(app.router(), post("application/json", r#"{"tasks": []}"#)).await;
    assert_eq!(status, StatusCode::OK);

    let persisted: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&app.data_file).unwrap()).unwrap();
    assert_eq!(persisted["apiKey"], "secret");
    assert_eq!(persisted["latitude"], 40.0);
    assert_eq!(persisted["longitude"], -75.0);
    assert_eq!(persisted["tasks"], serde_json::json!([]));
}

#[tokio::test]
async fn get_config_is_idempotent() {
    let app = TestApp::new();
    std::fs::write(
        &app.data_file,
        r#"{"apiKey": "k", "latitude": 3.0, "longitude": 4.0, "tasks": [{"taskText": "a", "isChecked": false}]}"#,
    )
    .unwrap();

    let (_, first) = send(app.router(), get("/get_config")).await;
    let (_, second) = send(app.router(), get("/get_config")).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn index_page_is_served() {
    let app = TestApp::new();
    std::fs::write(app.index_page(), "<h1>Dashboard</h1>").unwrap();

    let (status, body) = send(app.router(), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>Dashboard</h1>");
}

#[tokio::test]
async fn missing_index_page_is_json_404() {
    let app = TestApp::new();

    let (status, body) = send(app.router(), get("/")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let response: ApiResponse = serde_json::from_slice(&body).unwrap();
    assert!(!response.success);
}
