//! Integration tests for the Label Registry API

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use label_registry::{build_app, AppConfig, CodeScheme, SequenceMode};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    dir: TempDir,
}

fn app(mode: SequenceMode, api_key: Option<&str>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let public_dir = dir.path().join("public");
    std::fs::create_dir_all(&public_dir).unwrap();
    std::fs::write(public_dir.join("index.html"), "<html>labels</html>").unwrap();

    let config = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        scheme: CodeScheme {
            prefix: "A-".to_string(),
            digits: 3,
        },
        mode,
        api_key: api_key.map(str::to_string),
        data_dir: dir.path().join("data"),
        public_dir,
    };
    let router = build_app(&config).unwrap();
    TestApp { router, dir }
}

impl TestApp {
    fn db_file(&self) -> PathBuf {
        self.dir.path().join("data").join("db.json")
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_with_key(method, uri, body, None).await
    }

    async fn send_with_key(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        key: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }
}

fn codes(labels: &Value) -> Vec<String> {
    labels
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["code"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_generate_and_reload() {
    let app = app(SequenceMode::Derived, None);

    let (status, body) = app
        .send(Method::POST, "/api/labels/generate", Some(json!({"count": 3})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(codes(&body["added"]), ["A-001", "A-002", "A-003"]);
    assert_eq!(body["added"][0]["id"], 1);
    assert_eq!(body["added"][2]["id"], 3);
    assert_eq!(body["added"][0]["art"], "Articulo 01");
    assert!(body["added"][0]["createdAt"].is_string());
    assert_eq!(
        body["state"],
        json!({"prefix": "A-", "digits": 3, "next": 4, "nameSeq": 4})
    );

    let (status, listed) = app.send(Method::GET, "/api/labels", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, body["added"]);

    let persisted: Value =
        serde_json::from_str(&std::fs::read_to_string(app.db_file()).unwrap()).unwrap();
    assert_eq!(persisted["labels"], body["added"]);
    assert!(persisted.get("state").is_none());
}

#[tokio::test]
async fn test_generate_validation() {
    let app = app(SequenceMode::Derived, None);

    for count in [0, 1000] {
        let (status, body) = app
            .send(Method::POST, "/api/labels/generate", Some(json!({"count": count})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    let (status, _) = app
        .send(Method::POST, "/api/labels/generate", Some(json!({"count": 999})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, labels) = app.send(Method::GET, "/api/labels", None).await;
    assert_eq!(labels.as_array().unwrap().len(), 999);
}

#[tokio::test]
async fn test_generate_with_item_name() {
    let app = app(SequenceMode::Derived, None);
    let (_, body) = app
        .send(
            Method::POST,
            "/api/labels/generate",
            Some(json!({"count": 2, "item": "  Cuaderno "})),
        )
        .await;
    assert_eq!(body["added"][0]["art"], "Cuaderno");
    assert_eq!(body["added"][1]["art"], "Cuaderno");
}

#[tokio::test]
async fn test_update_label() {
    let app = app(SequenceMode::Derived, None);
    app.send(Method::POST, "/api/labels/generate", Some(json!({"count": 2})))
        .await;

    let (status, body) = app
        .send(Method::PUT, "/api/labels/2", Some(json!({"code": "A-001"})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, body) = app
        .send(Method::PUT, "/api/labels/1", Some(json!({"code": "A-001", "art": "Regla"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "A-001");
    assert_eq!(body["art"], "Regla");

    let (status, _) = app
        .send(Method::PUT, "/api/labels/1", Some(json!({"code": "   "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::PUT, "/api/labels/42", Some(json!({"art": "x"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::PUT, "/api/labels/abc", Some(json!({"art": "x"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_derived_state_follows_edited_codes() {
    let app = app(SequenceMode::Derived, None);
    app.send(Method::POST, "/api/labels/generate", Some(json!({"count": 1})))
        .await;
    app.send(Method::PUT, "/api/labels/1", Some(json!({"code": "X-007"})))
        .await;

    let (_, state) = app.send(Method::GET, "/api/state", None).await;
    assert_eq!(state["next"], 8);

    let (status, patched) = app
        .send(Method::PATCH, "/api/state", Some(json!({"prefix": "Z-", "next": 1})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched, state);
}

#[tokio::test]
async fn test_delete_label() {
    let app = app(SequenceMode::Derived, None);
    app.send(Method::POST, "/api/labels/generate", Some(json!({"count": 2})))
        .await;

    let (status, body) = app.send(Method::DELETE, "/api/labels/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, _) = app.send(Method::DELETE, "/api/labels/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, labels) = app.send(Method::GET, "/api/labels", None).await;
    assert_eq!(codes(&labels), ["A-002"]);

    let (status, _) = app.send(Method::DELETE, "/api/labels", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_stored_mode_state_and_delete_all() {
    let app = app(SequenceMode::Stored, None);

    let (_, state) = app.send(Method::GET, "/api/state", None).await;
    assert_eq!(state, json!({"prefix": "A-", "digits": 3, "next": 1}));

    let (status, state) = app
        .send(Method::PATCH, "/api/state", Some(json!({"prefix": "B-", "digits": 4, "next": 10})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state, json!({"prefix": "B-", "digits": 4, "next": 10}));

    let (_, body) = app
        .send(Method::POST, "/api/labels/generate", Some(json!({"count": 2})))
        .await;
    assert_eq!(codes(&body["added"]), ["B-0010", "B-0011"]);
    assert_eq!(body["state"]["next"], 12);

    let (status, _) = app
        .send(Method::PATCH, "/api/state", Some(json!({"digits": -1})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let persisted: Value =
        serde_json::from_str(&std::fs::read_to_string(app.db_file()).unwrap()).unwrap();
    assert_eq!(persisted["state"]["next"], 12);

    let (status, body) = app.send(Method::DELETE, "/api/labels", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["state"]["next"], 1);

    let (_, labels) = app.send(Method::GET, "/api/labels", None).await;
    assert!(labels.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_access_guard() {
    let app = app(SequenceMode::Derived, Some("s3cret"));

    let (status, body) = app.send(Method::GET, "/api/labels", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app
        .send_with_key(Method::GET, "/api/labels", None, Some("wrong"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send_with_key(Method::GET, "/api/labels", None, Some("s3cret"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());
}

#[tokio::test]
async fn test_no_guard_without_key() {
    let app = app(SequenceMode::Derived, None);
    let (status, _) = app.send(Method::GET, "/api/state", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_frontend_fallback() {
    let app = app(SequenceMode::Derived, None);
    let (status, body) = app.send(Method::GET, "/some/client/route", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("<html>labels</html>".to_string()));
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let app = app(SequenceMode::Derived, None);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/labels/generate")
        .header("content-type", "application/json")
        .body(Body::from("{count:"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_body_keeps_error_shape() {
    let app = app(SequenceMode::Derived, None);
    let big_item = "x".repeat(2 * 1024 * 1024);
    let (status, body) = app
        .send(
            Method::POST,
            "/api/labels/generate",
            Some(json!({"count": 1, "item": big_item})),
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());

    let (_, labels) = app.send(Method::GET, "/api/labels", None).await;
    assert!(labels.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_stored_generate_conflicts_with_edited_code() {
    let app = app(SequenceMode::Stored, None);
    app.send(Method::POST, "/api/labels/generate", Some(json!({"count": 1})))
        .await;
    app.send(Method::PUT, "/api/labels/1", Some(json!({"code": "A-002"})))
        .await;

    let (status, body) = app
        .send(Method::POST, "/api/labels/generate", Some(json!({"count": 1})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (_, labels) = app.send(Method::GET, "/api/labels", None).await;
    assert_eq!(codes(&labels), ["A-002"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_generates_stay_unique() {
    let app = app(SequenceMode::Derived, None);
    let router = app.router.clone();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/labels/generate")
                .header("content-type", "application/json")
                .body(Body::from(json!({"count": 5}).to_string()))
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let (_, labels) = app.send(Method::GET, "/api/labels", None).await;
    let labels = labels.as_array().unwrap();
    assert_eq!(labels.len(), 80);

    let mut ids: Vec<u64> = labels.iter().map(|l| l["id"].as_u64().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 80);

    let mut all_codes = codes(&Value::Array(labels.clone()));
    all_codes.sort();
    all_codes.dedup();
    assert_eq!(all_codes.len(), 80);
}
