//! Integration tests for the development server.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; the
//! live-reload test runs a real server on an ephemeral port.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use elmwatch_cli::config::ElmwatchConfig;
use elmwatch_cli::dev::server::{CLIENT_PATH, EVENTS_PATH, build_router};
use elmwatch_cli::dev::{DevConfig, DevServer, DevServerState, SharedState};
use elmwatch_cli::error::CliError;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Duration, timeout};
use tokio_stream::StreamExt;
use tower::ServiceExt;

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const INDEX: &str = "<html><head><title>App</title></head><body><div id=\"app\"></div></body></html>";

fn setup_public() -> TempDir {
    let temp = TempDir::new().unwrap();
    let public = temp.path().join("public");
    fs::create_dir_all(&public).unwrap();
    fs::write(public.join("index.html"), INDEX).unwrap();
    fs::write(public.join("main.js"), "var Elm = {};").unwrap();
    temp
}

fn state_for(root: &Path, notify: bool) -> SharedState {
    Arc::new(DevServerState::new(root.join("public"), notify))
}

fn get(uri: &str, accept: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(accept) = accept {
        builder = builder.header(header::ACCEPT, accept);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_serves_static_file() {
    let temp = setup_public();
    let app = build_router(state_for(temp.path(), false), true);

    let response = app.oneshot(get("/main.js", Some("*/*"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "var Elm = {};");
}

#[tokio::test]
async fn test_index_gets_reload_script() {
    let temp = setup_public();
    let app = build_router(state_for(temp.path(), false), true);

    let response = app.oneshot(get("/", Some(BROWSER_ACCEPT))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache"
    );
    let body = body_text(response).await;
    assert!(body.contains("<div id=\"app\"></div>"));
    let script = body.find(CLIENT_PATH).unwrap();
    assert!(script < body.find("</body>").unwrap());
}

#[tokio::test]
async fn test_history_fallback_serves_index() {
    let temp = setup_public();
    let app = build_router(state_for(temp.path(), false), true);

    let response = app
        .oneshot(get("/users/42/settings", Some(BROWSER_ACCEPT)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<title>App</title>"));
}

#[tokio::test]
async fn test_missing_asset_is_not_found() {
    let temp = setup_public();
    let app = build_router(state_for(temp.path(), false), true);

    let response = app
        .oneshot(get("/missing.js", Some(BROWSER_ACCEPT)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_json_request_is_not_rewritten() {
    let temp = setup_public();
    let app = build_router(state_for(temp.path(), false), true);

    let response = app
        .oneshot(get("/api/users", Some("application/json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_fallback_can_be_disabled() {
    let temp = setup_public();
    let app = build_router(state_for(temp.path(), false), false);

    let response = app
        .oneshot(get("/users/42", Some(BROWSER_ACCEPT)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reload_script_reflects_notify_setting() {
    let temp = setup_public();

    let quiet = build_router(state_for(temp.path(), false), true)
        .oneshot(get(CLIENT_PATH, None))
        .await
        .unwrap();
    assert_eq!(quiet.status(), StatusCode::OK);
    assert!(
        body_text(quiet)
            .await
            .starts_with("window.__ELMWATCH_NOTIFY__ = false;")
    );

    let notify = build_router(state_for(temp.path(), true), true)
        .oneshot(get(CLIENT_PATH, None))
        .await
        .unwrap();
    let script = body_text(notify).await;
    assert!(script.starts_with("window.__ELMWATCH_NOTIFY__ = true;"));
    assert!(script.contains("EventSource"));
}

#[tokio::test]
async fn test_sse_registers_client_and_greets() {
    let temp = setup_public();
    let state = state_for(temp.path(), false);
    let app = build_router(state.clone(), true);

    let response = app
        .oneshot(get(EVENTS_PATH, Some("text/event-stream")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );
    assert_eq!(state.client_count(), 1);

    let mut stream = response.into_body().into_data_stream();
    let chunk = timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("no SSE frame received")
        .unwrap()
        .unwrap();
    let frame = String::from_utf8(chunk.to_vec()).unwrap();
    assert!(frame.contains(r#""type":"Connected""#));
}

/// Read from the socket until `needle` shows up in the accumulated text.
async fn read_until(stream: &mut TcpStream, seen: &mut String, needle: &str) {
    let mut buf = [0u8; 4096];
    while !seen.contains(needle) {
        let n = stream.read(&mut buf).await.unwrap();
        assert!(n > 0, "connection closed before {:?} arrived", needle);
        seen.push_str(&String::from_utf8_lossy(&buf[..n]));
    }
}

#[tokio::test]
async fn test_output_change_pushes_reload() {
    let temp = setup_public();
    let root = temp.path().canonicalize().unwrap();

    let config = DevConfig::new(
        ElmwatchConfig {
            port: 0,
            ..ElmwatchConfig::default()
        },
        root.clone(),
    )
    .unwrap();
    let state = Arc::new(DevServerState::new(config.server_root(), false));
    let bound = DevServer::new(config, state).bind().await.unwrap();
    let addr = bound.local_addr().unwrap();
    let server = tokio::spawn(bound.serve());

    let mut stream = TcpStream::connect(addr).await.unwrap();

    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nAccept: text/event-stream\r\n\r\n",
        EVENTS_PATH, addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut seen = String::new();
    timeout(
        Duration::from_secs(5),
        read_until(&mut stream, &mut seen, "Connected"),
    )
    .await
    .expect("no Connected event");

    fs::write(root.join("public").join("main.js"), "var Elm = { rebuilt: true };").unwrap();

    timeout(
        Duration::from_secs(5),
        read_until(&mut stream, &mut seen, r#""path":"main.js""#),
    )
    .await
    .expect("no Reload event");
    assert!(seen.contains(r#""type":"Reload""#));

    server.abort();
}

#[tokio::test]
async fn test_bind_fails_on_occupied_port() {
    let temp = setup_public();
    let root = temp.path().canonicalize().unwrap();

    let Ok(occupied) = std::net::TcpListener::bind(("127.0.0.1", 0)) else {
        return;
    };
    let config = DevConfig {
        base: ElmwatchConfig::default(),
        root,
        addr: occupied.local_addr().unwrap(),
    };
    let state = Arc::new(DevServerState::new(config.server_root(), false));

    let err = match DevServer::new(config, state).bind().await {
        Ok(_) => panic!("bind succeeded on an occupied port"),
        Err(err) => err,
    };
    assert!(matches!(err, CliError::Custom(_)));
    let message = err.to_string();
    assert!(message.contains("Failed to bind"));
    assert!(message.contains("Hint:"));
    assert!(message.contains("--port"));
}
