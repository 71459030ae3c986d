//! End-to-end behaviour of the cache-aware file handler

use asset_server::config::{AppState, Config};
use asset_server::handler::FileHandler;
use asset_server::logger::Logger;
use asset_server::server;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{ACCEPT, CACHE_CONTROL};
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const REVALIDATE: &str = "no-cache, no-store, must-revalidate";
const IMMUTABLE: &str = "max-age=31536000";
const APP_JS: &[u8] = b"angular.module('app', []);\n";

/// Layout of a built single-page app
fn public_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(root.join("index.html"), b"<!doctype html><div ng-app></div>").unwrap();
    std::fs::write(root.join("app.js"), APP_JS).unwrap();
    std::fs::create_dir_all(root.join("assets/images")).unwrap();
    std::fs::write(root.join("assets/images/logo.png"), b"\x89PNG\r\n").unwrap();
    std::fs::write(root.join("assets/private-notes.txt"), b"do not list").unwrap();
    dir
}

fn handler(dir: &TempDir) -> FileHandler {
    FileHandler::new(dir.path()).with_logger(Logger::discard())
}

fn get(path: &str, accept: Option<&str>) -> Request<()> {
    let mut builder = Request::builder().uri(path);
    if let Some(accept) = accept {
        builder = builder.header(ACCEPT, accept);
    }
    builder.body(()).unwrap()
}

async fn body_string(resp: Response<Full<Bytes>>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn test_asset_with_wildcard_accept_is_cached_for_a_year() {
    let dir = public_dir();
    let resp = handler(&dir).serve(&get("/app.js", Some("*/*"))).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[CACHE_CONTROL], IMMUTABLE);
    assert_eq!(body_string(resp).await.as_bytes(), APP_JS);
}

#[tokio::test]
async fn test_html_navigation_must_revalidate() {
    let dir = public_dir();
    let req = get(
        "/index.html",
        Some("text/html,application/xhtml+xml,*/*;q=0.8"),
    );
    let resp = handler(&dir).serve(&req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[CACHE_CONTROL], REVALIDATE);
}

#[tokio::test]
async fn test_directory_listing_is_never_disclosed() {
    let dir = public_dir();
    let files = handler(&dir);

    let resp = files.serve(&get("/assets/", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_string(resp).await;
    assert!(!body.contains("private-notes.txt"));
    assert!(!body.contains("images"));

    let resp = files.serve(&get("/assets/images/", Some("text/html"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers()[CACHE_CONTROL], REVALIDATE);
}

#[tokio::test]
async fn test_missing_file_without_accept() {
    let dir = public_dir();
    let resp = handler(&dir).serve(&get("/missing.png", None)).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers()[CACHE_CONTROL], IMMUTABLE);
}

#[tokio::test]
async fn test_nested_file_served_through_guard() {
    let dir = public_dir();
    let resp = handler(&dir)
        .serve(&get("/assets/images/logo.png", Some("image/avif,image/webp,*/*")))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "image/png");
    assert_eq!(resp.headers()[CACHE_CONTROL], IMMUTABLE);
    assert_eq!(body_string(resp).await.as_bytes(), b"\x89PNG\r\n");
}

#[tokio::test]
async fn test_served_over_tcp() {
    let dir = public_dir();
    let scratch = tempfile::tempdir().unwrap();
    let mut config = Config::load_from(scratch.path().join("none").to_str().unwrap()).unwrap();
    config.assets.root = dir.path().to_string_lossy().into_owned();
    config.logging.access_log = false;

    let listener = server::create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::new(&config));
    tokio::spawn(server::run(listener, state));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(
            b"GET / HTTP/1.1\r\nHost: localhost\r\nAccept: text/html\r\nConnection: close\r\n\r\n",
        )
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"), "{raw}");
    assert!(raw.to_ascii_lowercase().contains(&format!("cache-control: {REVALIDATE}")));
    assert!(raw.ends_with("<!doctype html><div ng-app></div>"));
}

#[tokio::test]
async fn test_percent_encoded_names() {
    let dir = public_dir();
    std::fs::write(dir.path().join("my file.js"), b"spaced();").unwrap();
    std::fs::write(dir.path().join("café.css"), b"body{}").unwrap();
    let files = handler(&dir);

    let resp = files.serve(&get("/my%20file.js", Some("*/*"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[CACHE_CONTROL], IMMUTABLE);
    assert_eq!(body_string(resp).await, "spaced();");

    let resp = files.serve(&get("/caf%C3%A9.css", Some("text/css,*/*;q=0.1"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "body{}");
}
