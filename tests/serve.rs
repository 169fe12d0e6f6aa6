use std::net::SocketAddr;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tokio::net::TcpListener;

use reelserve::config::ServeConfig;
use reelserve::server;

async fn spawn_server(config: ServeConfig) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = server::router(&config);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

#[tokio::test]
async fn test_upload_then_stream() {
    let dir = tempfile::tempdir().unwrap();
    let media_root = dir.path().join("videos");
    let (addr, server) = spawn_server(ServeConfig::with_media_root(&media_root)).await;
    let client = reqwest::Client::new();

    let content: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let form = Form::new().part("video", Part::bytes(content.clone()).file_name("intro.mp4"));
    let response = client
        .post(format!("http://{addr}/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::OK, response.status());
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!("intro.mp4", json["filename"]);
    assert_eq!("Video uploaded successfully", json["message"]);

    let response = client.get(format!("http://{addr}/videos")).send().await.unwrap();
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(serde_json::json!(["intro.mp4"]), json["videos"]);

    // seek into the middle, as a player would
    let response = client
        .get(format!("http://{addr}/video?file=intro.mp4"))
        .header("Range", "bytes=1000-")
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::PARTIAL_CONTENT, response.status());
    assert_eq!("bytes 1000-4095/4096", response.headers()["content-range"]);
    assert_eq!(Some(3096), response.content_length());
    let body = response.bytes().await.unwrap();
    assert_eq!(&content[1000..], &body[..]);

    server.abort();
}

#[tokio::test]
async fn test_upload_rejections() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServeConfig::with_media_root(dir.path());
    config.max_upload_bytes = 1024;
    let (addr, server) = spawn_server(config).await;
    let client = reqwest::Client::new();

    let form = Form::new().part("video", Part::bytes(vec![0u8; 10]).file_name("notes.txt"));
    let response = client.post(format!("http://{addr}/upload")).multipart(form).send().await.unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    let form = Form::new().part("video", Part::bytes(vec![0u8; 4096]).file_name("big.mp4"));
    let response = client.post(format!("http://{addr}/upload")).multipart(form).send().await.unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!("File too large. Maximum size is 1024 bytes", json["error"]);
    assert!(!dir.path().join("big.mp4").exists());

    let form = Form::new()
        .text("title", "holiday")
        .part("video", Part::bytes(vec![7u8; 100]).file_name("holiday.mp4"));
    let response = client.post(format!("http://{addr}/upload")).multipart(form).send().await.unwrap();
    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(vec![7u8; 100], tokio::fs::read(dir.path().join("holiday.mp4")).await.unwrap());

    let response = client.post(format!("http://{addr}/upload")).body("not multipart").send().await.unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!("No video file provided", json["error"]);

    server.abort();
}
