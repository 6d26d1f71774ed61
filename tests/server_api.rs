mod common;

use common::*;
use fasttea::config::{AppKind, Config};
use fasttea::server::{AppServer, ServerError};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

async fn create_session(client: &Client, base: &str) -> (String, Value) {
    let resp = client
        .post(format!("{}/sessions", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = resp.json().await.unwrap();
    let id = body["session_id"].as_str().unwrap().to_string();
    (id, body)
}

#[tokio::test]
async fn test_health_reports_app_and_sessions() {
    let (addr, handle) = start_server(AppKind::Clock, 4).await;
    let client = Client::new();

    let body: Value = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "fasttea");
    assert_eq!(body["app"], "clock");
    assert_eq!(body["sessions"], 0);

    handle.shutdown();
}

#[tokio::test]
async fn test_hello_session_round_trip() {
    let (addr, handle) = start_server(AppKind::Hello, 4).await;
    let base = format!("http://{}", addr);
    let client = Client::new();

    let (id, created) = create_session(&client, &base).await;
    assert_eq!(created["revision"], 0);
    assert_eq!(created["view"]["kind"], "element");

    let output: Value = client
        .post(format!("{}/sessions/{}/messages", base, id))
        .json(&json!({"action": "greet", "value": "Ada"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(output["revision"], 1);
    assert!(output["view"].to_string().contains("Hello Ada!"));

    let current: Value = client
        .get(format!("{}/sessions/{}", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current, output);

    let resp = client
        .delete(format!("{}/sessions/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let resp = client
        .get(format!("{}/sessions/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "session_not_found");

    handle.shutdown();
}

#[tokio::test]
async fn test_error_statuses() {
    let (addr, handle) = start_server(AppKind::Hello, 4).await;
    let base = format!("http://{}", addr);
    let client = Client::new();
    let (id, _) = create_session(&client, &base).await;
    let messages = format!("{}/sessions/{}/messages", base, id);

    // Missing action tag.
    let resp = client.post(&messages).json(&json!({"value": 1})).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "malformed_message");

    // Not JSON at all.
    let resp = client
        .post(&messages)
        .header("content-type", "application/json")
        .body("{")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    // Reducer fault: greet requires a value.
    let resp = client.post(&messages).json(&json!({"action": "greet"})).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "transition_failed");

    // Failures leave the session untouched.
    let current: Value = client
        .get(format!("{}/sessions/{}", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current["revision"], 0);

    handle.shutdown();
}

#[tokio::test]
async fn test_session_limit() {
    let (addr, handle) = start_server(AppKind::Hello, 1).await;
    let base = format!("http://{}", addr);
    let client = Client::new();
    create_session(&client, &base).await;

    let resp = client
        .post(format!("{}/sessions", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 503);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "session_limit");

    handle.shutdown();
}

#[tokio::test]
async fn test_event_stream_starts_with_current_view() {
    let (addr, handle) = start_server(AppKind::Cube, 4).await;
    let base = format!("http://{}", addr);
    let client = Client::new();
    let (id, _) = create_session(&client, &base).await;

    let mut resp = client
        .get(format!("{}/sessions/{}/events", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let first = tokio::time::timeout(Duration::from_secs(2), resp.chunk())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let text = String::from_utf8_lossy(&first);
    assert!(text.contains("event: rendered"), "got {text}");
    assert!(text.contains("#ff0000"));

    client
        .post(format!("{}/sessions/{}/messages", base, id))
        .json(&json!({"action": "changeColor", "value": "#00ff00"}))
        .send()
        .await
        .unwrap();

    let mut seen = String::new();
    while !seen.contains("event: command") {
        let chunk = tokio::time::timeout(Duration::from_secs(2), resp.chunk())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        seen.push_str(&String::from_utf8_lossy(&chunk));
    }
    assert!(seen.contains("setColor"));

    handle.shutdown();
}

#[tokio::test]
async fn test_busy_port_fails_unless_search_is_enabled() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let busy = taken.local_addr().unwrap();

    let mut config = Config::default();
    let mut server = AppServer::new(&config);
    let err = server.try_bind(&busy.to_string()).await.unwrap_err();
    assert!(matches!(err, ServerError::NoAvailablePort { .. }), "got {err:?}");

    config.server.port_search = 20;
    let mut server = AppServer::new(&config);
    let bound = server.try_bind(&busy.to_string()).await.unwrap();
    assert_ne!(bound.port(), busy.port());
    assert!(bound.port() > busy.port());
}
