mod common;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use common::TestApp;
use parking_lot::Mutex;
use serde_json::{json, Value};
use site_backend::config::Config;
use tokio::net::TcpListener;

type Received = Arc<Mutex<Vec<Value>>>;

/// Starts a webhook on an ephemeral port that records every payload and answers `reply`.
async fn spawn_webhook(reply: StatusCode) -> (String, Received) {
    let received = Received::default();
    let app = Router::new()
        .route(
            "/hook",
            post(move |State(seen): State<Received>, Json(payload): Json<Value>| async move {
                seen.lock().push(payload);
                reply
            }),
        )
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/hook"), received)
}

async fn app_with_webhook(url: String) -> TestApp {
    let config = Config {
        contact_webhook_url: Some(url),
        ..Default::default()
    };
    TestApp::with_config(config).await
}

fn contact() -> Value {
    json!({ "name": "Ana", "email": "ana@example.com", "message": "Hi", "company": "Acme" })
}

#[tokio::test]
async fn health_and_public_config() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.get("/api/site-config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["siteName"], "Northwind Automation");
    assert_eq!(body["contactFormEnabled"], false);
}

#[tokio::test]
async fn contact_form_without_webhook_is_a_generic_500() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json(
            "/api/contact-form",
            None,
            json!({ "name": "Ana", "email": "ana@example.com", "message": "Hi" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains("CONTACT_WEBHOOK_URL"));
}

#[tokio::test]
async fn contact_form_validates_before_forwarding() {
    let config = Config {
        // Nothing listens here; validation must fail first
        contact_webhook_url: Some("http://127.0.0.1:9/hook".to_string()),
        ..Default::default()
    };
    let app = TestApp::with_config(config).await;

    let (status, body) = app
        .post_json(
            "/api/contact-form",
            None,
            json!({ "name": "", "email": "ana@example.com", "message": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"], json!(["name", "message"]));

    let (status, _) = app
        .post_json(
            "/api/contact-form",
            None,
            json!({ "name": "Ana", "email": "not-an-email", "message": "Hi" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_json(
            "/api/contact-form",
            None,
            json!({ "name": "Ana", "email": "ana@example.com", "message": "Hi" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn contact_form_is_forwarded_to_the_webhook() {
    let (url, received) = spawn_webhook(StatusCode::OK).await;
    let app = app_with_webhook(url).await;

    let (_, config) = app.get("/api/site-config", None).await;
    assert_eq!(config["contactFormEnabled"], true);

    let (status, body) = app.post_json("/api/contact-form", None, contact()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let received = received.lock();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["form"]["email"], "ana@example.com");
    assert_eq!(received[0]["form"]["company"], "Acme");
    assert!(received[0]["submittedAt"].is_string());
}

#[tokio::test]
async fn webhook_error_status_is_a_generic_500() {
    let (url, received) = spawn_webhook(StatusCode::INTERNAL_SERVER_ERROR).await;
    let app = app_with_webhook(url).await;

    let (status, body) = app.post_json("/api/contact-form", None, contact()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().contains("500"));
    assert_eq!(received.lock().len(), 1);
}
