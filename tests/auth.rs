mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use site_backend::{db::users, models::blog_post::PostStatus};

#[tokio::test]
async fn cms_routes_require_a_token() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/admin/blog-posts", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app.get("/api/cms/posts", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/cms/posts", Some(&app.token("editor"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn editors_cannot_delete() {
    let app = TestApp::new().await;
    let post = app.seed_post("keep-me", PostStatus::Published, "<p>x</p>").await;

    let (status, _) = app
        .delete(&format!("/api/cms/posts/{}", post.id), Some(&app.token("editor")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/blog-posts/keep-me", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .delete(&format!("/api/cms/posts/{}", post.id), Some(&app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_then_logout_clears_the_token() {
    let app = TestApp::new().await;
    assert!(users::ensure_admin(app.pool(), "owner@example.com", "hunter22").await.unwrap());
    // Only the first account is bootstrapped
    assert!(!users::ensure_admin(app.pool(), "other@example.com", "pw").await.unwrap());

    let (status, _) = app
        .post_json(
            "/api/auth/login",
            None,
            json!({ "email": "owner@example.com", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post_json(
            "/api/auth/login",
            None,
            json!({ "email": "owner@example.com", "password": "hunter22" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenType"], "Bearer");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = app.get("/api/admin/analytics", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.post_json("/api/auth/logout", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/admin/analytics", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token has been revoked");
}

#[tokio::test]
async fn admins_create_editor_accounts() {
    let app = TestApp::new().await;
    let payload = json!({ "username": "ed", "email": "ed@example.com", "password": "pw12345" });

    let (status, _) = app
        .post_json("/api/admin/users", Some(&app.token("editor")), payload.clone())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post_json("/api/admin/users", Some(&app.admin_token()), payload.clone())
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "editor");
    assert!(body.get("password_hash").is_none());

    let (status, _) = app
        .post_json("/api/admin/users", Some(&app.admin_token()), payload)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
