#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use site_backend::{
    config::Config,
    db::{self, DbPool},
    models::{
        blog_post::{BlogPost, CreatePostSchema, PostStatus},
        user::User,
    },
    routes,
    state::AppState,
    utils::jwt::issue_token,
};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub uploads: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(mut config: Config) -> Self {
        let uploads = TempDir::new().expect("temp upload dir");
        config.upload_dir = uploads.path().to_path_buf();

        let pool = db::connect_in_memory().await.expect("in-memory database");
        let state = AppState::new(pool, config);
        let router = routes::create_routes(state.clone());

        TestApp { state, router, uploads }
    }

    pub fn pool(&self) -> &DbPool {
        &self.state.pool
    }

    /// A signed token for a user that only exists inside the token.
    pub fn token(&self, role: &str) -> String {
        let user = User {
            id: 1,
            username: role.to_string(),
            email: format!("{role}@example.com"),
            password_hash: String::new(),
            role: role.to_string(),
        };
        let (token, _) = issue_token(&self.state.config.jwt_secret, &user, 1).expect("token");
        token
    }

    pub fn admin_token(&self) -> String {
        self.token("admin")
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    pub async fn patch_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::PATCH, uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, token, None)).await
    }

    /// Inserts a post straight through the store.
    pub async fn seed_post(&self, slug: &str, status: PostStatus, content: &str) -> BlogPost {
        let schema = CreatePostSchema {
            title: Some(format!("Post {slug}")),
            slug: Some(slug.to_string()),
            content: Some(content.to_string()),
            category: Some("automation".to_string()),
            status: Some(status),
            ..Default::default()
        };
        db::posts::create(self.pool(), schema.validate().expect("valid post"), "Test Author")
            .await
            .expect("seeded post")
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}
