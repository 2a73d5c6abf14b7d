use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::{
    config::Config,
    db::{users, DbPool},
    error::{AppError, AppResult},
    extract::AppJson,
    models::user::{AuthResponse, Claims, LoginPayload, RegisterPayload, User, ROLE_EDITOR},
    utils::{
        jwt::{issue_token, TokenRegistry},
        security::verify_password,
    },
};

// POST /api/auth/login
pub async fn login_handler(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    AppJson(payload): AppJson<LoginPayload>,
) -> AppResult<Json<AuthResponse>> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    // 1. Find the account by email
    let user = users::find_by_email(&pool, payload.email.trim())
        .await?
        .ok_or_else(invalid)?;

    // 2. Check the password (Argon2)
    if !verify_password(&payload.password, &user.password_hash) {
        return Err(invalid());
    }

    // 3. Sign the token
    let (token, claims) = issue_token(&config.jwt_secret, &user, config.token_ttl_hours)?;
    tracing::info!(user = %user.email, "signed in");

    Ok(Json(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_at: claims.exp,
    }))
}

// POST /api/auth/logout - the token stops working immediately
pub async fn logout_handler(
    State(tokens): State<Arc<TokenRegistry>>,
    Extension(claims): Extension<Claims>,
) -> Json<Value> {
    tokens.revoke(&claims);
    tracing::info!(user = %claims.sub, "signed out");
    Json(json!({ "success": true }))
}

// POST /api/admin/users (admins only) - creates an editor account
pub async fn register_handler(
    State(pool): State<DbPool>,
    AppJson(payload): AppJson<RegisterPayload>,
) -> AppResult<(StatusCode, Json<User>)> {
    let mut missing = Vec::new();
    if payload.username.trim().is_empty() {
        missing.push("username");
    }
    if payload.email.trim().is_empty() {
        missing.push("email");
    }
    if payload.password.is_empty() {
        missing.push("password");
    }
    if !missing.is_empty() {
        return Err(AppError::MissingFields(missing));
    }

    let user = users::create(
        &pool,
        payload.username.trim(),
        payload.email.trim(),
        &payload.password,
        ROLE_EDITOR,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}
