use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::user::{Claims, User},
    state::AppState,
};

/// Signs a token for `user` that expires after `ttl_hours`.
pub fn issue_token(secret: &str, user: &User, ttl_hours: i64) -> Result<(String, Claims), AppError> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or_else(|| AppError::Internal("Token expiry overflow".to_string()))?;

    let claims = Claims {
        sub: user.email.clone(),
        exp: expiration.timestamp() as usize,
        iat: now.timestamp() as usize,
        jti: Uuid::new_v4().simple().to_string(),
        user_id: user.id,
        role: user.role.clone(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))?;

    Ok((token, claims))
}

/// Checks signature and expiry.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
}

/// Tokens cleared by logout, kept until they would have expired anyway.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    revoked: RwLock<HashMap<String, usize>>,
}

impl TokenRegistry {
    pub fn revoke(&self, claims: &Claims) {
        let now = Utc::now().timestamp() as usize;
        let mut revoked = self.revoked.write();
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti.clone(), claims.exp);
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.read().contains_key(jti)
    }
}

fn authenticate(
    state: &AppState,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Claims, AppError> {
    let TypedHeader(auth) =
        auth.ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = decode_token(&state.config.jwt_secret, auth.token())?;
    if state.tokens.is_revoked(&claims.jti) {
        return Err(AppError::Unauthorized("Token has been revoked".to_string()));
    }
    Ok(claims)
}

// Runs before every CMS route: any signed-in user (editor or admin)
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authenticate(&state, auth)?;
    // Handlers read the caller from the extensions
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

// Destructive routes: admins only
pub async fn admin_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authenticate(&state, auth)?;
    if !claims.is_admin() {
        return Err(AppError::Forbidden("Admin role required".to_string()));
    }
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
