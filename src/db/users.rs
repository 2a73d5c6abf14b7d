use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::user::{User, ROLE_ADMIN},
    utils::security::hash_password,
};

pub async fn count(pool: &DbPool) -> AppResult<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn find_by_email(pool: &DbPool, email: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, role FROM users WHERE email = ?1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Hashes `password` and stores the account. Duplicate username or email is a `Conflict`.
pub async fn create(
    pool: &DbPool,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> AppResult<User> {
    let password_hash = hash_password(password).map_err(AppError::Internal)?;

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash, role)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, username, email, password_hash, role
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_unique(e, "Username or email already exists"))
}

/// Creates the first admin when the table is empty. Returns whether one was created.
pub async fn ensure_admin(pool: &DbPool, email: &str, password: &str) -> AppResult<bool> {
    if count(pool).await? > 0 {
        return Ok(false);
    }

    let username = email.split('@').next().unwrap_or(email);
    create(pool, username, email, password, ROLE_ADMIN).await?;
    Ok(true)
}
