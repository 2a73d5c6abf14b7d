use axum::{extract::State, Json};

use crate::{
    db::{posts, DbPool},
    error::AppResult,
    models::blog_post::TermCount,
};

// GET /api/blog-posts/categories
pub async fn list_categories_handler(State(pool): State<DbPool>) -> AppResult<Json<Vec<TermCount>>> {
    Ok(Json(posts::categories(&pool).await?))
}

// GET /api/blog-posts/tags
pub async fn list_tags_handler(State(pool): State<DbPool>) -> AppResult<Json<Vec<TermCount>>> {
    Ok(Json(posts::tags(&pool).await?))
}
