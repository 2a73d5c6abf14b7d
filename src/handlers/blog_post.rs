use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    config::Config,
    db::{posts, DbPool},
    error::{AppError, AppResult},
    extract::{AppJson, AppPath, AppQuery},
    models::{
        blog_post::{BlogPost, CreatePostSchema, LimitQuery, PostFilter, PostStatus, UpdatePostSchema},
        user::Claims,
    },
    utils::text::slugify,
};

// GET /api/blog-posts (?category=...&tag=...&search=...&limit=&offset=)
// The public listing only ever shows published posts.
pub async fn list_posts_handler(
    State(pool): State<DbPool>,
    AppQuery(mut filter): AppQuery<PostFilter>,
) -> AppResult<Json<Vec<BlogPost>>> {
    filter.status = Some(PostStatus::Published);
    let data = posts::list(&pool, &filter).await?;
    Ok(Json(data))
}

// GET /api/blog-posts/popular
pub async fn popular_posts_handler(
    State(pool): State<DbPool>,
    AppQuery(query): AppQuery<LimitQuery>,
) -> AppResult<Json<Vec<BlogPost>>> {
    Ok(Json(posts::popular(&pool, query.limit.or(Some(5))).await?))
}

// GET /api/blog-posts/recent
pub async fn recent_posts_handler(
    State(pool): State<DbPool>,
    AppQuery(query): AppQuery<LimitQuery>,
) -> AppResult<Json<Vec<BlogPost>>> {
    Ok(Json(posts::recent(&pool, query.limit.or(Some(5))).await?))
}

// GET /api/blog-posts/:slug
pub async fn get_post_handler(
    State(pool): State<DbPool>,
    AppPath(slug): AppPath<String>,
) -> AppResult<Json<BlogPost>> {
    Ok(Json(posts::get_by_slug(&pool, &slug).await?))
}

fn counter_body(id: i64, value: i64) -> Json<Value> {
    Json(json!({ "id": id, "value": value }))
}

// POST /api/blog-posts/:id/view
pub async fn increment_views_handler(
    State(pool): State<DbPool>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    Ok(counter_body(id, posts::increment_views(&pool, id).await?))
}

// POST /api/blog-posts/:id/lead
pub async fn increment_leads_handler(
    State(pool): State<DbPool>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    Ok(counter_body(id, posts::increment_leads(&pool, id).await?))
}

// POST /api/blog-posts/:id/share
pub async fn increment_shares_handler(
    State(pool): State<DbPool>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    Ok(counter_body(id, posts::increment_shares(&pool, id).await?))
}

// GET /api/admin/blog-posts - every status, filterable with ?status=
pub async fn admin_list_posts_handler(
    State(pool): State<DbPool>,
    AppQuery(filter): AppQuery<PostFilter>,
) -> AppResult<Json<Vec<BlogPost>>> {
    Ok(Json(posts::list(&pool, &filter).await?))
}

// GET /api/admin/blog-posts/:id
pub async fn admin_get_post_handler(
    State(pool): State<DbPool>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<BlogPost>> {
    Ok(Json(posts::get_by_id(&pool, id).await?))
}

// POST /api/admin/blog-posts - slug is required
pub async fn create_post_handler(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    Extension(claims): Extension<Claims>,
    AppJson(body): AppJson<CreatePostSchema>,
) -> AppResult<(StatusCode, Json<BlogPost>)> {
    let post = posts::create(&pool, body.validate()?, &config.site.author).await?;
    tracing::info!(user = %claims.sub, slug = %post.slug, status = %post.status, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

// POST /api/cms/posts - same as above, but the slug is derived from the title when missing
pub async fn cms_create_post_handler(
    pool: State<DbPool>,
    config: State<Arc<Config>>,
    claims: Extension<Claims>,
    AppJson(mut body): AppJson<CreatePostSchema>,
) -> AppResult<(StatusCode, Json<BlogPost>)> {
    let has_slug = body.slug.as_deref().is_some_and(|s| !s.trim().is_empty());
    if !has_slug {
        if let Some(title) = body.title.as_deref().filter(|t| !t.trim().is_empty()) {
            let mut slug = slugify(title);
            if slug.is_empty() {
                slug = format!("post-{}", Uuid::new_v4().simple());
            }
            body.slug = Some(slug);
        }
    }

    create_post_handler(pool, config, claims, AppJson(body)).await
}

// PATCH /api/admin/blog-posts/:id
pub async fn update_post_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<UpdatePostSchema>,
) -> AppResult<Json<BlogPost>> {
    let post = posts::update(&pool, id, body).await?;
    tracing::info!(user = %claims.sub, id, slug = %post.slug, "post updated");
    Ok(Json(post))
}

// DELETE /api/admin/blog-posts/:id (admins only)
pub async fn delete_post_handler(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    if !posts::delete(&pool, id).await? {
        return Err(AppError::NotFound(format!("Post {id} not found")));
    }

    tracing::info!(user = %claims.sub, id, "post deleted");
    Ok(Json(json!({ "deleted": true, "id": id })))
}

// GET /api/admin/analytics
pub async fn analytics_handler(State(pool): State<DbPool>) -> AppResult<Json<Value>> {
    let stats = posts::stats(&pool).await?;
    let top = posts::popular(&pool, Some(5)).await?;
    Ok(Json(json!({ "stats": stats, "topPosts": top })))
}
