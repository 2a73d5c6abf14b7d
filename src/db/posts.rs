//! Queries over the `blog_posts` table.
//!
//! Counters (`views`, `leads`, `shares`) are only touched by [`increment`];
//! [`update`] never writes them.

use chrono::Utc;
use sqlx::types::Json;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::blog_post::{
        patch_text, BlogPost, NewPost, PostFilter, PostStats, PostStatus, TermCount,
        UpdatePostSchema,
    },
    utils::text::{normalize_list, reading_time, search_text},
};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

const POST_COLUMNS: &str = "id, title, slug, excerpt, content, category, tags, target_keywords, \
    status, published_at, created_at, updated_at, meta_title, meta_description, canonical_url, \
    views, leads, shares, featured_image, author, cta_type, reading_time";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Views,
    Leads,
    Shares,
}

impl Counter {
    fn column(self) -> &'static str {
        match self {
            Counter::Views => "views",
            Counter::Leads => "leads",
            Counter::Shares => "shares",
        }
    }
}

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Posts matching `filter`, newest first.
///
/// A search term restricts the result to published posts whatever `status`
/// says, and composes with the category and tag filters. It is matched
/// against `search_text`, a lowercased copy of title, excerpt and content,
/// so case folding follows Unicode rules rather than SQLite's ASCII `lower()`.
pub async fn list(pool: &DbPool, filter: &PostFilter) -> AppResult<Vec<BlogPost>> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let status = if search.is_some() {
        Some(PostStatus::Published)
    } else {
        filter.status
    };

    let sql = format!(
        r#"
        SELECT {POST_COLUMNS}
        FROM blog_posts
        WHERE
            (?1 IS NULL OR category = ?1)
            AND
            (?2 IS NULL OR EXISTS (SELECT 1 FROM json_each(blog_posts.tags) WHERE json_each.value = ?2))
            AND
            (?3 IS NULL OR status = ?3)
            AND
            (?4 IS NULL OR instr(search_text, ?4) > 0)
        ORDER BY created_at DESC, id DESC
        LIMIT ?5 OFFSET ?6
        "#
    );

    let posts = sqlx::query_as::<_, BlogPost>(&sql)
        .bind(filter.category.as_deref())
        .bind(filter.tag.as_deref())
        .bind(status)
        .bind(search.as_deref())
        .bind(clamp_limit(filter.limit))
        .bind(filter.offset.unwrap_or(0).max(0))
        .fetch_all(pool)
        .await?;

    Ok(posts)
}

/// Public lookup: drafts and other unpublished posts are reported as missing.
pub async fn get_by_slug(pool: &DbPool, slug: &str) -> AppResult<BlogPost> {
    let sql = format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE slug = ?1 AND status = ?2");
    sqlx::query_as::<_, BlogPost>(&sql)
        .bind(slug)
        .bind(PostStatus::Published)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post '{slug}' not found")))
}

pub async fn get_by_id(pool: &DbPool, id: i64) -> AppResult<BlogPost> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))
}

async fn find_by_id(pool: &DbPool, id: i64) -> AppResult<Option<BlogPost>> {
    let sql = format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE id = ?1");
    let post = sqlx::query_as::<_, BlogPost>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(post)
}

pub async fn slug_exists(pool: &DbPool, slug: &str) -> AppResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM blog_posts WHERE slug = ?1")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// Inserts a validated post. Counters start at zero; a taken slug is a `Conflict`.
pub async fn create(pool: &DbPool, post: NewPost, default_author: &str) -> AppResult<BlogPost> {
    let now = Utc::now();
    let published_at = match (post.status, post.published_at) {
        (PostStatus::Published, None) => Some(now),
        (_, at) => at,
    };
    let minutes = reading_time(&post.content);
    let author = post.author.unwrap_or_else(|| default_author.to_string());

    let sql = format!(
        r#"
        INSERT INTO blog_posts (
            title, slug, excerpt, content, category, tags, target_keywords,
            status, published_at, created_at, updated_at,
            meta_title, meta_description, canonical_url,
            featured_image, author, cta_type, reading_time, search_text
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
        RETURNING {POST_COLUMNS}
        "#
    );

    sqlx::query_as::<_, BlogPost>(&sql)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(&post.category)
        .bind(Json(&post.tags))
        .bind(Json(&post.target_keywords))
        .bind(post.status)
        .bind(published_at)
        .bind(now)
        .bind(&post.meta_title)
        .bind(&post.meta_description)
        .bind(&post.canonical_url)
        .bind(&post.featured_image)
        .bind(&author)
        .bind(post.cta_type)
        .bind(minutes)
        .bind(search_text(&post.title, post.excerpt.as_deref(), &post.content))
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::from_unique(e, format!("A post with slug '{}' already exists", post.slug)))
}

/// Applies the fields present in `changes`; absent fields keep their stored value.
pub async fn update(pool: &DbPool, id: i64, changes: UpdatePostSchema) -> AppResult<BlogPost> {
    changes.validate()?;
    let current = get_by_id(pool, id).await?;

    if let Some(slug) = &changes.slug {
        // Once live, the URL stays even if the post is taken down again
        let ever_published = current.is_published() || current.published_at.is_some();
        if ever_published && *slug != current.slug {
            return Err(AppError::Validation(format!(
                "Slug '{}' is published and cannot change",
                current.slug
            )));
        }
    }

    let status = changes.status.unwrap_or(current.status);
    let published_at = match (status, changes.published_at.or(current.published_at)) {
        (PostStatus::Published, None) => Some(Utc::now()),
        (_, at) => at,
    };
    let title = changes.title.map(|t| t.trim().to_string()).unwrap_or(current.title);
    let excerpt = patch_text(changes.excerpt, current.excerpt);
    let content = changes.content.unwrap_or(current.content);
    let slug = changes.slug.unwrap_or(current.slug);

    let sql = format!(
        r#"
        UPDATE blog_posts SET
            title = ?1,
            slug = ?2,
            excerpt = ?3,
            content = ?4,
            category = ?5,
            tags = ?6,
            target_keywords = ?7,
            status = ?8,
            published_at = ?9,
            meta_title = ?10,
            meta_description = ?11,
            canonical_url = ?12,
            featured_image = ?13,
            author = ?14,
            cta_type = ?15,
            reading_time = ?16,
            updated_at = ?17,
            search_text = ?18
        WHERE id = ?19
        RETURNING {POST_COLUMNS}
        "#
    );

    let tags = changes.tags.map(normalize_list).unwrap_or(current.tags);
    let keywords = changes
        .target_keywords
        .map(normalize_list)
        .unwrap_or(current.target_keywords);

    sqlx::query_as::<_, BlogPost>(&sql)
        .bind(&title)
        .bind(&slug)
        .bind(&excerpt)
        .bind(&content)
        .bind(changes.category.map(|c| c.trim().to_string()).unwrap_or(current.category))
        .bind(Json(&tags))
        .bind(Json(&keywords))
        .bind(status)
        .bind(published_at)
        .bind(patch_text(changes.meta_title, current.meta_title))
        .bind(patch_text(changes.meta_description, current.meta_description))
        .bind(patch_text(changes.canonical_url, current.canonical_url))
        .bind(patch_text(changes.featured_image, current.featured_image))
        .bind(changes.author.map(|a| a.trim().to_string()).unwrap_or(current.author))
        .bind(changes.cta_type.unwrap_or(current.cta_type))
        .bind(reading_time(&content))
        .bind(Utc::now())
        .bind(search_text(&title, excerpt.as_deref(), &content))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::from_unique(e, format!("A post with slug '{slug}' already exists")))?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))
}

/// `true` when a row was removed.
pub async fn delete(pool: &DbPool, id: i64) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Bumps one counter in a single statement and returns its new value.
pub async fn increment(pool: &DbPool, id: i64, counter: Counter) -> AppResult<i64> {
    let column = counter.column();
    let sql = format!("UPDATE blog_posts SET {column} = {column} + 1 WHERE id = ?1 RETURNING {column}");

    sqlx::query_scalar::<_, i64>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))
}

pub async fn increment_views(pool: &DbPool, id: i64) -> AppResult<i64> {
    increment(pool, id, Counter::Views).await
}

pub async fn increment_leads(pool: &DbPool, id: i64) -> AppResult<i64> {
    increment(pool, id, Counter::Leads).await
}

pub async fn increment_shares(pool: &DbPool, id: i64) -> AppResult<i64> {
    increment(pool, id, Counter::Shares).await
}

/// Published posts, most viewed first.
pub async fn popular(pool: &DbPool, limit: Option<i64>) -> AppResult<Vec<BlogPost>> {
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM blog_posts WHERE status = ?1 \
         ORDER BY views DESC, created_at DESC, id DESC LIMIT ?2"
    );
    let posts = sqlx::query_as::<_, BlogPost>(&sql)
        .bind(PostStatus::Published)
        .bind(clamp_limit(limit))
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

/// Published posts, newest first.
pub async fn recent(pool: &DbPool, limit: Option<i64>) -> AppResult<Vec<BlogPost>> {
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM blog_posts WHERE status = ?1 \
         ORDER BY created_at DESC, id DESC LIMIT ?2"
    );
    let posts = sqlx::query_as::<_, BlogPost>(&sql)
        .bind(PostStatus::Published)
        .bind(clamp_limit(limit))
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

/// Every published post, oldest first. Used by the page renderer.
pub async fn all_published(pool: &DbPool) -> AppResult<Vec<BlogPost>> {
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM blog_posts WHERE status = ?1 ORDER BY created_at ASC, id ASC"
    );
    let posts = sqlx::query_as::<_, BlogPost>(&sql)
        .bind(PostStatus::Published)
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

pub async fn categories(pool: &DbPool) -> AppResult<Vec<TermCount>> {
    let terms = sqlx::query_as::<_, TermCount>(
        r#"
        SELECT category AS name, COUNT(*) AS count
        FROM blog_posts
        WHERE status = ?1
        GROUP BY category
        ORDER BY count DESC, name ASC
        "#,
    )
    .bind(PostStatus::Published)
    .fetch_all(pool)
    .await?;
    Ok(terms)
}

pub async fn tags(pool: &DbPool) -> AppResult<Vec<TermCount>> {
    let terms = sqlx::query_as::<_, TermCount>(
        r#"
        SELECT CAST(t.value AS TEXT) AS name, COUNT(*) AS count
        FROM blog_posts AS p, json_each(p.tags) AS t
        WHERE p.status = ?1
        GROUP BY t.value
        ORDER BY count DESC, name ASC
        "#,
    )
    .bind(PostStatus::Published)
    .fetch_all(pool)
    .await?;
    Ok(terms)
}

pub async fn stats(pool: &DbPool) -> AppResult<PostStats> {
    let stats = sqlx::query_as::<_, PostStats>(
        r#"
        SELECT
            COUNT(*) AS total_posts,
            COALESCE(SUM(CASE WHEN status = 'published' THEN 1 ELSE 0 END), 0) AS published,
            COALESCE(SUM(CASE WHEN status = 'draft' THEN 1 ELSE 0 END), 0) AS drafts,
            COALESCE(SUM(CASE WHEN status = 'scheduled' THEN 1 ELSE 0 END), 0) AS scheduled,
            COALESCE(SUM(CASE WHEN status = 'archived' THEN 1 ELSE 0 END), 0) AS archived,
            COALESCE(SUM(views), 0) AS total_views,
            COALESCE(SUM(leads), 0) AS total_leads,
            COALESCE(SUM(shares), 0) AS total_shares
        FROM blog_posts
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(stats)
}
