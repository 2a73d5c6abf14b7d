use chrono::Utc;

use crate::{
    db::{posts::clamp_limit, DbPool},
    error::{AppError, AppResult},
    models::image::{Image, NewImage, UpdateImageSchema},
};

const IMAGE_COLUMNS: &str =
    "id, filename, url, alt_text, caption, size, mime_type, width, height, created_at";

pub async fn create(pool: &DbPool, image: NewImage) -> AppResult<Image> {
    let sql = format!(
        r#"
        INSERT INTO images (filename, url, alt_text, caption, size, mime_type, width, height, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        RETURNING {IMAGE_COLUMNS}
        "#
    );

    let created = sqlx::query_as::<_, Image>(&sql)
        .bind(&image.filename)
        .bind(&image.url)
        .bind(&image.alt_text)
        .bind(&image.caption)
        .bind(image.size)
        .bind(&image.mime_type)
        .bind(image.width)
        .bind(image.height)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;
    Ok(created)
}

/// Newest uploads first.
pub async fn list(pool: &DbPool, limit: Option<i64>, offset: Option<i64>) -> AppResult<Vec<Image>> {
    let sql = format!(
        "SELECT {IMAGE_COLUMNS} FROM images ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
    );
    let images = sqlx::query_as::<_, Image>(&sql)
        .bind(clamp_limit(limit))
        .bind(offset.unwrap_or(0).max(0))
        .fetch_all(pool)
        .await?;
    Ok(images)
}

pub async fn get_by_id(pool: &DbPool, id: i64) -> AppResult<Image> {
    let sql = format!("SELECT {IMAGE_COLUMNS} FROM images WHERE id = ?1");
    sqlx::query_as::<_, Image>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image {id} not found")))
}

// COALESCE keeps the stored value for fields that were not sent
pub async fn update_meta(pool: &DbPool, id: i64, changes: UpdateImageSchema) -> AppResult<Image> {
    let sql = format!(
        r#"
        UPDATE images SET
            alt_text = COALESCE(?1, alt_text),
            caption = COALESCE(?2, caption)
        WHERE id = ?3
        RETURNING {IMAGE_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Image>(&sql)
        .bind(changes.alt_text)
        .bind(changes.caption)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image {id} not found")))
}

/// Removes the row and hands it back so the caller can delete the file.
pub async fn delete(pool: &DbPool, id: i64) -> AppResult<Option<Image>> {
    let sql = format!("DELETE FROM images WHERE id = ?1 RETURNING {IMAGE_COLUMNS}");
    let removed = sqlx::query_as::<_, Image>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(removed)
}
