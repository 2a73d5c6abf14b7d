use std::{io::Cursor, sync::Arc};

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use image::{ImageFormat, ImageReader};
use mime::Mime;
use serde_json::{json, Value};
use tokio::fs;
use uuid::Uuid;

use crate::{
    config::Config,
    db::{images, DbPool},
    error::{AppError, AppResult},
    extract::{AppJson, AppPath, AppQuery},
    models::{
        image::{Image, NewImage, PageQuery, UpdateImageSchema},
        user::Claims,
    },
};

/// Formats accepted for upload, with the extension and MIME type they are stored under.
fn accepted(format: ImageFormat) -> Option<(&'static str, &'static str)> {
    match format {
        ImageFormat::Jpeg => Some(("jpg", "image/jpeg")),
        ImageFormat::Png => Some(("png", "image/png")),
        ImageFormat::WebP => Some(("webp", "image/webp")),
        ImageFormat::Gif => Some(("gif", "image/gif")),
        _ => None,
    }
}

fn declared_type_allowed(content_type: Option<&str>) -> bool {
    let Some(ct) = content_type.and_then(|ct| ct.parse::<Mime>().ok()) else {
        return true;
    };
    matches!(
        (ct.type_().as_str(), ct.subtype().as_str()),
        ("image", "jpeg") | ("image", "png") | ("image", "webp") | ("image", "gif")
    )
}

fn dimensions(data: &[u8]) -> Option<(i64, i64)> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
        .map(|(w, h)| (i64::from(w), i64::from(h)))
}

async fn text_field(field: Field<'_>) -> AppResult<Option<String>> {
    let name = field.name().unwrap_or("").to_string();
    let value = field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Could not read field '{name}': {e}")))?;
    let value = value.trim().to_string();
    Ok((!value.is_empty()).then_some(value))
}

// POST /api/cms/images (multipart: image, altText?, caption?)
pub async fn upload_image_handler(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Image>)> {
    let mut file: Option<(String, Option<String>, axum::body::Bytes)> = None;
    let mut alt_text = None;
    let mut caption = None;

    // 1. Collect the fields we know about
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read the file: {e}")))?;
                file = Some((file_name, content_type, data));
            }
            "altText" => alt_text = text_field(field).await?,
            "caption" => caption = text_field(field).await?,
            _ => {
                return Err(AppError::Validation(format!("Unexpected multipart field '{name}'")));
            }
        }
    }

    let (original_name, content_type, data) =
        file.ok_or_else(|| AppError::MissingFields(vec!["image"]))?;

    // 2. Size and type checks
    if data.len() > config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Image exceeds the {} byte limit",
            config.max_upload_bytes
        )));
    }
    let sniffed = image::guess_format(&data).ok().and_then(accepted);
    let (extension, mime_type) = match sniffed {
        Some(found) if declared_type_allowed(content_type.as_deref()) => found,
        _ => {
            return Err(AppError::Validation(
                "Only images are allowed (jpg, png, webp, gif)".to_string(),
            ))
        }
    };
    let (width, height) = dimensions(&data).unzip();

    // 3. Store under a unique name
    fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Could not create upload dir: {e}")))?;
    let filename = format!("{}.{}", Uuid::new_v4(), extension);
    let filepath = config.upload_dir.join(&filename);
    fs::write(&filepath, &data)
        .await
        .map_err(|e| AppError::Internal(format!("Could not save image {}: {e}", filepath.display())))?;

    // 4. Record the metadata; no row means the file must not stay behind
    let created = images::create(
        &pool,
        NewImage {
            url: format!("/uploads/{filename}"),
            filename,
            alt_text,
            caption,
            size: data.len() as i64,
            mime_type: mime_type.to_string(),
            width,
            height,
        },
    )
    .await;
    let image = match created {
        Ok(image) => image,
        Err(e) => {
            if let Err(io) = fs::remove_file(&filepath).await {
                tracing::warn!("Could not remove {}: {:?}", filepath.display(), io);
            }
            return Err(e);
        }
    };

    tracing::info!(user = %claims.sub, original = %original_name, url = %image.url, "image uploaded");
    Ok((StatusCode::CREATED, Json(image)))
}

// GET /api/cms/images
pub async fn list_images_handler(
    State(pool): State<DbPool>,
    AppQuery(page): AppQuery<PageQuery>,
) -> AppResult<Json<Vec<Image>>> {
    Ok(Json(images::list(&pool, page.limit, page.offset).await?))
}

// GET /api/cms/images/:id
pub async fn get_image_handler(
    State(pool): State<DbPool>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Image>> {
    Ok(Json(images::get_by_id(&pool, id).await?))
}

// PATCH /api/cms/images/:id
pub async fn update_image_handler(
    State(pool): State<DbPool>,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<UpdateImageSchema>,
) -> AppResult<Json<Image>> {
    Ok(Json(images::update_meta(&pool, id, body).await?))
}

// DELETE /api/cms/images/:id (admins only)
pub async fn delete_image_handler(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    let image = images::delete(&pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image {id} not found")))?;

    // The row is gone either way; a missing file only deserves a warning
    if let Err(e) = fs::remove_file(config.upload_dir.join(&image.filename)).await {
        tracing::warn!("Could not remove {}: {:?}", image.filename, e);
    }

    Ok(Json(json!({ "deleted": true, "id": id })))
}
