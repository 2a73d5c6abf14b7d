use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: i64,
    pub filename: String,
    pub url: String,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub size: i64,
    pub mime_type: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Metadata of a file that was already written to the upload directory.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub filename: String,
    pub url: String,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub size: i64,
    pub mime_type: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateImageSchema {
    pub alt_text: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
