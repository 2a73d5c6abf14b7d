use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{config::Config, db::DbPool, error::AppResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSiteConfig {
    pub site_name: String,
    pub site_url: String,
    pub ga_measurement_id: Option<String>,
    pub contact_form_enabled: bool,
}

// GET /api/site-config (public)
pub async fn get_site_config_handler(State(config): State<Arc<Config>>) -> Json<PublicSiteConfig> {
    Json(PublicSiteConfig {
        site_name: config.site.name.clone(),
        site_url: config.site.url.clone(),
        ga_measurement_id: config.site.ga_measurement_id.clone(),
        contact_form_enabled: config.contact_webhook_url.is_some(),
    })
}

// GET /api/health - also pings the database
pub async fn health_handler(State(pool): State<DbPool>) -> AppResult<Json<Value>> {
    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now(),
    })))
}
