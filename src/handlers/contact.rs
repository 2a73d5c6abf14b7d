use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    extract::AppJson,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
}

impl ContactForm {
    fn validate(&self) -> AppResult<()> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if self.message.trim().is_empty() {
            missing.push("message");
        }
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }
        if !self.email.contains('@') {
            return Err(AppError::Validation("Email address is not valid".to_string()));
        }
        Ok(())
    }
}

// POST /api/contact-form - forwards the submission to the configured webhook
pub async fn contact_form_handler(
    State(config): State<Arc<Config>>,
    State(http): State<reqwest::Client>,
    AppJson(form): AppJson<ContactForm>,
) -> AppResult<Json<Value>> {
    form.validate()?;

    let webhook = config
        .contact_webhook_url
        .as_deref()
        .ok_or_else(|| AppError::Upstream("CONTACT_WEBHOOK_URL is not configured".to_string()))?;

    let payload = json!({
        "form": form,
        "source": config.site.url,
        "submittedAt": chrono::Utc::now(),
    });

    let response = http
        .post(webhook)
        .json(&payload)
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("webhook request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(AppError::Upstream(format!(
            "webhook answered with status {}",
            response.status()
        )));
    }

    tracing::info!(email = %form.email, "contact form forwarded");
    Ok(Json(json!({ "success": true })))
}
