use std::{env, path::PathBuf};

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://site.db";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024; // 5MB

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration, read once at start-up and shared through the app state.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub contact_webhook_url: Option<String>,
    pub site: SiteSettings,
}

/// Public facts about the site, used by the API and by the page renderer.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub name: String,
    pub url: String,
    pub author: String,
    pub ga_measurement_id: Option<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            name: "Northwind Automation".to_string(),
            url: "http://localhost:3000".to_string(),
            author: "Northwind Team".to_string(),
            ga_measurement_id: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            port: 3000,
            jwt_secret: "dev-secret".to_string(),
            token_ttl_hours: 24,
            admin_email: None,
            admin_password: None,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            contact_webhook_url: None,
            site: SiteSettings::default(),
        }
    }
}

impl SiteSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = SiteSettings::default();

        SiteSettings {
            name: get("SITE_NAME").unwrap_or(defaults.name),
            url: get("SITE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.url),
            author: get("SITE_AUTHOR").unwrap_or(defaults.author),
            ga_measurement_id: get("GA_MEASUREMENT_ID"),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Config {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            port: parse_or("PORT", get("PORT"), defaults.port)?,
            jwt_secret,
            token_ttl_hours: parse_or("TOKEN_TTL_HOURS", get("TOKEN_TTL_HOURS"), defaults.token_ttl_hours)?,
            admin_email: get("ADMIN_EMAIL"),
            admin_password: get("ADMIN_PASSWORD"),
            upload_dir: get("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", get("MAX_UPLOAD_BYTES"), defaults.max_upload_bytes)?,
            contact_webhook_url: get("CONTACT_WEBHOOK_URL"),
            site: SiteSettings::from_lookup(&lookup),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn jwt_secret_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn defaults_fill_unset_values() {
        let cfg = Config::from_lookup(lookup(&[("JWT_SECRET", "s3cret"), ("PORT", "")])).unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.token_ttl_hours, 24);
        assert_eq!(cfg.max_upload_bytes, 5 * 1024 * 1024);
        assert!(cfg.contact_webhook_url.is_none());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "x"), ("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn site_url_loses_trailing_slash() {
        let cfg = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "x"),
            ("SITE_URL", "https://example.com/"),
            ("GA_MEASUREMENT_ID", "G-TEST"),
        ]))
        .unwrap();
        assert_eq!(cfg.site.url, "https://example.com");
        assert_eq!(cfg.site.ga_measurement_id.as_deref(), Some("G-TEST"));
    }
}
