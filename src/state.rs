use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, db::DbPool, utils::jwt::TokenRegistry};

/// Everything a handler may need, passed explicitly through the router.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenRegistry>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            tokens: Arc::new(TokenRegistry::default()),
            http: reqwest::Client::new(),
        }
    }
}
