use std::net::SocketAddr;

use anyhow::Context;
use site_backend::{config::Config, db, routes, state::AppState};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    site_backend::init_tracing("info,tower_http=debug");

    let config = Config::from_env().context("invalid configuration")?;

    let pool = db::init_db(&config.database_url)
        .await
        .with_context(|| format!("could not open database {}", config.database_url))?;
    tracing::info!("✅ Database ready at {}", config.database_url);

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        if db::users::ensure_admin(&pool, email, password).await? {
            tracing::info!("👤 Created admin account {}", email);
        }
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = routes::create_routes(AppState::new(pool, config))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("🚀 Server running on http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
