use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use site_backend::{config::SiteSettings, db, render};

/// Build-time tooling for the marketing site.
#[derive(Debug, Parser)]
#[command(name = "sitegen", version, about)]
struct Cli {
    /// Database to read from
    #[arg(long, global = true, env = "DATABASE_URL", default_value = "sqlite://site.db")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pre-render blog posts and marketing routes into the client build
    Render {
        /// Client build directory containing index.html
        #[arg(long, default_value = "dist")]
        dist: PathBuf,
    },
    /// Load a posts.json export into the database
    Import {
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    site_backend::init_tracing("info");

    let cli = Cli::parse();
    let site = SiteSettings::from_env();

    let pool = db::init_db(&cli.database_url)
        .await
        .with_context(|| format!("could not open database {}", cli.database_url))?;

    match cli.command {
        Command::Render { dist } => {
            let report = render::render_site(&pool, &site, &dist).await?;
            if report.skipped {
                tracing::warn!("Nothing rendered; deploying in SPA mode");
            }
        }
        Command::Import { file } => {
            render::import_posts(&pool, &file, &site.author).await?;
        }
    }

    Ok(())
}
