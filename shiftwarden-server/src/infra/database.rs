use std::time::Duration;

use anyhow::{Context, anyhow};
use shiftwarden_config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

pub fn primary_url(config: &Config) -> anyhow::Result<&str> {
    config
        .database
        .primary_url
        .as_deref()
        .ok_or_else(|| anyhow!("no database URL configured; set DATABASE_URL or database.url"))
}

pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")?;
    info!(max_connections, "Database pool initialized");
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    shiftwarden_core::MIGRATOR
        .run(pool)
        .await
        .context("database migration failed")?;
    info!("Database migrations applied");
    Ok(())
}
