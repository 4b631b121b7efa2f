use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::infra::config::AppConfig;

pub async fn init_db(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db.max_connections as u32)
        .acquire_timeout(Duration::from_secs(config.application.request_timeout))
        .connect(config.db.url.as_str())
        .await?;
    info!("Connected to database with up to {} connections", config.db.max_connections);
    Ok(pool)
}
