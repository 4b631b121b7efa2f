use std::sync::Arc;

use tracing::info;

use crate::adapter::cache::memory::{MemoryCache, NoopCache};
use crate::adapter::crypto::argon2::ArgonPasswordHasher;
use crate::adapter::crypto::jwt::JwtTokenIssuer;
use crate::application::interface::cache::CacheStore;
use crate::infra::config::AppConfig;
use crate::infra::db::init_db;
use crate::infra::state::AppState;

pub mod app;
pub mod config;
pub mod db;
pub mod setup;
pub mod state;

fn jwt_token_issuer(config: &AppConfig) -> JwtTokenIssuer {
    let jwt = &config.jwt;
    JwtTokenIssuer::new(&jwt.secret, jwt.issuer.clone(), jwt.access_ttl, jwt.refresh_ttl)
}

pub fn user_cache(config: &AppConfig) -> Arc<dyn CacheStore> {
    if config.cache.enabled {
        info!("User cache enabled, ttl {}s", config.cache.user_ttl);
        Arc::new(MemoryCache::new())
    } else {
        info!("User cache disabled");
        Arc::new(NoopCache)
    }
}

pub async fn init_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let pool = init_db(config).await?;

    Ok(AppState {
        pool,
        hasher: Arc::new(ArgonPasswordHasher::default()),
        tokens: Arc::new(jwt_token_issuer(config)),
        cache: user_cache(config),
        config: Arc::new(config.clone()),
    })
}
