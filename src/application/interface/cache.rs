use std::time::Duration;

use async_trait::async_trait;

use crate::application::app_error::AppResult;

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> AppResult<()>;
    async fn delete(&self, key: &str) -> AppResult<()>;
}

pub fn user_cache_key(user_id: &str) -> String {
    format!("user:{}", user_id)
}
