use tracing::warn;

use crate::application::interface::cache::{user_cache_key, CacheStore};

pub mod auth;
pub mod users;

/// Drops the cached profile of a user. A cache failure never fails the caller.
pub(crate) async fn evict_cached_user(cache: &dyn CacheStore, user_id: &str) {
    let key = user_cache_key(user_id);
    if let Err(e) = cache.delete(&key).await {
        warn!("Failed to evict cache entry {}: {}", key, e);
    }
}
