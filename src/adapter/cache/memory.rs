use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::application::app_error::AppResult;
use crate::application::interface::cache::CacheStore;

/// Process-local TTL cache. Expired entries are dropped when read.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, (String, Instant)>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.1 > now => return Ok(Some(entry.0.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            debug!("Cache entry {} expired", key);
            self.entries.remove_if(key, |_, (_, expires_at)| *expires_at <= now);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> AppResult<()> {
        self.entries
            .insert(key.to_owned(), (value, Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Used when `[cache] enabled = false`.
#[derive(Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl CacheStore for NoopCache {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> AppResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new();
        cache.set("user:1", "payload".to_string(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("user:1").await.unwrap(), Some("payload".to_string()));
        assert_eq!(cache.get("user:2").await.unwrap(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn test_expired_entry_is_evicted_on_read() {
        let cache = MemoryCache::new();
        cache.set("user:1", "payload".to_string(), Duration::ZERO).await.unwrap();

        assert_eq!(cache.get("user:1").await.unwrap(), None);
        assert!(!cache.entries.contains_key("user:1"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_set_overwrites_and_delete_removes() {
        let cache = MemoryCache::new();
        cache.set("k", "old".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.set("k", "new".to_string(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));

        cache.delete("k").await.unwrap();
        cache.delete("missing").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn test_noop_cache_never_hits() {
        let cache = NoopCache;
        cache.set("k", "v".to_string(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
