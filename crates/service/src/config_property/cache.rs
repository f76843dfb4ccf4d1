use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use configs::CacheConfig;
use moka::future::Cache;
use serde_json::Value;

/// Shared key-value cache in front of the property repository.
///
/// Keys are property names, values are normalized property values.
#[async_trait]
pub trait PropertyCache: Send + Sync {
    /// Returns only the keys that were present.
    async fn get_multi(&self, keys: &[&str]) -> HashMap<String, Value>;
    async fn set_multi(&self, entries: HashMap<String, Value>);
    async fn delete_multi(&self, keys: &[&str]);
}

/// In-process cache backed by moka.
#[derive(Clone)]
pub struct MokaPropertyCache {
    inner: Cache<String, Value>,
}

impl MokaPropertyCache {
    pub fn new(max_capacity: u64, time_to_live: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(max_capacity);
        if let Some(ttl) = time_to_live {
            builder = builder.time_to_live(ttl);
        }
        Self { inner: builder.build() }
    }

    pub fn from_config(cfg: &CacheConfig) -> Self {
        let ttl = (cfg.time_to_live_secs > 0).then(|| Duration::from_secs(cfg.time_to_live_secs));
        Self::new(cfg.max_capacity, ttl)
    }
}

#[async_trait]
impl PropertyCache for MokaPropertyCache {
    async fn get_multi(&self, keys: &[&str]) -> HashMap<String, Value> {
        let mut found = HashMap::new();
        for key in keys {
            if let Some(v) = self.inner.get(*key).await {
                found.insert(key.to_string(), v);
            }
        }
        found
    }

    async fn set_multi(&self, entries: HashMap<String, Value>) {
        for (k, v) in entries {
            self.inner.insert(k, v).await;
        }
    }

    async fn delete_multi(&self, keys: &[&str]) {
        for key in keys {
            self.inner.invalidate(*key).await;
        }
    }
}

/// Cache that never holds anything; every read goes to the repository.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPropertyCache;

#[async_trait]
impl PropertyCache for NoopPropertyCache {
    async fn get_multi(&self, _keys: &[&str]) -> HashMap<String, Value> { HashMap::new() }
    async fn set_multi(&self, _entries: HashMap<String, Value>) {}
    async fn delete_multi(&self, _keys: &[&str]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn moka_cache_get_set_delete() {
        let cache = MokaPropertyCache::new(16, None);
        cache.set_multi(HashMap::from([("a".to_string(), json!(1)), ("b".to_string(), json!("x"))])).await;

        let got = cache.get_multi(&["a", "b", "c"]).await;
        assert_eq!(got.len(), 2);
        assert_eq!(got.get("b"), Some(&json!("x")));

        cache.delete_multi(&["a"]).await;
        assert!(cache.get_multi(&["a"]).await.is_empty());
    }

    #[tokio::test]
    async fn noop_cache_is_always_empty() {
        let cache = NoopPropertyCache;
        cache.set_multi(HashMap::from([("a".to_string(), json!(1))])).await;
        assert!(cache.get_multi(&["a"]).await.is_empty());
    }
}
