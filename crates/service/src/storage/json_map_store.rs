use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};
use tracing::warn;

use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file. Writes go to a sibling temp file
/// which is then renamed over the original, and the in-memory map is only
/// replaced once the file is on disk.
pub struct JsonMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    ///
    /// A file that exists but does not parse is an error; it is never silently replaced.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| ServiceError::Db(e.to_string()))?;
            }
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                warn!(path = %file_path.display(), error = %e, "store file is corrupt");
                ServiceError::Db(format!("cannot parse {}: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: HashMap<K, V> = HashMap::new();
                write_atomic(&file_path, &empty).await?;
                empty
            }
            Err(e) => return Err(ServiceError::Db(e.to_string())),
        };

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Apply a mutation to a copy of the map, persist it, then publish it.
    ///
    /// If `f` or the write fails, the visible map is unchanged.
    pub async fn update_map<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<T, ServiceError>,
    {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        let out = f(&mut next)?;
        write_atomic(&self.file_path, &next).await?;
        *map = next;
        Ok(out)
    }
}

async fn write_atomic<T: serde::Serialize>(path: &PathBuf, data: &T) -> Result<(), ServiceError> {
    let bytes = serde_json::to_vec_pretty(data).map_err(|e| ServiceError::Db(e.to_string()))?;
    let mut tmp = path.clone().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    fs::rename(&tmp, path).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("json_map_store_{tag}_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn json_map_store_update_persists() -> Result<(), anyhow::Error> {
        let tmp = temp_path("crud");
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        // initially empty
        assert_eq!(store.get(&"a".into()).await, None);

        store
            .update_map(|m| {
                m.insert("a".into(), "1".into());
                m.insert("b".into(), "2".into());
                Ok(())
            })
            .await?;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("1"));

        // reload from disk
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.get(&"a".into()).await.as_deref(), Some("1"));
        assert_eq!(reloaded.get(&"b".into()).await.as_deref(), Some("2"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_leaves_map_untouched() -> Result<(), anyhow::Error> {
        let tmp = temp_path("rollback");
        let store = JsonMapStore::<String, u32>::new(&tmp).await?;
        store.update_map(|m| { m.insert("n".into(), 1); Ok(()) }).await?;

        let res: Result<(), _> = store
            .update_map(|m| {
                m.insert("n".into(), 2);
                Err(ServiceError::Db("boom".into()))
            })
            .await;
        assert!(res.is_err());
        assert_eq!(store.get(&"n".into()).await, Some(1));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() -> Result<(), anyhow::Error> {
        let tmp = temp_path("corrupt");
        tokio::fs::write(&tmp, b"{not json").await?;
        assert!(JsonMapStore::<String, String>::new(&tmp).await.is_err());
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
