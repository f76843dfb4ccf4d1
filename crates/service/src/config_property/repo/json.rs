use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config_property::domain::{ConfigChangeRecord, PropertyCommit, PropertyRecord};
use crate::config_property::repository::PropertyRepository;
use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredProperty {
    record: PropertyRecord,
    #[serde(default)]
    history: Vec<PropertyCommit>,
}

/// Property repository persisted as a single JSON file.
pub struct JsonPropertyRepository {
    store: Arc<JsonMapStore<String, StoredProperty>>,
}

impl JsonPropertyRepository {
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::new(path).await?;
        Ok(Arc::new(Self { store }))
    }
}

#[async_trait]
impl PropertyRepository for JsonPropertyRepository {
    async fn get(&self, name: &str, strict: bool) -> Result<Option<PropertyRecord>, ServiceError> {
        let found = self.store.get(&name.to_string()).await.map(|s| s.record);
        if strict && found.is_none() {
            return Err(ServiceError::not_found(name));
        }
        Ok(found)
    }

    async fn commit(
        &self,
        record: &mut PropertyRecord,
        committer_id: &str,
        changes: Vec<ConfigChangeRecord>,
    ) -> Result<(), ServiceError> {
        let mut next = record.clone();
        let committer_id = committer_id.to_string();
        let saved = self
            .store
            .update_map(move |map| {
                let now = Utc::now();
                let entry = map.entry(next.id.clone()).or_insert_with(|| StoredProperty {
                    record: PropertyRecord::new(next.id.clone()),
                    history: Vec::new(),
                });
                next.version = entry.record.version + 1;
                next.last_updated = Some(now);
                entry.history.push(PropertyCommit {
                    property_id: next.id.clone(),
                    version: next.version,
                    committer_id,
                    changes,
                    created_at: now,
                });
                entry.record = next.clone();
                Ok(next)
            })
            .await?;
        *record = saved;
        Ok(())
    }

    async fn history(&self, name: &str) -> Result<Vec<PropertyCommit>, ServiceError> {
        Ok(self.store.get(&name.to_string()).await.map(|s| s.history).unwrap_or_default())
    }
}
