use async_trait::async_trait;

use super::domain::{ConfigChangeRecord, PropertyCommit, PropertyRecord};
use crate::errors::ServiceError;

/// Durable store for property values and their audit history.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Load a record. With `strict`, a missing record is `ServiceError::NotFound`.
    async fn get(&self, name: &str, strict: bool) -> Result<Option<PropertyRecord>, ServiceError>;

    /// A fresh, unsaved record.
    fn create(&self, name: &str) -> PropertyRecord {
        PropertyRecord::new(name)
    }

    /// Persist `record.value` and append one history entry.
    ///
    /// On success `record.version` and `record.last_updated` reflect the stored row.
    async fn commit(
        &self,
        record: &mut PropertyRecord,
        committer_id: &str,
        changes: Vec<ConfigChangeRecord>,
    ) -> Result<(), ServiceError>;

    /// Committed change sets, oldest first.
    async fn history(&self, name: &str) -> Result<Vec<PropertyCommit>, ServiceError>;
}

/// Simple in-memory repository for tests and the `memory` storage backend
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryPropertyRepository {
        records: RwLock<HashMap<String, PropertyRecord>>,
        commits: RwLock<HashMap<String, Vec<PropertyCommit>>>,
    }

    #[async_trait]
    impl PropertyRepository for InMemoryPropertyRepository {
        async fn get(&self, name: &str, strict: bool) -> Result<Option<PropertyRecord>, ServiceError> {
            let found = self.records.read().await.get(name).cloned();
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
            let mut records = self.records.write().await;
            let mut commits = self.commits.write().await;
            let now = Utc::now();
            let version = records.get(&record.id).map(|r| r.version).unwrap_or(0) + 1;

            record.version = version;
            record.last_updated = Some(now);
            records.insert(record.id.clone(), record.clone());
            commits.entry(record.id.clone()).or_default().push(PropertyCommit {
                property_id: record.id.clone(),
                version,
                committer_id: committer_id.to_string(),
                changes,
                created_at: now,
            });
            Ok(())
        }

        async fn history(&self, name: &str) -> Result<Vec<PropertyCommit>, ServiceError> {
            Ok(self.commits.read().await.get(name).cloned().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::InMemoryPropertyRepository;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn in_memory_commit_and_history() -> Result<(), anyhow::Error> {
        let repo = InMemoryPropertyRepository::default();
        assert!(repo.get("p", false).await?.is_none());
        assert!(matches!(repo.get("p", true).await, Err(ServiceError::NotFound(_))));

        let mut rec = repo.create("p");
        rec.value = json!(1);
        repo.commit(&mut rec, "alice", vec![ConfigChangeRecord::ChangePropertyValue { new_value: json!(1) }]).await?;
        rec.value = json!(2);
        repo.commit(&mut rec, "bob", vec![ConfigChangeRecord::ChangePropertyValue { new_value: json!(2) }]).await?;

        assert_eq!(rec.version, 2);
        let stored = repo.get("p", true).await?.expect("stored");
        assert_eq!(stored.value, json!(2));
        let log = repo.history("p").await?;
        assert_eq!(log.iter().map(|c| c.committer_id.as_str()).collect::<Vec<_>>(), ["alice", "bob"]);
        assert_eq!(log[1].version, 2);
        Ok(())
    }
}
