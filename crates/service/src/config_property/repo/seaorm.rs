use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::config_property::domain::{ConfigChangeRecord, PropertyCommit, PropertyRecord};
use crate::config_property::repository::PropertyRepository;
use crate::errors::ServiceError;

pub struct SeaOrmPropertyRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmPropertyRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_record(m: models::config_property::Model) -> PropertyRecord {
    PropertyRecord {
        id: m.id,
        value: m.value,
        version: m.version.max(0) as u64,
        last_updated: Some(m.updated_at.with_timezone(&Utc)),
    }
}

fn to_commit(m: models::config_property_commit::Model) -> Result<PropertyCommit, ServiceError> {
    let changes: Vec<ConfigChangeRecord> =
        serde_json::from_value(m.changes).map_err(|e| ServiceError::Db(format!("bad change list: {e}")))?;
    Ok(PropertyCommit {
        property_id: m.property_id,
        version: m.version.max(0) as u64,
        committer_id: m.committer_id,
        changes,
        created_at: m.created_at.with_timezone(&Utc),
    })
}

#[async_trait]
impl PropertyRepository for SeaOrmPropertyRepository {
    async fn get(&self, name: &str, strict: bool) -> Result<Option<PropertyRecord>, ServiceError> {
        let found = models::config_property::get(&self.db, name, false).await?;
        if strict && found.is_none() {
            return Err(ServiceError::not_found(name));
        }
        Ok(found.map(to_record))
    }

    async fn commit(
        &self,
        record: &mut PropertyRecord,
        committer_id: &str,
        changes: Vec<ConfigChangeRecord>,
    ) -> Result<(), ServiceError> {
        let changes = serde_json::to_value(&changes).map_err(|e| ServiceError::Db(e.to_string()))?;
        let saved =
            models::config_property::commit(&self.db, &record.id, record.value.clone(), committer_id, changes).await?;
        *record = to_record(saved);
        Ok(())
    }

    async fn history(&self, name: &str) -> Result<Vec<PropertyCommit>, ServiceError> {
        models::config_property::history(&self.db, name)
            .await?
            .into_iter()
            .map(to_commit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn seaorm_repository_commits_and_reads_history() -> Result<(), anyhow::Error> {
        let db = models::db::connect_and_migrate("sqlite::memory:").await?;
        let repo = SeaOrmPropertyRepository::new(db);

        assert!(repo.get("splash", false).await?.is_none());
        let mut rec = repo.create("splash");
        rec.value = json!("abc");
        repo.commit(&mut rec, "admin", vec![ConfigChangeRecord::ChangePropertyValue { new_value: json!("abc") }])
            .await?;
        assert_eq!(rec.version, 1);

        rec.value = json!("def");
        repo.commit(&mut rec, "admin", vec![ConfigChangeRecord::ChangePropertyValue { new_value: json!("def") }])
            .await?;

        let stored = repo.get("splash", true).await?.expect("row");
        assert_eq!(stored.value, json!("def"));
        assert_eq!(stored.version, 2);

        let log = repo.history("splash").await?;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].changes, vec![ConfigChangeRecord::ChangePropertyValue { new_value: json!("abc") }]);
        Ok(())
    }
}
