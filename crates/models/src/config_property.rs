use chrono::Utc;
use sea_orm::{entity::prelude::*, ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};

use crate::{config_property_commit, errors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "config_property")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub value: Json,
    pub version: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Commits }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Commits => Entity::has_many(config_property_commit::Entity).into(),
        }
    }
}

impl Related<config_property_commit::Entity> for Entity {
    fn to() -> RelationDef { Relation::Commits.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_id(id: &str) -> Result<(), errors::ModelError> {
    if id.trim().is_empty() {
        return Err(errors::ModelError::Validation("config property id must not be empty".into()));
    }
    if id.len() > 128 {
        return Err(errors::ModelError::Validation("config property id longer than 128 chars".into()));
    }
    Ok(())
}

/// Fetch a property row. With `strict`, a missing row is an error instead of `None`.
pub async fn get(db: &DatabaseConnection, id: &str, strict: bool) -> Result<Option<Model>, errors::ModelError> {
    let found = Entity::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    if strict && found.is_none() {
        return Err(errors::ModelError::NotFound(format!("config property {id}")));
    }
    Ok(found)
}

/// Write `value` and append one audit row in a single transaction.
///
/// Inserts the property row on first commit; otherwise bumps `version`.
pub async fn commit(
    db: &DatabaseConnection,
    id: &str,
    value: Json,
    committer_id: &str,
    changes: Json,
) -> Result<Model, errors::ModelError> {
    validate_id(id)?;
    let txn = db.begin().await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    let now: DateTimeWithTimeZone = Utc::now().into();

    let existing = Entity::find_by_id(id.to_string())
        .one(&txn)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    let saved = match existing {
        Some(row) => {
            let version = row.version + 1;
            let mut am: ActiveModel = row.into();
            am.value = Set(value);
            am.version = Set(version);
            am.updated_at = Set(now);
            am.update(&txn).await.map_err(|e| errors::ModelError::Db(e.to_string()))?
        }
        None => {
            let am = ActiveModel {
                id: Set(id.to_string()),
                value: Set(value),
                version: Set(1),
                created_at: Set(now),
                updated_at: Set(now),
            };
            am.insert(&txn).await.map_err(|e| errors::ModelError::Db(e.to_string()))?
        }
    };

    let entry = config_property_commit::ActiveModel {
        property_id: Set(saved.id.clone()),
        version: Set(saved.version),
        committer_id: Set(committer_id.to_string()),
        changes: Set(changes),
        created_at: Set(now),
        ..Default::default()
    };
    entry.insert(&txn).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;

    txn.commit().await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(saved)
}

/// Audit log for a property, oldest first.
pub async fn history(db: &DatabaseConnection, id: &str) -> Result<Vec<config_property_commit::Model>, errors::ModelError> {
    config_property_commit::Entity::find()
        .filter(config_property_commit::Column::PropertyId.eq(id))
        .order_by_asc(config_property_commit::Column::Version)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use serde_json::json;

    #[tokio::test]
    async fn commit_inserts_then_bumps_version() -> Result<(), anyhow::Error> {
        let db = db::connect_and_migrate("sqlite::memory:").await?;

        assert!(get(&db, "banner", false).await?.is_none());
        assert!(matches!(get(&db, "banner", true).await, Err(errors::ModelError::NotFound(_))));

        let first = commit(&db, "banner", json!("hello"), "admin", json!([{"cmd": "change_property_value", "new_value": "hello"}])).await?;
        assert_eq!(first.version, 1);
        let second = commit(&db, "banner", json!("bye"), "root", json!([{"cmd": "change_property_value", "new_value": "bye"}])).await?;
        assert_eq!(second.version, 2);

        let found = get(&db, "banner", true).await?.expect("row exists");
        assert_eq!(found.value, json!("bye"));

        let log = history(&db, "banner").await?;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].committer_id, "admin");
        assert_eq!(log[1].version, 2);
        assert_eq!(log[1].changes[0]["new_value"], json!("bye"));
        Ok(())
    }

    #[tokio::test]
    async fn committer_id_has_no_length_cap() -> Result<(), anyhow::Error> {
        let db = db::connect_and_migrate("sqlite::memory:").await?;
        let committer = "c".repeat(300);
        commit(&db, "banner", json!("x"), &committer, json!([])).await?;
        assert_eq!(history(&db, "banner").await?[0].committer_id, committer);
        Ok(())
    }

    #[tokio::test]
    async fn empty_id_is_rejected() -> Result<(), anyhow::Error> {
        let db = db::connect_and_migrate("sqlite::memory:").await?;
        let res = commit(&db, " ", json!(1), "admin", json!([])).await;
        assert!(matches!(res, Err(errors::ModelError::Validation(_))));
        Ok(())
    }
}
