use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config_property;

/// One committed change set for a configuration property.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "config_property_commit")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub property_id: String,
    pub version: i64,
    #[sea_orm(column_type = "Text")]
    pub committer_id: String,
    pub changes: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Property }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Property => Entity::belongs_to(config_property::Entity)
                .from(Column::PropertyId)
                .to(config_property::Column::Id)
                .into(),
        }
    }
}

impl Related<config_property::Entity> for Entity {
    fn to() -> RelationDef { Relation::Property.def() }
}

impl ActiveModelBehavior for ActiveModel {}
