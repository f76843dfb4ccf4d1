//! Create `config_property` table.
//! One row per configuration property holding its current normalized value.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConfigProperty::Table)
                    .if_not_exists()
                    .col(string_len(ConfigProperty::Id, 128).primary_key())
                    .col(json(ConfigProperty::Value).not_null())
                    .col(big_integer(ConfigProperty::Version).not_null())
                    .col(timestamp_with_time_zone(ConfigProperty::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ConfigProperty::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ConfigProperty::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ConfigProperty {
    Table,
    Id,
    Value,
    Version,
    CreatedAt,
    UpdatedAt,
}
