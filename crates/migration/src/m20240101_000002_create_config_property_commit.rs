//! Create `config_property_commit` table.
//! Append-only audit log: one row per committed change set.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConfigPropertyCommit::Table)
                    .if_not_exists()
                    .col(pk_auto(ConfigPropertyCommit::Id))
                    .col(string_len(ConfigPropertyCommit::PropertyId, 128).not_null())
                    .col(big_integer(ConfigPropertyCommit::Version).not_null())
                    .col(text(ConfigPropertyCommit::CommitterId).not_null())
                    .col(json(ConfigPropertyCommit::Changes).not_null())
                    .col(timestamp_with_time_zone(ConfigPropertyCommit::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_config_property_commit_property")
                            .from(ConfigPropertyCommit::Table, ConfigPropertyCommit::PropertyId)
                            .to(ConfigProperty::Table, ConfigProperty::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One commit per (property, version)
        manager
            .create_index(
                Index::create()
                    .name("idx_config_property_commit_version")
                    .table(ConfigPropertyCommit::Table)
                    .col(ConfigPropertyCommit::PropertyId)
                    .col(ConfigPropertyCommit::Version)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ConfigPropertyCommit::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ConfigPropertyCommit {
    Table,
    Id,
    PropertyId,
    Version,
    CommitterId,
    Changes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ConfigProperty { Table, Id }
