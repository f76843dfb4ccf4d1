//! Migrator registering config property tables in dependency order.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_config_property;
mod m20240101_000002_create_config_property_commit;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_config_property::Migration),
            Box::new(m20240101_000002_create_config_property_commit::Migration),
        ]
    }
}
