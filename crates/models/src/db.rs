use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

/// Open a connection pool for the given URL (`postgres://…` or `sqlite:…`).
pub async fn connect(url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(url.to_string());
    opts.sqlx_logging(false);
    // 内存 SQLite 每个连接都是独立数据库，只能使用单连接
    if url.starts_with("sqlite::memory:") {
        opts.max_connections(1).min_connections(1);
    }
    let db = Database::connect(opts).await?;
    Ok(db)
}

/// Connect and bring the schema up to date.
pub async fn connect_and_migrate(url: &str) -> anyhow::Result<DatabaseConnection> {
    let db = connect(url).await?;
    migration::Migrator::up(&db, None).await?;
    info!(event = "migrated", "config property schema is up to date");
    Ok(db)
}
