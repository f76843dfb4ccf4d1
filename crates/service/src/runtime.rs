//! Runtime wiring
//!
//! Builds a `ConfigPropertyService` from `AppConfig` so binaries only need
//! to depend on `service` and `configs`.

use std::sync::Arc;

use configs::{AppConfig, StorageBackend};
use tracing::info;

use crate::config_property::cache::MokaPropertyCache;
use crate::config_property::repo::{json::JsonPropertyRepository, seaorm::SeaOrmPropertyRepository};
use crate::config_property::repository::{mock::InMemoryPropertyRepository, PropertyRepository};
use crate::config_property::{ConfigPropertyRegistry, ConfigPropertyService};

/// Ensure expected directories exist; warn on missing optional ones.
pub async fn ensure_env(cfg: &AppConfig) -> anyhow::Result<common::env::EnvStatus> {
    common::env::ensure_env(&cfg.objects.templates_dir, &cfg.storage.data_dir).await
}

/// Select the repository for the configured backend.
pub async fn build_repository(cfg: &AppConfig) -> anyhow::Result<Arc<dyn PropertyRepository>> {
    let repo: Arc<dyn PropertyRepository> = match cfg.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryPropertyRepository::default()),
        StorageBackend::Json => JsonPropertyRepository::open(&cfg.storage.json_path).await?,
        StorageBackend::Database => {
            let url = cfg.storage.database_url.trim();
            if url.is_empty() {
                anyhow::bail!("storage.database_url is required for the database backend");
            }
            let db = models::db::connect_and_migrate(url).await?;
            Arc::new(SeaOrmPropertyRepository::new(db))
        }
    };
    info!(backend = ?cfg.storage.backend, "property repository ready");
    Ok(repo)
}

/// Registry with the built-in properties, the configured repository and a moka cache.
pub async fn build_config_service(cfg: &AppConfig) -> anyhow::Result<ConfigPropertyService> {
    let registry = Arc::new(ConfigPropertyRegistry::with_builtin_properties()?);
    let repo = build_repository(cfg).await?;
    let cache = Arc::new(MokaPropertyCache::from_config(&cfg.cache));
    Ok(ConfigPropertyService::new(registry, repo, cache))
}
