//! Startup directory checks.

use std::path::Path;

use tracing::warn;

/// What `ensure_env` found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvStatus {
    /// Editor templates can be served only when this is true.
    pub templates_present: bool,
}

/// Create the data directory if needed and report whether the template directory exists.
pub async fn ensure_env(templates_dir: impl AsRef<Path>, data_dir: impl AsRef<Path>) -> anyhow::Result<EnvStatus> {
    let templates_dir = templates_dir.as_ref();
    let data_dir = data_dir.as_ref();

    let templates_present = tokio::fs::metadata(templates_dir).await.map(|m| m.is_dir()).unwrap_or(false);
    if !templates_present {
        warn!(templates_dir = %templates_dir.display(), "object templates directory not found");
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    Ok(EnvStatus { templates_present })
}
