use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub objects: ObjectsConfig,
}

/// Which durable store backs configuration properties.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Json,
    Database,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_json_path")]
    pub json_path: String,
    #[serde(default)]
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
            json_path: default_json_path(),
            database_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Zero disables expiry.
    #[serde(default)]
    pub time_to_live_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_capacity: default_max_capacity(), time_to_live_secs: 0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectsConfig {
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
}

impl Default for ObjectsConfig {
    fn default() -> Self {
        Self { templates_dir: default_templates_dir() }
    }
}

fn default_data_dir() -> String { "data".into() }
fn default_json_path() -> String { "data/config_properties.json".into() }
fn default_max_capacity() -> u64 { 1024 }
fn default_templates_dir() -> String { "extensions/objects/templates".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the file is absent.
    pub fn load_and_validate() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.storage.normalize_from_env();
        self.storage.validate()?;
        self.cache.validate()?;
        self.objects.normalize_from_env();
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        // 若 TOML 中未提供 URL，则尝试从环境变量填充
        if self.database_url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.database_url = url;
            }
        }
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.backend {
            StorageBackend::Memory => Ok(()),
            StorageBackend::Json => {
                if self.json_path.trim().is_empty() {
                    return Err(anyhow!("storage.json_path must not be empty for the json backend"));
                }
                Ok(())
            }
            StorageBackend::Database => {
                let lower = self.database_url.to_lowercase();
                if lower.trim().is_empty() {
                    return Err(anyhow!("storage.database_url is empty; set it in config.toml or DATABASE_URL"));
                }
                if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
                    return Err(anyhow!("storage.database_url must start with postgres://, postgresql:// or sqlite:"));
                }
                Ok(())
            }
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_capacity == 0 {
            return Err(anyhow!("cache.max_capacity must be >= 1"));
        }
        Ok(())
    }
}

impl ObjectsConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(dir) = std::env::var("OBJCONF_TEMPLATES_DIR") {
            if !dir.trim().is_empty() {
                self.templates_dir = dir;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() -> Result<()> {
        let cfg = parse("")?;
        assert_eq!(cfg.storage.backend, StorageBackend::Json);
        assert_eq!(cfg.storage.json_path, "data/config_properties.json");
        assert_eq!(cfg.cache.max_capacity, 1024);
        assert_eq!(cfg.cache.time_to_live_secs, 0);
        Ok(())
    }

    #[test]
    fn parses_all_sections() -> Result<()> {
        let cfg = parse(
            r#"
            [storage]
            backend = "database"
            database_url = "sqlite::memory:"

            [cache]
            max_capacity = 16
            time_to_live_secs = 30

            [objects]
            templates_dir = "/srv/templates"
            "#,
        )?;
        assert_eq!(cfg.storage.backend, StorageBackend::Database);
        assert_eq!(cfg.cache.max_capacity, 16);
        assert_eq!(cfg.objects.templates_dir, "/srv/templates");
        cfg.storage.validate()?;
        Ok(())
    }

    #[test]
    fn database_backend_rejects_unknown_scheme() -> Result<()> {
        let cfg = parse("[storage]\nbackend = \"database\"\ndatabase_url = \"mysql://x\"\n")?;
        assert!(cfg.storage.validate().is_err());
        Ok(())
    }

    #[test]
    fn zero_cache_capacity_is_rejected() {
        let cache = CacheConfig { max_capacity: 0, time_to_live_secs: 0 };
        assert!(cache.validate().is_err());
    }
}
