use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::cache::PropertyCache;
use super::domain::{ConfigChangeRecord, ConfigProperty, PropertyCommit, PropertySummary};
use super::registry::ConfigPropertyRegistry;
use super::repository::PropertyRepository;
use crate::errors::ServiceError;

/// Reads and writes registered configuration properties.
///
/// Writes go to the repository first and then to the cache. The two are not
/// updated atomically; a reader may briefly see the old cached value.
pub struct ConfigPropertyService {
    registry: Arc<ConfigPropertyRegistry>,
    repo: Arc<dyn PropertyRepository>,
    cache: Arc<dyn PropertyCache>,
}

impl ConfigPropertyService {
    pub fn new(
        registry: Arc<ConfigPropertyRegistry>,
        repo: Arc<dyn PropertyRepository>,
        cache: Arc<dyn PropertyCache>,
    ) -> Self {
        Self { registry, repo, cache }
    }

    pub fn registry(&self) -> &ConfigPropertyRegistry { &self.registry }

    fn lookup(&self, name: &str) -> Result<Arc<ConfigProperty>, ServiceError> {
        self.registry.get(name).ok_or_else(|| ServiceError::UnknownProperty(name.to_string()))
    }

    /// Current value of a property: cache, then store, then the registered default.
    #[instrument(skip(self))]
    pub async fn get_property(&self, name: &str) -> Result<Value, ServiceError> {
        let property = self.lookup(name)?;
        if let Some(v) = self.cache.get_multi(&[name]).await.remove(name) {
            debug!("cache hit");
            return Ok(v);
        }
        match self.repo.get(name, false).await? {
            Some(record) => {
                self.cache.set_multi(HashMap::from([(name.to_string(), record.value.clone())])).await;
                Ok(record.value)
            }
            None => Ok(property.default_value.clone()),
        }
    }

    /// Normalize and persist a new value, then refresh the cache.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use serde_json::json;
    /// use service::config_property::{ConfigPropertyRegistry, ConfigPropertyService};
    /// use service::config_property::cache::NoopPropertyCache;
    /// use service::config_property::repository::mock::InMemoryPropertyRepository;
    /// let registry = Arc::new(ConfigPropertyRegistry::with_builtin_properties().unwrap());
    /// let svc = ConfigPropertyService::new(registry, Arc::new(InMemoryPropertyRepository::default()), Arc::new(NoopPropertyCache));
    /// let v = tokio_test::block_on(svc.set_property("admin", "allow_yaml_file_upload", &json!(true))).unwrap();
    /// assert_eq!(v, json!(true));
    /// ```
    #[instrument(skip(self, value))]
    pub async fn set_property(&self, committer_id: &str, name: &str, value: &Value) -> Result<Value, ServiceError> {
        let property = self.lookup(name)?;
        let normalized = property.normalize(value)?;

        let mut record = match self.repo.get(name, false).await? {
            Some(record) => record,
            None => self.repo.create(name),
        };
        record.value = normalized.clone();
        let changes = vec![ConfigChangeRecord::ChangePropertyValue { new_value: normalized.clone() }];
        self.repo.commit(&mut record, committer_id, changes).await?;

        self.cache.set_multi(HashMap::from([(name.to_string(), normalized.clone())])).await;
        info!(version = record.version, "config property updated");
        Ok(normalized)
    }

    /// Set a property back to its registered default.
    #[instrument(skip(self))]
    pub async fn revert_property(&self, committer_id: &str, name: &str) -> Result<Value, ServiceError> {
        let default_value = self.lookup(name)?.default_value.clone();
        self.set_property(committer_id, name, &default_value).await
    }

    /// Drop cached values. Unknown names are ignored.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, names: &[&str]) {
        self.cache.delete_multi(names).await;
    }

    #[instrument(skip(self))]
    pub async fn history(&self, name: &str) -> Result<Vec<PropertyCommit>, ServiceError> {
        self.lookup(name)?;
        self.repo.history(name).await
    }

    /// Every registered property with its current value, in registration order.
    pub async fn registered_properties(&self) -> Result<Vec<PropertySummary>, ServiceError> {
        let mut out = Vec::with_capacity(self.registry.len());
        for property in self.registry.iter() {
            out.push(PropertySummary {
                name: property.name.clone(),
                description: property.description.clone(),
                schema: property.schema.to_json(),
                value: self.get_property(&property.name).await?,
            });
        }
        Ok(out)
    }
}
