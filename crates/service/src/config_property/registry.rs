use std::collections::HashMap;
use std::sync::Arc;

use objects::Schema;
use serde_json::{json, Value};
use tracing::debug;

use super::domain::ConfigProperty;
use crate::errors::ServiceError;

/// Registered configuration properties, keyed by name.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Default)]
pub struct ConfigPropertyRegistry {
    properties: HashMap<String, Arc<ConfigProperty>>,
    order: Vec<String>,
}

impl ConfigPropertyRegistry {
    pub fn new() -> Self { Self::default() }

    /// Register a property. The name must be unused and the default value must itself normalize.
    pub fn register(&mut self, property: ConfigProperty) -> Result<Arc<ConfigProperty>, ServiceError> {
        if self.properties.contains_key(&property.name) {
            return Err(ServiceError::Registration(format!("config property {} is already registered", property.name)));
        }
        let default_value = property.normalize(&property.default_value).map_err(|e| {
            ServiceError::Registration(format!("default value of {} is invalid: {e}", property.name))
        })?;
        let property = Arc::new(ConfigProperty { default_value, ..property });
        debug!(name = %property.name, "config property registered");
        self.order.push(property.name.clone());
        self.properties.insert(property.name.clone(), Arc::clone(&property));
        Ok(property)
    }

    /// Register a property whose schema is given in dictionary form.
    pub fn register_json(
        &mut self,
        name: &str,
        schema: &Value,
        description: &str,
        default_value: Value,
    ) -> Result<Arc<ConfigProperty>, ServiceError> {
        let schema = Schema::from_json(schema)?;
        self.register(ConfigProperty::new(name, schema, description, default_value))
    }

    pub fn get(&self, name: &str) -> Option<Arc<ConfigProperty>> {
        self.properties.get(name).cloned()
    }

    /// Properties in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConfigProperty>> {
        self.order.iter().filter_map(|name| self.properties.get(name))
    }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    /// Registry pre-populated with the gallery page properties.
    pub fn with_builtin_properties() -> Result<Self, ServiceError> {
        let mut registry = Self::new();
        registry.register_json(
            "splash_page_youtube_video_id",
            &json!({"type": "unicode"}),
            "The (optional) video id for the Splash page",
            json!(""),
        )?;
        registry.register_json(
            "allow_yaml_file_upload",
            &json!({"type": "bool"}),
            "Whether to allow file uploads via YAML in the gallery page.",
            json!(false),
        )?;
        registry.register_json(
            "carousel_slides_config",
            &json!({
                "type": "list",
                "items": {
                    "type": "dict",
                    "properties": [{
                        "name": "topic",
                        "description": "Topic of the exploration",
                        "schema": {"type": "unicode"}
                    }, {
                        "name": "exploration_id",
                        "description": "The exploration ID",
                        "schema": {"type": "unicode"}
                    }, {
                        "name": "image_filename",
                        "description": "Filename of the carousel image (in /images/splash)",
                        "schema": {"type": "unicode"}
                    }]
                }
            }),
            "Configuration for slides in the gallery carousel.",
            json!([{"topic": "anything", "exploration_id": "0", "image_filename": "default.jpg"}]),
        )?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_properties_are_registered_in_order() -> Result<(), anyhow::Error> {
        let reg = ConfigPropertyRegistry::with_builtin_properties()?;
        let names: Vec<_> = reg.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["splash_page_youtube_video_id", "allow_yaml_file_upload", "carousel_slides_config"]);
        let slides = reg.get("carousel_slides_config").expect("registered");
        assert_eq!(slides.default_value[0]["image_filename"], json!("default.jpg"));
        Ok(())
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut reg = ConfigPropertyRegistry::new();
        reg.register(ConfigProperty::new("x", Schema::int(), "", json!(1))).expect("first");
        let err = reg.register(ConfigProperty::new("x", Schema::int(), "", json!(2))).unwrap_err();
        assert!(matches!(err, ServiceError::Registration(_)));
    }

    #[test]
    fn invalid_default_is_rejected() {
        let mut reg = ConfigPropertyRegistry::new();
        let err = reg.register(ConfigProperty::new("n", Schema::int(), "", json!("many"))).unwrap_err();
        assert!(matches!(err, ServiceError::Registration(_)));
        assert!(reg.is_empty());
    }

    #[test]
    fn unknown_validator_in_json_schema_fails_fast() {
        let mut reg = ConfigPropertyRegistry::new();
        let err = reg
            .register_json("n", &json!({"type": "int", "validators": [{"id": "is_even"}]}), "", json!(2))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Schema(objects::SchemaError::UnknownValidator(_))));
    }
}
