use chrono::{DateTime, Utc};
use objects::{normalize_against_schema, NormalizationError, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CMD_CHANGE_PROPERTY_VALUE: &str = "change_property_value";

/// A registered configuration property (definition, not stored value).
#[derive(Debug, Clone)]
pub struct ConfigProperty {
    pub name: String,
    pub schema: Schema,
    pub description: String,
    pub default_value: Value,
}

impl ConfigProperty {
    pub fn new(name: impl Into<String>, schema: Schema, description: impl Into<String>, default_value: Value) -> Self {
        Self { name: name.into(), schema, description: description.into(), default_value }
    }

    /// Validate and canonicalize a candidate value.
    pub fn normalize(&self, value: &Value) -> Result<Value, NormalizationError> {
        normalize_against_schema(value, &self.schema)
    }
}

/// Audit entry appended on every value change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ConfigChangeRecord {
    ChangePropertyValue { new_value: Value },
}

impl ConfigChangeRecord {
    pub fn cmd(&self) -> &'static str {
        match self {
            ConfigChangeRecord::ChangePropertyValue { .. } => CMD_CHANGE_PROPERTY_VALUE,
        }
    }
}

/// Persisted state of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: String,
    pub value: Value,
    /// Zero until the first commit.
    pub version: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl PropertyRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), value: Value::Null, version: 0, last_updated: None }
    }
}

/// One committed change set in a property's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyCommit {
    pub property_id: String,
    pub version: u64,
    pub committer_id: String,
    pub changes: Vec<ConfigChangeRecord>,
    pub created_at: DateTime<Utc>,
}

/// Admin listing row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySummary {
    pub name: String,
    pub description: String,
    pub schema: Value,
    pub value: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn change_record_serializes_with_cmd_tag() {
        let rec = ConfigChangeRecord::ChangePropertyValue { new_value: json!(["a"]) };
        assert_eq!(serde_json::to_value(&rec).unwrap(), json!({"cmd": "change_property_value", "new_value": ["a"]}));
        assert_eq!(rec.cmd(), CMD_CHANGE_PROPERTY_VALUE);
    }

    #[test]
    fn property_normalizes_through_schema() {
        let p = ConfigProperty::new("flag", Schema::bool(), "A flag.", json!(false));
        assert_eq!(p.normalize(&json!(true)), Ok(json!(true)));
        assert!(p.normalize(&json!("yes")).is_err());
    }
}
