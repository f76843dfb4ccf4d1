//! Declarative schema tree.
//!
//! A [`Schema`] is a tagged union over primitive kinds, lists and records, decorated with
//! optional choices, post-normalizers and validators. Schemas can be built in code or parsed
//! from the dictionary form (`{"type": "list", "items": {...}, "validators": [{"id": ...}]}`),
//! in which case every validator and post-normalizer id is resolved up front.

use serde_json::{json, Map, Value};

use crate::errors::SchemaError;
use crate::validators::{PostNormalizer, Validator};

#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    Bool,
    Int,
    Float,
    Unicode,
    Html,
    List { items: Box<Schema>, len: Option<usize> },
    Dict { properties: Vec<Property> },
}

impl Kind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Unicode => "unicode",
            Kind::Html => "html",
            Kind::List { .. } => "list",
            Kind::Dict { .. } => "dict",
        }
    }
}

/// A named field of a `dict` schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub description: Option<String>,
    pub schema: Schema,
}

impl Property {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self { name: name.into(), description: None, schema }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub kind: Kind,
    pub choices: Option<Vec<Value>>,
    pub post_normalizers: Vec<PostNormalizer>,
    pub validators: Vec<Validator>,
}

impl Schema {
    fn of(kind: Kind) -> Self {
        Self { kind, choices: None, post_normalizers: Vec::new(), validators: Vec::new() }
    }

    pub fn bool() -> Self { Self::of(Kind::Bool) }
    pub fn int() -> Self { Self::of(Kind::Int) }
    pub fn float() -> Self { Self::of(Kind::Float) }
    pub fn unicode() -> Self { Self::of(Kind::Unicode) }
    pub fn html() -> Self { Self::of(Kind::Html) }

    pub fn list(items: Schema) -> Self {
        Self::of(Kind::List { items: Box::new(items), len: None })
    }

    pub fn dict(properties: Vec<Property>) -> Self {
        Self::of(Kind::Dict { properties })
    }

    /// Fix the exact length of a list schema. No effect on other kinds.
    pub fn with_len(mut self, n: usize) -> Self {
        if let Kind::List { len, .. } = &mut self.kind {
            *len = Some(n);
        }
        self
    }

    pub fn with_choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_post_normalizer(mut self, normalizer: PostNormalizer) -> Self {
        self.post_normalizers.push(normalizer);
        self
    }

    /// Parse the dictionary form of a schema.
    ///
    /// `properties` may be either a list of `{name, schema, description?}` entries or a
    /// mapping from name to schema.
    pub fn from_json(raw: &Value) -> Result<Self, SchemaError> {
        let obj = raw
            .as_object()
            .ok_or_else(|| SchemaError::Malformed(format!("schema must be a mapping, got {raw}")))?;
        let type_name = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::Malformed("schema is missing 'type'".into()))?;

        let kind = match type_name {
            "bool" => Kind::Bool,
            "int" => Kind::Int,
            "float" => Kind::Float,
            "unicode" => Kind::Unicode,
            "html" => Kind::Html,
            "list" => {
                let items = obj
                    .get("items")
                    .ok_or_else(|| SchemaError::Malformed("list schema is missing 'items'".into()))?;
                let len = match obj.get("len") {
                    None => None,
                    Some(v) => Some(v.as_u64().ok_or_else(|| {
                        SchemaError::Malformed(format!("'len' must be a non-negative integer, got {v}"))
                    })? as usize),
                };
                Kind::List { items: Box::new(Schema::from_json(items)?), len }
            }
            "dict" => Kind::Dict { properties: parse_properties(obj.get("properties"))? },
            other => return Err(SchemaError::UnknownKind(other.to_string())),
        };

        let mut schema = Schema::of(kind);
        if let Some(choices) = obj.get("choices") {
            let list = choices
                .as_array()
                .ok_or_else(|| SchemaError::Malformed("'choices' must be a list".into()))?;
            schema.choices = Some(list.clone());
        }
        for spec in spec_list(obj, "post_normalizers")? {
            schema.post_normalizers.push(PostNormalizer::from_spec(spec)?);
        }
        for spec in spec_list(obj, "validators")? {
            schema.validators.push(Validator::from_spec(spec)?);
        }
        Ok(schema)
    }

    /// Render back to the dictionary form.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), json!(self.kind.type_name()));
        match &self.kind {
            Kind::List { items, len } => {
                out.insert("items".into(), items.to_json());
                if let Some(n) = len {
                    out.insert("len".into(), json!(n));
                }
            }
            Kind::Dict { properties } => {
                let props: Vec<Value> = properties
                    .iter()
                    .map(|p| {
                        let mut entry = Map::new();
                        entry.insert("name".into(), json!(p.name));
                        if let Some(d) = &p.description {
                            entry.insert("description".into(), json!(d));
                        }
                        entry.insert("schema".into(), p.schema.to_json());
                        Value::Object(entry)
                    })
                    .collect();
                out.insert("properties".into(), Value::Array(props));
            }
            _ => {}
        }
        if let Some(choices) = &self.choices {
            out.insert("choices".into(), Value::Array(choices.clone()));
        }
        if !self.post_normalizers.is_empty() {
            let specs = self.post_normalizers.iter().map(PostNormalizer::to_spec).collect();
            out.insert("post_normalizers".into(), Value::Array(specs));
        }
        if !self.validators.is_empty() {
            let specs = self.validators.iter().map(Validator::to_spec).collect();
            out.insert("validators".into(), Value::Array(specs));
        }
        Value::Object(out)
    }
}

fn spec_list<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<Vec<&'a Map<String, Value>>, SchemaError> {
    let Some(raw) = obj.get(key) else { return Ok(Vec::new()) };
    let list = raw
        .as_array()
        .ok_or_else(|| SchemaError::Malformed(format!("'{key}' must be a list")))?;
    list.iter()
        .map(|spec| {
            spec.as_object()
                .ok_or_else(|| SchemaError::Malformed(format!("entries of '{key}' must be mappings")))
        })
        .collect()
}

fn parse_properties(raw: Option<&Value>) -> Result<Vec<Property>, SchemaError> {
    match raw {
        None => Err(SchemaError::Malformed("dict schema is missing 'properties'".into())),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| {
                let name = entry
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| SchemaError::Malformed("dict property is missing 'name'".into()))?;
                let schema = entry
                    .get("schema")
                    .ok_or_else(|| SchemaError::Malformed(format!("dict property '{name}' is missing 'schema'")))?;
                let mut prop = Property::new(name, Schema::from_json(schema)?);
                if let Some(d) = entry.get("description").and_then(Value::as_str) {
                    prop = prop.describe(d);
                }
                Ok(prop)
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, schema)| Ok(Property::new(name.clone(), Schema::from_json(schema)?)))
            .collect(),
        Some(other) => Err(SchemaError::Malformed(format!("'properties' must be a list or mapping, got {other}"))),
    }
}
