use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::errors::{NormalizationError, ObjectError};
use crate::normalize::normalize_against_schema;
use crate::schema::Schema;
use crate::types;

/// How an object type turns raw input into its canonical value.
pub type NormalizeFn = fn(&ObjectType, &Value) -> Result<Value, NormalizationError>;

/// The built-in object types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Null,
    Boolean,
    Real,
    Int,
    UnicodeString,
    Html,
    NonnegativeInt,
    CodeEvaluation,
    CoordTwoDim,
    ListOfUnicodeString,
    SetOfUnicodeString,
    NormalizedString,
    MathLatexString,
    SanitizedUrl,
    MusicPhrase,
    Filepath,
    CheckedProof,
    LogicQuestion,
    LogicErrorCategory,
    Graph,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 20] = [
        ObjectKind::Null,
        ObjectKind::Boolean,
        ObjectKind::Real,
        ObjectKind::Int,
        ObjectKind::UnicodeString,
        ObjectKind::Html,
        ObjectKind::NonnegativeInt,
        ObjectKind::CodeEvaluation,
        ObjectKind::CoordTwoDim,
        ObjectKind::ListOfUnicodeString,
        ObjectKind::SetOfUnicodeString,
        ObjectKind::NormalizedString,
        ObjectKind::MathLatexString,
        ObjectKind::SanitizedUrl,
        ObjectKind::MusicPhrase,
        ObjectKind::Filepath,
        ObjectKind::CheckedProof,
        ObjectKind::LogicQuestion,
        ObjectKind::LogicErrorCategory,
        ObjectKind::Graph,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Null => "Null",
            ObjectKind::Boolean => "Boolean",
            ObjectKind::Real => "Real",
            ObjectKind::Int => "Int",
            ObjectKind::UnicodeString => "UnicodeString",
            ObjectKind::Html => "Html",
            ObjectKind::NonnegativeInt => "NonnegativeInt",
            ObjectKind::CodeEvaluation => "CodeEvaluation",
            ObjectKind::CoordTwoDim => "CoordTwoDim",
            ObjectKind::ListOfUnicodeString => "ListOfUnicodeString",
            ObjectKind::SetOfUnicodeString => "SetOfUnicodeString",
            ObjectKind::NormalizedString => "NormalizedString",
            ObjectKind::MathLatexString => "MathLatexString",
            ObjectKind::SanitizedUrl => "SanitizedUrl",
            ObjectKind::MusicPhrase => "MusicPhrase",
            ObjectKind::Filepath => "Filepath",
            ObjectKind::CheckedProof => "CheckedProof",
            ObjectKind::LogicQuestion => "LogicQuestion",
            ObjectKind::LogicErrorCategory => "LogicErrorCategory",
            ObjectKind::Graph => "Graph",
        }
    }

    pub fn definition(self) -> ObjectType {
        types::define(self)
    }
}

/// A named, immutable object type descriptor.
#[derive(Clone)]
pub struct ObjectType {
    pub name: &'static str,
    pub description: &'static str,
    /// `None` for types normalized by a structural validator.
    pub schema: Option<Schema>,
    pub edit_html_filename: Option<&'static str>,
    pub edit_js_filename: Option<&'static str>,
    normalize_fn: NormalizeFn,
}

impl std::fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectType")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("schema", &self.schema)
            .field("edit_html_filename", &self.edit_html_filename)
            .field("edit_js_filename", &self.edit_js_filename)
            .finish_non_exhaustive()
    }
}

impl ObjectType {
    /// A type normalized by interpreting `schema`.
    pub fn with_schema(name: &'static str, description: &'static str, schema: Schema) -> Self {
        Self {
            name,
            description,
            schema: Some(schema),
            edit_html_filename: None,
            edit_js_filename: None,
            normalize_fn: by_schema,
        }
    }

    /// A type normalized by a hand-written function.
    pub fn structural(name: &'static str, description: &'static str, normalize_fn: NormalizeFn) -> Self {
        Self { name, description, schema: None, edit_html_filename: None, edit_js_filename: None, normalize_fn }
    }

    pub fn with_editors(mut self, html: &'static str, js: &'static str) -> Self {
        self.edit_html_filename = Some(html);
        self.edit_js_filename = Some(js);
        self
    }

    pub fn normalized_by(mut self, normalize_fn: NormalizeFn) -> Self {
        self.normalize_fn = normalize_fn;
        self
    }

    pub fn normalize(&self, raw: &Value) -> Result<Value, NormalizationError> {
        (self.normalize_fn)(self, raw)
    }
}

/// Default normalizer: interpret the declared schema.
pub fn by_schema(object_type: &ObjectType, raw: &Value) -> Result<Value, NormalizationError> {
    match &object_type.schema {
        Some(schema) => normalize_against_schema(raw, schema),
        None => Err(NormalizationError::new("$", format!("object type {} declares no schema", object_type.name))),
    }
}

/// Registry of object types keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ObjectCatalog {
    types: Vec<ObjectType>,
    index: HashMap<&'static str, usize>,
}

static CATALOG: Lazy<ObjectCatalog> = Lazy::new(ObjectCatalog::builtin);

/// The process-wide catalog of built-in types.
pub fn catalog() -> &'static ObjectCatalog {
    &CATALOG
}

impl ObjectCatalog {
    pub fn builtin() -> Self {
        let types: Vec<ObjectType> = ObjectKind::ALL.into_iter().map(ObjectKind::definition).collect();
        let index = types.iter().enumerate().map(|(i, t)| (t.name, i)).collect();
        Self { types, index }
    }

    /// Add a type; names must be unique.
    pub fn register(&mut self, object_type: ObjectType) -> Result<(), ObjectError> {
        if self.index.contains_key(object_type.name) {
            return Err(ObjectError::DuplicateObjectType(object_type.name.to_string()));
        }
        self.index.insert(object_type.name, self.types.len());
        self.types.push(object_type);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&ObjectType, ObjectError> {
        self.index
            .get(name)
            .map(|&i| &self.types[i])
            .ok_or_else(|| ObjectError::UnknownObjectType(name.to_string()))
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.types.iter().map(|t| t.name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectType> {
        self.types.iter()
    }

    pub fn normalize(&self, name: &str, raw: &Value) -> Result<Value, ObjectError> {
        Ok(self.get(name)?.normalize(raw)?)
    }
}
