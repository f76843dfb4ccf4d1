use std::path::PathBuf;

use thiserror::Error;

/// Raw input rejected by a schema or a structural check.
///
/// `path` locates the offending subtree, e.g. `$[1].noteDuration.den`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason} (at {path})")]
pub struct NormalizationError {
    pub path: String,
    pub reason: String,
}

impl NormalizationError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { path: path.into(), reason: reason.into() }
    }
}

/// A declarative schema could not be built. These are configuration errors, never user input errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("unknown schema type '{0}'")]
    UnknownKind(String),
    #[error("unknown validator id '{0}'")]
    UnknownValidator(String),
    #[error("unknown post-normalizer id '{0}'")]
    UnknownPostNormalizer(String),
    #[error("'{id}' requires parameter '{param}'")]
    MissingParameter { id: String, param: String },
    #[error("malformed schema: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ObjectError {
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
    #[error("unknown object type '{0}'")]
    UnknownObjectType(String),
    #[error("object type '{0}' is already registered")]
    DuplicateObjectType(String),
    #[error("there is no editor template defined for objects of type {type_name}")]
    TemplateNotConfigured { type_name: String },
    #[error("cannot read template {path}: {source}")]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
