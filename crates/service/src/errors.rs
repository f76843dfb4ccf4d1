use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no config property with name {0} found")]
    UnknownProperty(String),
    #[error("validation error: {0}")]
    Validation(#[from] objects::NormalizationError),
    #[error("schema error: {0}")]
    Schema(#[from] objects::SchemaError),
    #[error("registration error: {0}")]
    Registration(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}
