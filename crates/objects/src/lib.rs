//! Typed-object catalog.
//!
//! Each registered object type turns raw, decoded-JSON input into a validated canonical
//! value or rejects it. Most types are declared as a [`Schema`] interpreted by
//! [`normalize_against_schema`]; a few use hand-written structural checks instead.

pub mod errors;
pub mod schema;
pub mod validators;
pub mod normalize;
pub mod structural;
pub mod catalog;
pub mod types;
pub mod templates;

pub use catalog::{catalog, ObjectCatalog, ObjectKind, ObjectType};
pub use errors::{NormalizationError, ObjectError, SchemaError};
pub use normalize::normalize_against_schema;
pub use schema::{Kind, Property, Schema};
pub use validators::{PostNormalizer, Validator};
