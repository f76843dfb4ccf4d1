//! Service layer for configuration properties.
//! - Normalizes values against each property's registered schema.
//! - Persists through a pluggable repository and mirrors values in a cache.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod config_property;
