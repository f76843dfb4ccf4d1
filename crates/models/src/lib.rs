//! Persistence entities for configuration properties and their audit log.

pub mod errors;
pub mod db;
pub mod config_property;
pub mod config_property_commit;
