//! Configuration properties: registry, persistence, cache and the service tying them together.

pub mod domain;
pub mod registry;
pub mod repository;
pub mod repo;
pub mod cache;
pub mod service;

pub use domain::{ConfigChangeRecord, ConfigProperty, PropertyCommit, PropertyRecord, PropertySummary};
pub use registry::ConfigPropertyRegistry;
pub use service::ConfigPropertyService;
