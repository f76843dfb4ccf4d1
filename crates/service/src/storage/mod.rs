//! Storage abstractions for service layer
//!
//! Contains reusable file-backed stores shared by repositories that persist
//! small maps as JSON.

pub mod json_map_store;
