// src/ingest/providers/mod.rs
pub mod dummy_json;
pub mod reddit;
