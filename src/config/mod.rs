// src/config/mod.rs
pub mod app;

pub use app::{build_http_client, env_flag, AppConfig, ThreadsCredentials};
