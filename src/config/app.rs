// src/config/app.rs
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::history::DEFAULT_HISTORY_PATH;
use crate::ingest::config::load_sources_default;
use crate::publish::threads::DEFAULT_API_BASE;

pub const ENV_ACCESS_TOKEN: &str = "THREADS_ACCESS_TOKEN";
pub const ENV_USER_ID: &str = "THREADS_USER_ID";

const USER_AGENT: &str = "DealsBot/1.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadsCredentials {
    pub access_token: String,
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` only in dry-run mode.
    pub credentials: Option<ThreadsCredentials>,
    pub api_base: String,
    pub dry_run: bool,
    pub use_dummy_data: bool,
    pub enable_images: bool,
    pub check_rate_limits: bool,
    pub history_path: PathBuf,
    pub publish_delay: Duration,
    pub sources: Vec<String>,
}

/// Boolean toggle: `1/true/yes/on` (any case) is true, unset or blank falls back to `default`.
pub fn env_flag(name: &str, default: bool) -> bool {
    match env_non_empty(name) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Read configuration from the process environment (after `.env` is loaded).
    /// Fails when credentials are missing outside dry-run mode.
    pub fn from_env() -> Result<Self> {
        let dry_run = env_flag("DRY_RUN", false);

        let token = env_non_empty(ENV_ACCESS_TOKEN);
        let user_id = env_non_empty(ENV_USER_ID);
        let credentials = match (token, user_id) {
            (Some(access_token), Some(user_id)) => {
                if !user_id.chars().all(|c| c.is_ascii_digit()) {
                    bail!("{ENV_USER_ID} must be numeric");
                }
                Some(ThreadsCredentials {
                    access_token,
                    user_id,
                })
            }
            (token, user_id) => {
                if !dry_run {
                    let mut missing = Vec::new();
                    if token.is_none() {
                        missing.push(ENV_ACCESS_TOKEN);
                    }
                    if user_id.is_none() {
                        missing.push(ENV_USER_ID);
                    }
                    bail!(
                        "missing required environment variables: {}",
                        missing.join(", ")
                    );
                }
                None
            }
        };

        let publish_delay_ms: u64 = match env_non_empty("PUBLISH_DELAY_MS") {
            Some(v) => v.parse().context("PUBLISH_DELAY_MS must be an integer")?,
            None => 1_000,
        };

        Ok(Self {
            credentials,
            api_base: env_non_empty("THREADS_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            dry_run,
            use_dummy_data: env_flag("USE_DUMMY_DATA", false),
            enable_images: env_flag("ENABLE_IMAGES", true),
            check_rate_limits: env_flag("CHECK_RATE_LIMITS", true),
            history_path: env_non_empty("POSTED_DEALS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_PATH)),
            publish_delay: Duration::from_millis(publish_delay_ms),
            sources: load_sources_default()?,
        })
    }
}

/// One client per run, shared by sources and the publisher.
pub fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(15))
        .build()
        .context("building http client")
}
