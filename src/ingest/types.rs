// src/ingest/types.rs
use anyhow::Result;

/// Length of the normalized-title prefix used for in-run dedup.
pub const TITLE_KEY_LEN: usize = 50;
/// Titles longer than this are cut when a deal is built.
pub const MAX_TITLE_LEN: usize = 100;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Deal {
    pub title: String,
    pub price: String, // "$99.99" or the extractor's placeholder
    pub store: String,
    pub link: String,
    pub score: i64,
    pub image_url: Option<String>,
    pub discount: Option<String>, // e.g. "25%"
    pub source: String,           // provider name, e.g. "Reddit"
}

impl Deal {
    /// Lowercase, ASCII alphanumerics only, first 50 chars.
    pub fn title_key(&self) -> String {
        self.title
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .take(TITLE_KEY_LEN)
            .collect()
    }

    /// Store + truncated title; survives across runs in the history file.
    pub fn history_id(&self) -> String {
        let head: String = self.title.chars().take(TITLE_KEY_LEN).collect();
        format!("{}_{}", self.store, head)
    }
}

/// Cut a title to [`MAX_TITLE_LEN`] chars.
pub fn clip_title(title: &str) -> String {
    title.trim().chars().take(MAX_TITLE_LEN).collect()
}

#[async_trait::async_trait]
pub trait DealSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Deal>>;
    fn name(&self) -> &'static str;
}
