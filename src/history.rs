//! history.rs: persisted list of deals already published, so reruns never repost them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::ingest::types::Deal;

pub const DEFAULT_HISTORY_PATH: &str = "posted_deals.json";
pub const DEFAULT_HISTORY_CAP: usize = 100;

/// Bounded FIFO of composite deal identifiers (`store_title`), oldest first.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<String>,
    cap: usize,
}

impl HistoryStore {
    /// Read the history file. Missing or unreadable files start an empty history.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        Self::load_with_capacity(path, DEFAULT_HISTORY_CAP).await
    }

    pub async fn load_with_capacity(path: impl AsRef<Path>, cap: usize) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path).await {
            Ok(s) => serde_json::from_str::<Vec<String>>(&s).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "history file unreadable, starting empty");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        tracing::info!(path = %path.display(), loaded = entries.len(), "history loaded");
        Self {
            path,
            entries,
            cap: cap.max(1),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e == id)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&mut self, id: String) {
        self.entries.push(id);
    }

    /// Keep deals not seen before and remember each of them, in input order.
    /// Nothing touches disk until [`HistoryStore::save`].
    pub fn filter_new(&mut self, deals: Vec<Deal>) -> Vec<Deal> {
        let mut fresh = Vec::with_capacity(deals.len());
        for deal in deals {
            let id = deal.history_id();
            if self.contains(&id) {
                tracing::debug!(id = %id, "already posted");
                continue;
            }
            self.record(id);
            fresh.push(deal);
        }
        fresh
    }

    /// Evict the oldest entries beyond the cap, then overwrite the file.
    pub async fn save(&mut self) -> Result<()> {
        if self.entries.len() > self.cap {
            let excess = self.entries.len() - self.cap;
            self.entries.drain(0..excess);
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }

        let body = serde_json::to_vec_pretty(&self.entries).context("encoding history")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;

        tracing::info!(path = %self.path.display(), saved = self.entries.len(), "history saved");
        Ok(())
    }
}
