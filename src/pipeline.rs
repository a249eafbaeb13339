// src/pipeline.rs
//! One run: fetch → dedup → history filter → format → publish → save history.

use anyhow::{Context, Result};

use crate::config::{build_http_client, AppConfig};
use crate::format::render_post;
use crate::history::HistoryStore;
use crate::ingest::providers::{dummy_json::DummyJsonProvider, reddit::RedditProvider};
use crate::ingest::types::DealSource;
use crate::ingest::{dedup_by_title, fetch_all};
use crate::publish::threads::ThreadsPublisher;
use crate::publish::{DryRunPoster, Poster};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub enable_images: bool,
    pub check_rate_limits: bool,
    /// Write the history file after a successful publish.
    pub persist_history: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            enable_images: true,
            check_rate_limits: true,
            persist_history: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NoDeals,
    NoNewDeals,
    Posted {
        post_id: Option<String>,
        mode: &'static str,
        deals: usize,
    },
    /// The platform rejected a step; details were logged.
    PublishFailed(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, RunOutcome::PublishFailed(_))
    }
}

async fn log_quota(poster: &dyn Poster) {
    match poster.quota().await {
        Ok(Some(q)) if q.is_near_limit() => {
            tracing::warn!(usage = q.usage, total = q.total, "publishing quota nearly exhausted")
        }
        Ok(Some(q)) => tracing::info!(usage = q.usage, total = q.total, "publishing quota"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "could not read publishing quota"),
    }
}

/// Execute the whole pipeline once. History is only written after the post
/// is published, so a failed publish leaves the file as it was.
pub async fn run_once(
    sources: &[Box<dyn DealSource>],
    history: &mut HistoryStore,
    poster: &dyn Poster,
    opts: RunOptions,
) -> Result<RunOutcome> {
    let raw = fetch_all(sources).await;
    if raw.is_empty() {
        tracing::warn!("no deals fetched");
        return Ok(RunOutcome::NoDeals);
    }

    let ranked = dedup_by_title(raw);
    tracing::info!(unique = ranked.len(), "deduplicated deals");

    let fresh = history.filter_new(ranked);
    if fresh.is_empty() {
        tracing::info!("no new deals to post");
        return Ok(RunOutcome::NoNewDeals);
    }

    let post = render_post(&fresh);
    tracing::info!(
        chars = post.text.chars().count(),
        deals = post.deal_count,
        truncated = post.truncated,
        "post content:\n{}",
        post.text
    );

    let images: Vec<String> = if opts.enable_images {
        fresh[..post.shown_deals]
            .iter()
            .filter_map(|d| d.image_url.clone())
            .collect()
    } else {
        Vec::new()
    };

    if opts.check_rate_limits {
        log_quota(poster).await;
    }

    match poster.post(&post.text, &images).await {
        Ok(published) => {
            tracing::info!(poster = poster.name(), mode = published.mode, post_id = ?published.post_id, "posted deals");
            if opts.persist_history {
                history.save().await.context("saving history")?;
            }
            Ok(RunOutcome::Posted {
                post_id: published.post_id,
                mode: published.mode,
                deals: post.deal_count,
            })
        }
        Err(e) => {
            tracing::error!(poster = poster.name(), error = ?e, "failed to post deals");
            Ok(RunOutcome::PublishFailed(format!("{e:#}")))
        }
    }
}

/// Build sources, poster and history from configuration and run once.
pub async fn run(cfg: &AppConfig) -> Result<RunOutcome> {
    let client = build_http_client()?;

    let mut sources: Vec<Box<dyn DealSource>> = cfg
        .sources
        .iter()
        .map(|url| Box::new(RedditProvider::from_url(url.clone(), client.clone())) as Box<dyn DealSource>)
        .collect();
    if cfg.use_dummy_data {
        sources.push(Box::new(DummyJsonProvider::from_url(
            crate::ingest::providers::dummy_json::DEFAULT_DUMMY_URL,
            client.clone(),
        )));
    }

    let poster: Box<dyn Poster> = match (&cfg.credentials, cfg.dry_run) {
        (_, true) => Box::new(DryRunPoster),
        (Some(creds), false) => Box::new(
            ThreadsPublisher::new(client, creds.user_id.clone(), creds.access_token.clone())
                .with_api_base(cfg.api_base.clone())
                .with_publish_delay(cfg.publish_delay),
        ),
        (None, false) => anyhow::bail!("threads credentials are not configured"),
    };

    let mut history = HistoryStore::load(&cfg.history_path).await;
    let opts = RunOptions {
        enable_images: cfg.enable_images,
        check_rate_limits: cfg.check_rate_limits && !cfg.dry_run,
        persist_history: !cfg.dry_run,
    };

    run_once(&sources, &mut history, poster.as_ref(), opts).await
}
