// src/ingest/providers/reddit.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::extract::{extract_price, extract_score_from_text, extract_store_from_url, unescape_url};
use crate::ingest::item_snippet;
use crate::ingest::types::{clip_title, Deal, DealSource};

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    score: Option<serde_json::Value>,
    #[serde(default)]
    promoted: Option<bool>,
    #[serde(default)]
    is_sponsored: Option<bool>,
    #[serde(default)]
    preview: Option<Preview>,
    #[serde(default)]
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Preview {
    #[serde(default)]
    images: Option<Vec<PreviewImage>>,
}

#[derive(Debug, Deserialize)]
struct PreviewImage {
    source: Option<ImageSource>,
}

#[derive(Debug, Deserialize)]
struct ImageSource {
    #[serde(default)]
    url: String,
}

impl Post {
    fn is_promoted(&self) -> bool {
        self.promoted.unwrap_or(false) || self.is_sponsored.unwrap_or(false)
    }

    fn score(&self) -> i64 {
        match &self.score {
            Some(serde_json::Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Some(serde_json::Value::String(s)) => extract_score_from_text(s),
            _ => 0,
        }
    }

    // High-res preview first, then an http(s) thumbnail.
    fn image_url(&self) -> Option<String> {
        let preview = self
            .preview
            .as_ref()
            .and_then(|p| p.images.as_ref()?.first())
            .and_then(|img| img.source.as_ref())
            .map(|src| unescape_url(&src.url))
            .filter(|u| !u.is_empty());
        if preview.is_some() {
            return preview;
        }
        self.thumbnail
            .as_deref()
            .filter(|t| t.starts_with("http"))
            .map(unescape_url)
    }
}

pub struct RedditProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RedditProvider {
    pub fn from_fixture(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    fn parse_listing(s: &str) -> Result<Vec<Deal>> {
        let listing: Listing = serde_json::from_str(s).context("parsing reddit listing json")?;

        let mut out = Vec::with_capacity(listing.data.children.len());
        for raw in listing.data.children {
            let child: Child = match serde_json::from_value(raw.clone()) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, item = %item_snippet(&raw), "skipping undecodable reddit item");
                    counter!("ingest_item_errors_total").increment(1);
                    continue;
                }
            };
            let post = child.data;

            if post.is_promoted() {
                tracing::debug!(title = %post.title, "skipping promoted post");
                counter!("ingest_promoted_skipped_total").increment(1);
                continue;
            }

            let link = unescape_url(&post.url);
            let deal = Deal {
                title: clip_title(&post.title),
                price: extract_price(&post.title),
                store: extract_store_from_url(&link),
                score: post.score(),
                image_url: post.image_url(),
                link,
                discount: None,
                source: "Reddit".to_string(),
            };
            tracing::debug!(title = %deal.title, price = %deal.price, score = deal.score, "reddit deal");
            out.push(deal);
        }
        Ok(out)
    }
}

#[async_trait]
impl DealSource for RedditProvider {
    async fn fetch_latest(&self) -> Result<Vec<Deal>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_listing(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url.as_str())
                    .send()
                    .await
                    .with_context(|| format!("reddit GET {url}"))?
                    .error_for_status()
                    .context("reddit non-2xx")?
                    .text()
                    .await
                    .context("reddit .text()")?;
                Self::parse_listing(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Reddit"
    }
}
