// src/publish/threads.rs
//! Threads Graph API: create a container, wait, publish it.

use anyhow::{anyhow, bail, Context, Result};
use futures::future::join_all;
use metrics::counter;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

use super::{PostMode, Poster, Published, QuotaStatus};

pub const DEFAULT_API_BASE: &str = "https://graph.threads.net/v1.0";

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct LimitResponse {
    #[serde(default)]
    data: Vec<LimitEntry>,
}

#[derive(Debug, Deserialize)]
struct LimitEntry {
    #[serde(default)]
    quota_usage: u64,
    config: Option<LimitConfig>,
}

#[derive(Debug, Deserialize)]
struct LimitConfig {
    #[serde(default)]
    quota_total: u64,
}

#[derive(Clone)]
pub struct ThreadsPublisher {
    client: Client,
    api_base: String,
    user_id: String,
    access_token: String,
    publish_delay: Duration,
}

impl ThreadsPublisher {
    pub fn new(client: Client, user_id: String, access_token: String) -> Self {
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            user_id,
            access_token,
            publish_delay: Duration::from_secs(1),
        }
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Pause between container creation and publish; the platform processes
    /// containers asynchronously.
    pub fn with_publish_delay(mut self, delay: Duration) -> Self {
        self.publish_delay = delay;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.api_base, self.user_id, path)
    }

    /// Send a request that answers `{"id": ...}`; any other answer is an error
    /// carrying the status and body.
    async fn send_for_id(&self, req: RequestBuilder, step: &'static str) -> Result<String> {
        let rsp = req
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("threads {step}: request failed"))?;
        let status = rsp.status();
        let body = rsp
            .text()
            .await
            .with_context(|| format!("threads {step}: reading body"))?;

        if !status.is_success() {
            tracing::error!(step, %status, body = %body, "threads api call failed");
            bail!("threads {step}: HTTP {status}: {body}");
        }

        let parsed: IdResponse = serde_json::from_str(&body)
            .with_context(|| format!("threads {step}: unexpected body: {body}"))?;
        let id = match parsed.id {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                tracing::error!(step, body = %body, "threads response has no id");
                return Err(anyhow!("threads {step}: no id in response: {body}"));
            }
        };
        Ok(id)
    }

    async fn create_container(&self, params: &[(&str, &str)], step: &'static str) -> Result<String> {
        let req = self.client.post(self.endpoint("threads")).query(params);
        let id = self.send_for_id(req, step).await?;
        tracing::info!(step, container_id = %id, "container created");
        Ok(id)
    }

    pub async fn create_text_container(&self, text: &str) -> Result<String> {
        self.create_container(&[("media_type", "TEXT"), ("text", text)], "create text container")
            .await
    }

    pub async fn create_image_container(&self, text: &str, image_url: &str) -> Result<String> {
        self.create_container(
            &[("media_type", "IMAGE"), ("image_url", image_url), ("text", text)],
            "create image container",
        )
        .await
    }

    pub async fn create_carousel_item(&self, image_url: &str) -> Result<String> {
        self.create_container(
            &[
                ("media_type", "IMAGE"),
                ("image_url", image_url),
                ("is_carousel_item", "true"),
            ],
            "create carousel item",
        )
        .await
    }

    pub async fn create_carousel_container(&self, text: &str, children: &[String]) -> Result<String> {
        let joined = children.join(",");
        self.create_container(
            &[("media_type", "CAROUSEL"), ("children", joined.as_str()), ("text", text)],
            "create carousel container",
        )
        .await
    }

    pub async fn publish_container(&self, container_id: &str) -> Result<String> {
        let req = self
            .client
            .post(self.endpoint("threads_publish"))
            .query(&[("creation_id", container_id)]);
        let id = self.send_for_id(req, "publish").await?;
        tracing::info!(post_id = %id, "post published");
        Ok(id)
    }

    /// Create every child concurrently; failed children are dropped, order kept.
    /// Returns (image_url, container_id) pairs.
    async fn create_carousel_items(&self, urls: &[String]) -> Vec<(String, String)> {
        let results = join_all(urls.iter().map(|u| self.create_carousel_item(u))).await;

        let mut ok = Vec::with_capacity(urls.len());
        for (idx, (url, res)) in urls.iter().zip(results).enumerate() {
            match res {
                Ok(id) => ok.push((url.clone(), id)),
                Err(e) => {
                    tracing::warn!(item = idx + 1, url = %url, error = %e, "carousel item dropped");
                    counter!("publish_carousel_items_dropped_total").increment(1);
                }
            }
        }
        ok
    }

    /// Build the container for `mode`, degrading a carousel that lost
    /// children to a single image (one left) or text (none left).
    async fn create_for_mode(&self, text: &str, mode: PostMode) -> Result<(String, &'static str)> {
        match mode {
            PostMode::Text => Ok((self.create_text_container(text).await?, "text")),
            PostMode::SingleImage(url) => {
                Ok((self.create_image_container(text, &url).await?, "image"))
            }
            PostMode::Carousel(urls) => {
                let mut items = self.create_carousel_items(&urls).await;
                match items.len() {
                    0 => {
                        tracing::warn!("no carousel items survived, posting text only");
                        Ok((self.create_text_container(text).await?, "text"))
                    }
                    1 => {
                        let (url, _) = items.remove(0);
                        tracing::warn!(url = %url, "one carousel item survived, posting single image");
                        Ok((self.create_image_container(text, &url).await?, "image"))
                    }
                    n => {
                        let ids: Vec<String> = items.into_iter().map(|(_, id)| id).collect();
                        tracing::info!(items = n, "creating carousel");
                        Ok((self.create_carousel_container(text, &ids).await?, "carousel"))
                    }
                }
            }
        }
    }

    async fn post_inner(&self, text: &str, images: &[String]) -> Result<Published> {
        let mode = PostMode::select(images);
        tracing::info!(mode = mode.label(), chars = text.chars().count(), "posting to threads");

        let (container_id, mode) = self.create_for_mode(text, mode).await?;
        tokio::time::sleep(self.publish_delay).await;
        let post_id = self.publish_container(&container_id).await?;

        Ok(Published {
            post_id: Some(post_id),
            mode,
        })
    }
}

#[async_trait::async_trait]
impl Poster for ThreadsPublisher {
    async fn post(&self, text: &str, images: &[String]) -> Result<Published> {
        counter!("publish_attempts_total").increment(1);
        match self.post_inner(text, images).await {
            Ok(p) => {
                counter!("publish_success_total").increment(1);
                Ok(p)
            }
            Err(e) => {
                counter!("publish_failures_total").increment(1);
                Err(e)
            }
        }
    }

    async fn quota(&self) -> Result<Option<QuotaStatus>> {
        let rsp = self
            .client
            .get(self.endpoint("threads_publishing_limit"))
            .query(&[("fields", "quota_usage,config")])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("threads publishing_limit request")?
            .error_for_status()
            .context("threads publishing_limit non-2xx")?;
        let parsed: LimitResponse = rsp
            .json()
            .await
            .context("threads publishing_limit body")?;

        Ok(parsed.data.into_iter().next().map(|e| QuotaStatus {
            usage: e.quota_usage,
            total: e.config.map(|c| c.quota_total).unwrap_or(0),
        }))
    }

    fn name(&self) -> &'static str {
        "threads"
    }
}
