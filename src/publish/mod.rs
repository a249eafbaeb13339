// src/publish/mod.rs
pub mod threads;

use anyhow::Result;

/// Threads accepts at most this many children in one carousel.
pub const MAX_CAROUSEL_ITEMS: usize = 20;

/// How a post is submitted, chosen from the available image URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostMode {
    Text,
    SingleImage(String),
    Carousel(Vec<String>),
}

impl PostMode {
    /// 0 images → text, 1 → single image, 2..=20 → carousel.
    /// Blank URLs are ignored and anything past the carousel cap is dropped.
    pub fn select(images: &[String]) -> Self {
        let mut urls: Vec<String> = images
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect();

        if urls.len() > MAX_CAROUSEL_ITEMS {
            tracing::warn!(
                given = urls.len(),
                max = MAX_CAROUSEL_ITEMS,
                "too many images for a carousel, truncating"
            );
            urls.truncate(MAX_CAROUSEL_ITEMS);
        }

        match urls.len() {
            0 => PostMode::Text,
            1 => PostMode::SingleImage(urls.remove(0)),
            _ => PostMode::Carousel(urls),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostMode::Text => "text",
            PostMode::SingleImage(_) => "image",
            PostMode::Carousel(_) => "carousel",
        }
    }
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// Platform post id; `None` for dry runs.
    pub post_id: Option<String>,
    pub mode: &'static str,
}

/// Self-reported publishing quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub usage: u64,
    pub total: u64,
}

impl QuotaStatus {
    /// At or above 90% of the quota.
    pub fn is_near_limit(&self) -> bool {
        self.total > 0 && self.usage.saturating_mul(10) >= self.total.saturating_mul(9)
    }
}

#[async_trait::async_trait]
pub trait Poster: Send + Sync {
    async fn post(&self, text: &str, images: &[String]) -> Result<Published>;

    /// Advisory only; posters without a quota API report nothing.
    async fn quota(&self) -> Result<Option<QuotaStatus>> {
        Ok(None)
    }

    fn name(&self) -> &'static str;
}

/// Logs the post instead of sending it.
pub struct DryRunPoster;

#[async_trait::async_trait]
impl Poster for DryRunPoster {
    async fn post(&self, text: &str, images: &[String]) -> Result<Published> {
        let mode = PostMode::select(images);
        tracing::info!(
            mode = mode.label(),
            images = images.len(),
            chars = text.chars().count(),
            "dry run, not publishing:\n{text}"
        );
        Ok(Published {
            post_id: None,
            mode: mode.label(),
        })
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://i.redd.it/{i}.jpg")).collect()
    }

    #[test]
    fn mode_follows_image_count() {
        assert_eq!(PostMode::select(&[]), PostMode::Text);
        assert_eq!(
            PostMode::select(&urls(1)),
            PostMode::SingleImage("https://i.redd.it/0.jpg".into())
        );
        assert!(matches!(PostMode::select(&urls(2)), PostMode::Carousel(v) if v.len() == 2));
        assert!(matches!(PostMode::select(&urls(20)), PostMode::Carousel(v) if v.len() == 20));
    }

    #[test]
    fn oversized_carousel_is_clamped() {
        match PostMode::select(&urls(25)) {
            PostMode::Carousel(v) => {
                assert_eq!(v.len(), MAX_CAROUSEL_ITEMS);
                assert_eq!(v[19], "https://i.redd.it/19.jpg");
            }
            other => panic!("expected carousel, got {other:?}"),
        }
    }

    #[test]
    fn blank_urls_do_not_count() {
        let imgs = vec!["".to_string(), "  ".into(), "https://a/1.jpg".into()];
        assert_eq!(
            PostMode::select(&imgs),
            PostMode::SingleImage("https://a/1.jpg".into())
        );
    }

    #[test]
    fn quota_threshold() {
        assert!(!QuotaStatus { usage: 224, total: 250 }.is_near_limit());
        assert!(QuotaStatus { usage: 225, total: 250 }.is_near_limit());
        assert!(!QuotaStatus { usage: 5, total: 0 }.is_near_limit());
        assert!(QuotaStatus { usage: u64::MAX, total: u64::MAX }.is_near_limit());
        assert!(!QuotaStatus { usage: 1, total: u64::MAX }.is_near_limit());
    }

    #[tokio::test]
    async fn dry_run_reports_mode_without_id() {
        let out = DryRunPoster.post("hello", &urls(3)).await.unwrap();
        assert_eq!(out.post_id, None);
        assert_eq!(out.mode, "carousel");
    }
}
