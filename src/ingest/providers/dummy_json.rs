// src/ingest/providers/dummy_json.rs
//! Sample product feed, enabled with `USE_DUMMY_DATA` to exercise the whole
//! run without depending on Reddit.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::ingest::item_snippet;
use crate::ingest::types::{clip_title, Deal, DealSource};

pub const DEFAULT_DUMMY_URL: &str =
    "https://dummyjson.com/products?limit=10&sortBy=discountPercentage&order=desc";

#[derive(Debug, Deserialize)]
struct Products {
    #[serde(default)]
    products: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Product {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    price: f64,
    #[serde(default, rename = "discountPercentage")]
    discount_percentage: f64,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    rating: f64,
}

impl Product {
    fn into_deal(self) -> Deal {
        let sale = self.price * (1.0 - self.discount_percentage / 100.0);
        let discount = Some(format!("{:.0}%", self.discount_percentage));
        Deal {
            title: clip_title(&self.title),
            price: format!("${sale:.2}"),
            store: self
                .brand
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| "Online Store".to_string()),
            link: format!("https://dummyjson.com/products/{}", self.id),
            score: (self.rating * 20.0) as i64,
            image_url: self.thumbnail.filter(|t| t.starts_with("http")),
            discount,
            source: "DummyJSON".to_string(),
        }
    }
}

pub struct DummyJsonProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl DummyJsonProvider {
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

    fn parse_products(s: &str) -> Result<Vec<Deal>> {
        let parsed: Products = serde_json::from_str(s).context("parsing dummyjson products")?;

        let mut out = Vec::with_capacity(parsed.products.len());
        for raw in parsed.products {
            match serde_json::from_value::<Product>(raw.clone()) {
                Ok(p) => out.push(p.into_deal()),
                Err(e) => {
                    tracing::warn!(error = %e, item = %item_snippet(&raw), "skipping undecodable dummyjson product");
                    counter!("ingest_item_errors_total").increment(1);
                }
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl DealSource for DummyJsonProvider {
    async fn fetch_latest(&self) -> Result<Vec<Deal>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_products(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url.as_str())
                    .send()
                    .await
                    .context("dummyjson GET")?
                    .error_for_status()
                    .context("dummyjson non-2xx")?
                    .text()
                    .await
                    .context("dummyjson .text()")?;
                Self::parse_products(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "DummyJSON"
    }
}
