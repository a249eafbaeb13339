// src/extract.rs
//! Pattern helpers that pull a price, a store name and a score out of free text.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Placeholder used when a title carries no recognizable price.
pub const DEFAULT_PRICE: &str = "See Deal";
/// Placeholder used when a link has no usable domain.
pub const DEFAULT_STORE: &str = "Various";

fn price_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\$[\d,]+\.?\d*").unwrap())
}

fn domain_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)https?://(?:www\.)?([^/?#]+)").unwrap())
}

fn digits_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// First dollar amount in `text` (e.g. `"$1,299.99"`), or [`DEFAULT_PRICE`].
pub fn extract_price(text: &str) -> String {
    price_re()
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_PRICE.to_string())
}

/// Store name from a URL: first label of the host, capitalized.
/// `https://www.amazon.com/dp/X` → `"Amazon"`.
pub fn extract_store_from_url(url: &str) -> String {
    let Some(host) = domain_re()
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    else {
        return DEFAULT_STORE.to_string();
    };

    let label = host.split('.').next().unwrap_or_default();
    if label.is_empty() {
        return DEFAULT_STORE.to_string();
    }
    capitalize(label)
}

/// First run of digits in `text`, or 0.
pub fn extract_score_from_text(text: &str) -> i64 {
    digits_re()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Decode HTML entities that feeds leave in URLs (`&amp;` → `&`).
pub fn unescape_url(url: &str) -> String {
    html_escape::decode_html_entities(url).trim().to_string()
}

// Python-style capitalize: first char upper, rest lower.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
