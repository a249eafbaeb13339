// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_SOURCES_PATH: &str = "DEALS_SOURCES_PATH";
pub const DEFAULT_REDDIT_URL: &str = "https://www.reddit.com/r/deals/hot.json";

/// Load the feed URL list from an explicit path. Supports TOML or JSON.
pub fn load_sources_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading source list from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Resolve the feed URL list:
/// 1) $DEALS_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) the r/deals hot feed
pub fn load_sources_default() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!("{ENV_SOURCES_PATH} points to non-existent path"));
        }
        return non_empty(load_sources_from(&pb)?);
    }
    for candidate in ["config/sources.toml", "config/sources.json"] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return non_empty(load_sources_from(&pb)?);
        }
    }
    Ok(vec![DEFAULT_REDDIT_URL.to_string()])
}

fn non_empty(v: Vec<String>) -> Result<Vec<String>> {
    if v.is_empty() {
        return Err(anyhow!("source list is empty"));
    }
    Ok(v)
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<String>> {
    if hint_ext == "json" {
        return parse_json(s);
    }
    if let Ok(v) = parse_toml(s) {
        return Ok(v);
    }
    parse_json(s).map_err(|_| anyhow!("unsupported source list format"))
}

fn parse_toml(s: &str) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct TomlSources {
        sources: Vec<String>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(clean_list(v.sources))
}

fn parse_json(s: &str) -> Result<Vec<String>> {
    let v: Vec<String> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

// Trim, drop blanks and repeats; first occurrence wins so fetch order is stable.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|x| x == t) {
            out.push(t.to_string());
        }
    }
    out
}
