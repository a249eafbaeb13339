//! deals-threads-poster: run-once entrypoint.
//! Meant to be scheduled (cron / Task Scheduler); exits 0 when the run
//! succeeded or had nothing new to post.

use std::process::ExitCode;

use deals_threads_poster::config::AppConfig;
use deals_threads_poster::{run, RunOutcome};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `LOG_FORMAT=json` for structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("deals_threads_poster=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local runs; missing file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    tracing::info!(
        started_at = %chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "starting deals poster"
    );

    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("configuration error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        dry_run = cfg.dry_run,
        sources = cfg.sources.len(),
        dummy_data = cfg.use_dummy_data,
        images = cfg.enable_images,
        history = %cfg.history_path.display(),
        "configuration loaded"
    );

    match run(&cfg).await {
        Ok(outcome) => {
            match &outcome {
                RunOutcome::NoDeals => tracing::warn!("run finished: no deals fetched"),
                RunOutcome::NoNewDeals => tracing::info!("run finished: nothing new"),
                RunOutcome::Posted { post_id, mode, deals } => {
                    tracing::info!(?post_id, mode, deals, "run finished: posted")
                }
                RunOutcome::PublishFailed(msg) => {
                    tracing::error!(error = %msg, "run finished: publish failed")
                }
            }
            if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!("unexpected error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
