//! # Trend Press
//!
//! Turns trending technology headlines into long-form blog posts and
//! publishes them to WordPress.
//!
//! ## Usage
//!
//! ```sh
//! trend_press -c ./trend_press.yaml
//! trend_press --topic "AI Chips 2023" --dry-run-dir ./out
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: Top headlines of the configured news sources become topics
//! 2. **Pipeline**: For each topic, find media and facts, generate the body,
//!    title, tags and categories, then assemble an article
//! 3. **Output**: Upload the image and create the post, or write both to disk
//!    on a dry run
//!
//! A failing topic is logged and skipped; the rest of the batch carries on.

use clap::Parser;
use itertools::Itertools;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod clients;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
#[cfg(test)]
mod testing;
mod utils;

use cli::Cli;
use clients::completion::OpenAiCompletions;
use clients::images::UnsplashClient;
use clients::news::NewsApiClient;
use clients::videos::YouTubeClient;
use clients::wordpress::WordPressClient;
use config::Config;
use error::Error;
use pipeline::batch::{Delivery, run_batch};
use pipeline::{Pipeline, topics::discover_topics};
use utils::ensure_writable_dir;

const HTTP_TIMEOUT: Duration = Duration::from_secs(180);

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("trend_press starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(config = %args.config, topics = ?args.topics, dry_run_dir = ?args.dry_run_dir, "Parsed CLI arguments");

    // ---- Load config ----
    let mut config = Config::load(&args.config).await?;
    config.apply_overrides(args.credential_overrides());
    if let Some(rounds) = args.rounds {
        config.generation.rounds = rounds;
    }
    if let Err(e) = config.validate(args.dry_run_dir.is_none()) {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    // Early check: ensure the dry-run dir is writable before any API calls
    if let Some(dir) = &args.dry_run_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Dry-run directory is not writable");
            return Err(e);
        }
    }

    // ---- Clients ----
    let http = reqwest::Client::builder()
        .user_agent(concat!("trend_press/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let news = NewsApiClient::new(http.clone(), &config.news_api);
    let images = UnsplashClient::new(http.clone(), &config.unsplash);
    let videos = YouTubeClient::new(http.clone(), &config.youtube);
    let generator = OpenAiCompletions::new(http.clone(), &config.openai);
    let publisher = match (&args.dry_run_dir, &config.wordpress) {
        (None, Some(wordpress)) => Some(WordPressClient::new(http.clone(), wordpress)),
        _ => None,
    };

    // ---- Topics ----
    let topics: Vec<String> = if args.topics.is_empty() {
        discover_topics(
            &news,
            &config.news_api.headline_sources,
            config.news_api.headlines_per_source,
        )
        .await?
    } else {
        args.topics
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unique()
            .collect()
    };
    info!(count = topics.len(), "Topics to process");

    // ---- Run the pipeline per topic ----
    let pipeline = Pipeline::new(
        &news,
        &images,
        &videos,
        &generator,
        &config.news_api.language,
        config.news_api.facts_per_topic,
        &config.generation,
    );
    let delivery = match (&args.dry_run_dir, &publisher) {
        (Some(dir), _) => Delivery::DryRun(dir.as_str()),
        (None, Some(publisher)) => Delivery::Publish(publisher),
        (None, None) => {
            let e = Error::Config("wordpress section is required unless running a dry run".to_string());
            error!(error = %e, "No publisher configured");
            return Err(e.into());
        }
    };

    let report = run_batch(&pipeline, &delivery, &topics, usize::from(args.concurrency)).await;

    let elapsed = start_time.elapsed();
    info!(
        total = report.total(),
        successful = report.successful(),
        failed = report.failed(),
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
