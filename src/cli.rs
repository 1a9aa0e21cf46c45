//! Command-line interface definitions for Trend Press.
//!
//! All arguments can be provided via command-line flags; credentials and the
//! config path can also come from environment variables.

use crate::config::CredentialOverrides;
use clap::Parser;

/// Command-line arguments for the Trend Press application.
///
/// # Examples
///
/// ```sh
/// # Discover topics from headlines and publish to WordPress
/// trend_press -c ./trend_press.yaml
///
/// # Write two explicit topics to disk instead of publishing
/// trend_press --topic "AI Chips 2023" --topic "Rust in the kernel" --dry-run-dir ./out
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "TREND_PRESS_CONFIG", default_value = "trend_press.yaml")]
    pub config: String,

    /// Topic to write about; repeat for several. Skips headline discovery.
    #[arg(short, long = "topic")]
    pub topics: Vec<String>,

    /// Override the number of generation rounds per article
    #[arg(short, long)]
    pub rounds: Option<usize>,

    /// Write articles to this directory instead of publishing them
    #[arg(long)]
    pub dry_run_dir: Option<String>,

    /// Number of topics processed at the same time
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Unsplash access key
    #[arg(long, env = "UNSPLASH_ACCESS_KEY", hide_env_values = true)]
    pub unsplash_access_key: Option<String>,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// WordPress application password
    #[arg(long, env = "WORDPRESS_PASSWORD", hide_env_values = true)]
    pub wordpress_password: Option<String>,
}

impl Cli {
    /// Credentials given on the command line or in the environment.
    pub fn credential_overrides(&self) -> CredentialOverrides {
        CredentialOverrides {
            news_api_key: self.news_api_key.clone(),
            unsplash_access_key: self.unsplash_access_key.clone(),
            youtube_api_key: self.youtube_api_key.clone(),
            openai_api_key: self.openai_api_key.clone(),
            wordpress_password: self.wordpress_password.clone(),
        }
    }
}
