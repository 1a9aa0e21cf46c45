//! Runtime configuration loaded from a YAML file.
//!
//! The configuration is read once at startup and passed by reference into
//! every client and pipeline component. Nothing is stored in globals.
//!
//! # Example
//!
//! ```yaml
//! news_api:
//!   api_key: "..."
//!   headline_sources: [techcrunch, the-verge]
//! unsplash:
//!   access_key: "..."
//! youtube:
//!   api_key: "..."
//! openai:
//!   api_key: "..."
//! generation:
//!   rounds: 4
//! wordpress:
//!   xmlrpc_url: https://blog.example.com/xmlrpc.php
//!   username: editor
//!   password: "..."
//! ```

use crate::error::Error;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub news_api: NewsApiConfig,
    pub unsplash: UnsplashConfig,
    pub youtube: YouTubeConfig,
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Optional so that dry runs need no publishing credentials.
    #[serde(default)]
    pub wordpress: Option<WordPressConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// NewsAPI source ids whose top headlines become topics.
    #[serde(default = "default_headline_sources")]
    pub headline_sources: Vec<String>,
    #[serde(default = "default_headlines_per_source")]
    pub headlines_per_source: u32,
    #[serde(default = "default_facts_per_topic")]
    pub facts_per_topic: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashConfig {
    #[serde(default)]
    pub access_key: String,
    #[serde(default = "default_unsplash_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_youtube_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

/// Knobs of the text generation steps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of chained generation rounds for the article body.
    pub rounds: usize,
    pub content_max_tokens: u32,
    pub title_max_tokens: u32,
    pub taxonomy_max_tokens: u32,
    pub temperature: f32,
    /// Characters of context carried into continuation and title prompts.
    pub excerpt_chars: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            rounds: 4,
            content_max_tokens: 3400,
            title_max_tokens: 50,
            taxonomy_max_tokens: 50,
            temperature: 0.7,
            excerpt_chars: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WordPressConfig {
    /// Full URL of the site's `xmlrpc.php` endpoint.
    pub xmlrpc_url: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub blog_id: i64,
    #[serde(default = "default_post_status")]
    pub post_status: String,
}

fn default_news_base_url() -> String {
    "https://newsapi.org/v2".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_headline_sources() -> Vec<String> {
    vec!["techcrunch".to_string()]
}

fn default_headlines_per_source() -> u32 {
    5
}

fn default_facts_per_topic() -> u32 {
    3
}

fn default_unsplash_base_url() -> String {
    "https://api.unsplash.com".to_string()
}

fn default_youtube_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo-instruct".to_string()
}

fn default_post_status() -> String {
    "publish".to_string()
}

/// Credentials supplied outside the config file, usually from the environment.
#[derive(Debug, Default, Clone)]
pub struct CredentialOverrides {
    pub news_api_key: Option<String>,
    pub unsplash_access_key: Option<String>,
    pub youtube_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub wordpress_password: Option<String>,
}

impl Config {
    /// Parse a configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse the configuration file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml(&raw)?;
        info!(
            sources = ?config.news_api.headline_sources,
            rounds = config.generation.rounds,
            model = %config.openai.model,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Replace file credentials with the ones given on the command line or
    /// in the environment.
    pub fn apply_overrides(&mut self, overrides: CredentialOverrides) {
        if let Some(key) = overrides.news_api_key {
            self.news_api.api_key = key;
        }
        if let Some(key) = overrides.unsplash_access_key {
            self.unsplash.access_key = key;
        }
        if let Some(key) = overrides.youtube_api_key {
            self.youtube.api_key = key;
        }
        if let Some(key) = overrides.openai_api_key {
            self.openai.api_key = key;
        }
        if let (Some(password), Some(wordpress)) =
            (overrides.wordpress_password, self.wordpress.as_mut())
        {
            wordpress.password = password;
        }
    }

    /// Check that every credential needed for the run is present.
    pub fn validate(&self, publishing: bool) -> Result<(), Error> {
        let required = [
            ("news_api.api_key", &self.news_api.api_key),
            ("unsplash.access_key", &self.unsplash.access_key),
            ("youtube.api_key", &self.youtube.api_key),
            ("openai.api_key", &self.openai.api_key),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("missing {name}")));
            }
        }
        if self.generation.rounds == 0 {
            return Err(Error::Config("generation.rounds must be at least 1".to_string()));
        }
        if publishing {
            match &self.wordpress {
                None => {
                    return Err(Error::Config(
                        "wordpress section is required unless running a dry run".to_string(),
                    ));
                }
                Some(wp) if wp.password.is_empty() => {
                    return Err(Error::Config("missing wordpress.password".to_string()));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
