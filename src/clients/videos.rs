//! YouTube Data API v3 search client.
//!
//! Every failure here is reported as a [`VideoServiceError`]. Callers treat
//! that as "no video" rather than as a reason to abort.

use crate::clients::VideoSearch;
use crate::config::YouTubeConfig;
use crate::error::VideoServiceError;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct YouTubeClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(http: Client, config: &YouTubeConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

impl VideoSearch for YouTubeClient {
    #[instrument(level = "info", skip(self))]
    async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
        kind: &str,
    ) -> Result<Option<String>, VideoServiceError> {
        let max_results = max_results.to_string();
        let url = Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[
                ("q", query),
                ("part", "id,snippet"),
                ("maxResults", max_results.as_str()),
                ("type", kind),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(VideoServiceError::Url)?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(VideoServiceError::Request)?;

        let status = response.status();
        let body = response.bytes().await.map_err(VideoServiceError::Request)?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(VideoServiceError::Http { status, message });
        }

        let parsed: SearchResponse =
            serde_json::from_slice(&body).map_err(VideoServiceError::Decode)?;
        let video_id = parsed.items.into_iter().next().and_then(|item| item.id.video_id);
        info!(found = video_id.is_some(), "Searched videos");
        Ok(video_id)
    }
}
