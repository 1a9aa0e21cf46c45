//! Unsplash image search client.
//!
//! Searches `GET /search/photos` with a `Client-ID` authorization header and
//! downloads the `regular` rendition of a hit.

use crate::clients::ImageSearch;
use crate::config::UnsplashConfig;
use crate::error::{Error, Service};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

pub struct UnsplashClient {
    http: Client,
    base_url: String,
    access_key: String,
}

impl UnsplashClient {
    pub fn new(http: Client, config: &UnsplashConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_key: config.access_key.clone(),
        }
    }
}

impl ImageSearch for UnsplashClient {
    #[instrument(level = "info", skip(self))]
    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<String>, Error> {
        let per_page = per_page.to_string();
        let url = Url::parse_with_params(
            &format!("{}/search/photos", self.base_url),
            &[("query", query), ("per_page", per_page.as_str())],
        )
        .map_err(|source| Error::Url {
            service: Service::Images,
            source,
        })?;
        debug!(%url, "Unsplash request");

        let response = self
            .http
            .get(url)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .send()
            .await
            .map_err(Error::request(Service::Images))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(Error::request(Service::Images))?;
        if !status.is_success() {
            return Err(Error::Status {
                service: Service::Images,
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let parsed: SearchResponse =
            serde_json::from_slice(&body).map_err(Error::decode(Service::Images))?;
        let urls: Vec<String> = parsed.results.into_iter().map(|p| p.urls.regular).collect();
        info!(count = urls.len(), "Searched images");
        Ok(urls)
    }

    #[instrument(level = "info", skip(self))]
    async fn download(&self, url: &str) -> Result<Vec<u8>, Error> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(Error::request(Service::Images))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                service: Service::Images,
                status,
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(Error::request(Service::Images))?;
        info!(bytes = bytes.len(), "Downloaded image");
        Ok(bytes.to_vec())
    }
}
