//! NewsAPI v2 client.
//!
//! Two endpoints are used:
//!
//! - `GET /everything` to find supporting facts for a topic
//! - `GET /top-headlines` to discover the topics themselves
//!
//! Authentication is an API key sent in the `X-Api-Key` header.

use crate::clients::NewsSearch;
use crate::config::NewsApiConfig;
use crate::error::{Error, Service};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::{Url, UrlQuery, form_urlencoded};

/// Ordering of `/everything` results. Facts only ever need relevance order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Relevancy,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevancy => "relevancy",
        }
    }
}

/// Parameters of an article search.
#[derive(Debug, Clone)]
pub struct ArticleQuery<'a> {
    pub query: &'a str,
    pub language: &'a str,
    pub sort_by: SortBy,
    pub page_size: u32,
}

/// One article as returned by NewsAPI. Title and url may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    status: String,
    #[serde(default)]
    articles: Vec<NewsArticle>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

pub struct NewsApiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(http: Client, config: &NewsApiConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn fetch<F>(&self, endpoint: &str, setup_query: F) -> Result<Vec<NewsArticle>, Error>
    where
        F: FnOnce(&mut form_urlencoded::Serializer<'_, UrlQuery<'_>>),
    {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, endpoint))
            .map_err(|source| Error::Url {
                service: Service::News,
                source,
            })?;
        setup_query(&mut url.query_pairs_mut());
        debug!(%url, "NewsAPI request");

        let response = self
            .http
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(Error::request(Service::News))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(Error::request(Service::News))?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ErrorResponse>(&body) {
                Ok(err) => Error::Api {
                    service: Service::News,
                    message: match err.code {
                        Some(code) => format!("{code}: {}", err.message),
                        None => err.message,
                    },
                },
                Err(_) => Error::Status {
                    service: Service::News,
                    status,
                    body: String::from_utf8_lossy(&body).into_owned(),
                },
            });
        }

        let parsed: ArticlesResponse =
            serde_json::from_slice(&body).map_err(Error::decode(Service::News))?;
        if parsed.status != "ok" {
            return Err(Error::Api {
                service: Service::News,
                message: parsed
                    .message
                    .unwrap_or_else(|| format!("status {}", parsed.status)),
            });
        }
        Ok(parsed.articles)
    }
}

impl NewsSearch for NewsApiClient {
    #[instrument(level = "info", skip_all, fields(query = %query.query))]
    async fn search_articles(&self, query: &ArticleQuery<'_>) -> Result<Vec<NewsArticle>, Error> {
        let articles = self
            .fetch("everything", |params| {
                params
                    .append_pair("q", query.query)
                    .append_pair("language", query.language)
                    .append_pair("sortBy", query.sort_by.as_str())
                    .append_pair("page", "1")
                    .append_pair("pageSize", &query.page_size.to_string());
            })
            .await?;
        info!(count = articles.len(), "Searched news articles");
        Ok(articles)
    }

    #[instrument(level = "info", skip(self))]
    async fn top_headlines(
        &self,
        source: &str,
        page_size: u32,
    ) -> Result<Vec<NewsArticle>, Error> {
        let articles = self
            .fetch("top-headlines", |params| {
                params
                    .append_pair("sources", source)
                    .append_pair("pageSize", &page_size.to_string());
            })
            .await?;
        info!(count = articles.len(), "Fetched top headlines");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    fn client(server: &MockServer) -> NewsApiClient {
        let config = NewsApiConfig {
            api_key: "test-key".to_string(),
            base_url: format!("{}/v2", server.uri()),
            language: "en".to_string(),
            headline_sources: vec!["techcrunch".to_string()],
            headlines_per_source: 5,
            facts_per_topic: 3,
        };
        NewsApiClient::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn test_search_articles_sends_query() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"title": "Qubits scale up", "url": "https://news.example/1", "source": {"id": null, "name": "Example"}},
                {"title": null, "url": "https://news.example/2"}
            ]
        });

        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "Quantum Computing"))
            .and(query_param("language", "en"))
            .and(query_param("sortBy", "relevancy"))
            .and(query_param("page", "1"))
            .and(query_param("pageSize", "3"))
            .and(header("X-Api-Key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let articles = client(&server)
            .search_articles(&ArticleQuery {
                query: "Quantum Computing",
                language: "en",
                sort_by: SortBy::Relevancy,
                page_size: 3,
            })
            .await
            .unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title.as_deref(), Some("Qubits scale up"));
        assert_eq!(articles[1].title, None);
    }

    #[tokio::test]
    async fn test_top_headlines() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "status": "ok",
            "articles": [
                {"title": "AI Chips 2023", "url": "https://techcrunch.example/a"},
                {"title": "Rust in the kernel", "url": "https://techcrunch.example/b"}
            ]
        });

        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(query_param("sources", "techcrunch"))
            .and(query_param("pageSize", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let articles = client(&server).top_headlines("techcrunch", 5).await.unwrap();
        let titles: Vec<_> = articles.iter().filter_map(|a| a.title.as_deref()).collect();
        assert_eq!(titles, vec!["AI Chips 2023", "Rust in the kernel"]);
    }

    #[tokio::test]
    async fn test_error_body_becomes_api_error() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid."
        });

        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .respond_with(ResponseTemplate::new(401).set_body_json(body))
            .mount(&server)
            .await;

        let err = client(&server).top_headlines("techcrunch", 5).await.unwrap_err();
        match err {
            Error::Api { service, message } => {
                assert_eq!(service, Service::News);
                assert_eq!(message, "apiKeyInvalid: Your API key is invalid.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_error_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client(&server)
            .search_articles(&ArticleQuery {
                query: "x",
                language: "en",
                sort_by: SortBy::Relevancy,
                page_size: 3,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { status, .. } if status.as_u16() == 502));
    }
}
