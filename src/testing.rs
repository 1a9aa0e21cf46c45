//! In-memory fakes of the service clients, shared by unit tests.

use crate::clients::{
    CompletionRequest, ImageSearch, NewsSearch, Publisher, TextGenerator, VideoSearch,
    news::{ArticleQuery, NewsArticle, SortBy},
};
use crate::error::{Error, Service, VideoServiceError};
use crate::models::{Article, ArticleImage};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub fn news_article(title: Option<&str>, url: Option<&str>) -> NewsArticle {
    NewsArticle {
        title: title.map(str::to_string),
        url: url.map(str::to_string),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub query: String,
    pub language: String,
    pub sort_by: SortBy,
    pub page_size: u32,
}

#[derive(Default)]
pub struct FakeNews {
    pub articles: Vec<NewsArticle>,
    pub headlines: HashMap<String, Vec<NewsArticle>>,
    pub fail: bool,
    pub queries: Mutex<Vec<RecordedQuery>>,
}

impl NewsSearch for FakeNews {
    async fn search_articles(&self, query: &ArticleQuery<'_>) -> Result<Vec<NewsArticle>, Error> {
        self.queries.lock().unwrap().push(RecordedQuery {
            query: query.query.to_string(),
            language: query.language.to_string(),
            sort_by: query.sort_by,
            page_size: query.page_size,
        });
        if self.fail {
            return Err(Error::Api {
                service: Service::News,
                message: "news is down".to_string(),
            });
        }
        Ok(self.articles.clone())
    }

    async fn top_headlines(
        &self,
        source: &str,
        _page_size: u32,
    ) -> Result<Vec<NewsArticle>, Error> {
        if self.fail {
            return Err(Error::Api {
                service: Service::News,
                message: "news is down".to_string(),
            });
        }
        Ok(self.headlines.get(source).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub urls: Vec<String>,
    pub bytes: Vec<u8>,
    pub searches: Mutex<Vec<(String, u32)>>,
    pub downloads: Mutex<Vec<String>>,
}

impl ImageSearch for FakeImages {
    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<String>, Error> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), per_page));
        Ok(self.urls.clone())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, Error> {
        self.downloads.lock().unwrap().push(url.to_string());
        Ok(self.bytes.clone())
    }
}

pub enum FakeVideos {
    Found(String),
    Nothing,
    Failing,
}

impl VideoSearch for FakeVideos {
    async fn search_videos(
        &self,
        _query: &str,
        max_results: u32,
        kind: &str,
    ) -> Result<Option<String>, VideoServiceError> {
        assert_eq!(max_results, 1);
        assert_eq!(kind, "video");
        match self {
            FakeVideos::Found(id) => Ok(Some(id.clone())),
            FakeVideos::Nothing => Ok(None),
            FakeVideos::Failing => Err(VideoServiceError::Http {
                status: reqwest::StatusCode::FORBIDDEN,
                message: "quotaExceeded".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCompletion {
    pub prompt: String,
    pub max_tokens: u32,
    pub n: u32,
    pub temperature: f32,
    pub stop: Option<String>,
}

/// Answers prompts from fixed routes (matched by prompt prefix) or, failing
/// that, from a queue of scripted responses. Prompts matching a failure
/// prefix are answered with an error.
#[derive(Default)]
pub struct ScriptedGenerator {
    routes: Vec<(String, String)>,
    failures: Vec<String>,
    queue: Mutex<VecDeque<String>>,
    pub requests: Mutex<Vec<RecordedCompletion>>,
}

impl ScriptedGenerator {
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: Mutex::new(responses.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn route(mut self, prompt_prefix: &str, response: &str) -> Self {
        self.routes
            .push((prompt_prefix.to_string(), response.to_string()));
        self
    }

    pub fn fail_on(mut self, prompt_prefix: &str) -> Self {
        self.failures.push(prompt_prefix.to_string());
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }
}

impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, Error> {
        self.requests.lock().unwrap().push(RecordedCompletion {
            prompt: request.prompt.to_string(),
            max_tokens: request.max_tokens,
            n: request.n,
            temperature: request.temperature,
            stop: request.stop.map(str::to_string),
        });

        if self
            .failures
            .iter()
            .any(|prefix| request.prompt.starts_with(prefix.as_str()))
        {
            return Err(Error::Status {
                service: Service::TextGeneration,
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "overloaded".to_string(),
            });
        }
        if let Some((_, response)) = self
            .routes
            .iter()
            .find(|(prefix, _)| request.prompt.starts_with(prefix.as_str()))
        {
            return Ok(response.clone());
        }
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Api {
                service: Service::TextGeneration,
                message: "script exhausted".to_string(),
            })
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub fail_publish: bool,
    /// Topics whose posts are refused.
    pub reject_topics: Vec<String>,
    pub uploads: Mutex<Vec<String>>,
    pub posts: Mutex<Vec<(String, Option<String>)>>,
}

impl Publisher for RecordingPublisher {
    async fn upload_image(&self, image: &ArticleImage) -> Result<String, Error> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(image.filename.clone());
        Ok(format!("media-{}", uploads.len()))
    }

    async fn publish(&self, article: &Article, thumbnail_id: Option<&str>) -> Result<String, Error> {
        if self.fail_publish || self.reject_topics.contains(&article.topic) {
            return Err(Error::Fault {
                code: 500,
                message: "database error".to_string(),
            });
        }
        let mut posts = self.posts.lock().unwrap();
        posts.push((article.title.clone(), thumbnail_id.map(str::to_string)));
        Ok(format!("post-{}", posts.len()))
    }
}
