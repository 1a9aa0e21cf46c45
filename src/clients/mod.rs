//! Clients for the external services the pipeline talks to.
//!
//! Every collaborator sits behind a small async trait so the pipeline can be
//! exercised against in-memory fakes:
//!
//! | Trait | Client | Service |
//! |-------|--------|---------|
//! | [`NewsSearch`] | [`news::NewsApiClient`] | NewsAPI v2 |
//! | [`ImageSearch`] | [`images::UnsplashClient`] | Unsplash |
//! | [`VideoSearch`] | [`videos::YouTubeClient`] | YouTube Data API v3 |
//! | [`TextGenerator`] | [`completion::OpenAiCompletions`] | OpenAI completions |
//! | [`Publisher`] | [`wordpress::WordPressClient`] | WordPress XML-RPC |
//!
//! None of the clients retry, rate-limit or cache. A failed call surfaces as
//! an error to the caller, who decides whether to propagate or recover.

use crate::error::{Error, VideoServiceError};
use crate::models::{Article, ArticleImage};

pub mod completion;
pub mod images;
pub mod news;
pub mod videos;
pub mod wordpress;
pub mod xmlrpc;

pub use completion::CompletionRequest;
pub use news::{ArticleQuery, NewsArticle};

/// Search for news articles and headlines.
pub trait NewsSearch {
    /// Search all articles matching a free-text query.
    async fn search_articles(&self, query: &ArticleQuery<'_>) -> Result<Vec<NewsArticle>, Error>;

    /// Fetch the current top headlines of one source.
    async fn top_headlines(&self, source: &str, page_size: u32)
    -> Result<Vec<NewsArticle>, Error>;
}

/// Search for images and download them.
pub trait ImageSearch {
    /// Return the URLs of up to `per_page` images matching `query`.
    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<String>, Error>;

    /// Download the image at `url`.
    async fn download(&self, url: &str) -> Result<Vec<u8>, Error>;
}

/// Search for videos.
pub trait VideoSearch {
    /// Return the id of the best match, or `None` when nothing matched.
    async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
        kind: &str,
    ) -> Result<Option<String>, VideoServiceError>;
}

/// Generate text from a prompt.
pub trait TextGenerator {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, Error>;
}

/// Publish finished articles.
pub trait Publisher {
    /// Upload an image and return its attachment id.
    async fn upload_image(&self, image: &ArticleImage) -> Result<String, Error>;

    /// Create a post and return its id.
    async fn publish(&self, article: &Article, thumbnail_id: Option<&str>)
    -> Result<String, Error>;
}
