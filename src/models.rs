//! Data models flowing through the publishing pipeline.
//!
//! - [`Fact`]: a supporting (title, url) pair found by news search
//! - [`MediaRefs`]: the image and video found for a topic, both optional
//! - [`ArticleImage`]: image bytes together with the filename used for upload
//! - [`Article`]: the publish-ready record produced once per topic
//!
//! A topic itself is a plain `&str`; it is never mutated once discovered.

use serde::{Deserialize, Serialize};

/// A supporting fact used as grounding context for text generation.
///
/// Facts keep the relevance order in which the news service returned them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Fact {
    /// Headline of the supporting news article.
    pub title: String,
    /// Link to the supporting news article.
    pub url: String,
}

impl Fact {
    /// Render the fact as a Markdown bullet with a source link.
    pub fn to_markdown(&self) -> String {
        format!("- {} ([source]({}))", self.title, self.url)
    }
}

/// Media found for a topic. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaRefs {
    /// Raw bytes of the first image search hit.
    pub image_bytes: Option<Vec<u8>>,
    /// Identifier of the best matching video.
    pub video_id: Option<String>,
}

/// An image ready to be uploaded alongside an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleImage {
    /// Upload filename derived from the topic, e.g. `AI_Chips_2023.jpg`.
    pub filename: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// A fully assembled article, handed to the publisher and then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    /// The topic this article was generated for.
    pub topic: String,
    pub title: String,
    /// Article body, prefixed with the video embed when a video was found.
    pub body: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    /// Featured image, if one was found.
    pub image: Option<ArticleImage>,
}
