//! The per-topic content pipeline.
//!
//! For one topic the stages run strictly in order:
//!
//! 1. **Media**: first image and best video for the topic
//! 2. **Facts**: up to three relevance-ranked news articles
//! 3. **Content**: chained generation rounds grounded on the facts
//! 4. **Title**: derived from the topic and the opening of the body
//! 5. **Taxonomy**: tags and categories from the topic
//! 6. **Assembly**: embed video, attach image, build the [`Article`]
//!
//! A pipeline holds only shared references to clients and settings, so one
//! instance serves every topic of a run and no state leaks between topics.

use crate::clients::{ImageSearch, NewsSearch, Publisher, TextGenerator, VideoSearch};
use crate::config::GenerationConfig;
use crate::error::Error;
use crate::models::Article;
use tracing::{info, instrument};

pub mod assemble;
pub mod batch;
pub mod content;
pub mod facts;
pub mod media;
pub mod metadata;
pub mod topics;

use content::ContentSynthesizer;
use facts::FactsFetcher;
use media::MediaResolver;
use metadata::{TaxonomySynthesizer, TitleSynthesizer};

pub struct Pipeline<'a, N, I, V, G> {
    facts: FactsFetcher<'a, N>,
    media: MediaResolver<'a, I, V>,
    content: ContentSynthesizer<'a, G>,
    title: TitleSynthesizer<'a, G>,
    taxonomy: TaxonomySynthesizer<'a, G>,
}

impl<'a, N, I, V, G> Pipeline<'a, N, I, V, G>
where
    N: NewsSearch,
    I: ImageSearch,
    V: VideoSearch,
    G: TextGenerator,
{
    pub fn new(
        news: &'a N,
        images: &'a I,
        videos: &'a V,
        generator: &'a G,
        language: &'a str,
        facts_per_topic: u32,
        settings: &'a GenerationConfig,
    ) -> Self {
        Self {
            facts: FactsFetcher::new(news, language, facts_per_topic),
            media: MediaResolver::new(images, videos),
            content: ContentSynthesizer::new(generator, settings),
            title: TitleSynthesizer::new(generator, settings),
            taxonomy: TaxonomySynthesizer::new(generator, settings),
        }
    }

    /// Run every stage for `topic` and return the assembled article.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&self, topic: &str) -> Result<Article, Error> {
        let media = self.media.resolve(topic).await?;
        let facts = self.facts.fetch_facts(topic).await?;
        let body = self.content.synthesize(topic, &facts).await?;
        let title = self.title.synthesize_title(topic, &body).await?;
        let tags = self.taxonomy.synthesize_tags(topic).await?;
        let categories = self.taxonomy.synthesize_categories(topic).await?;

        let article = assemble::assemble(topic, body, media, title, tags, categories);
        info!(
            title = %article.title,
            has_image = article.image.is_some(),
            tags = article.tags.len(),
            categories = article.categories.len(),
            "Assembled article"
        );
        Ok(article)
    }
}

/// Upload the article's image, if any, then create the post.
///
/// Returns the new post id. If post creation fails after the image was
/// uploaded, the orphaned upload is left in place.
#[instrument(level = "info", skip_all, fields(topic = %article.topic))]
pub async fn publish_article<P: Publisher>(publisher: &P, article: &Article) -> Result<String, Error> {
    let thumbnail_id = match &article.image {
        Some(image) => Some(publisher.upload_image(image).await?),
        None => None,
    };
    publisher.publish(article, thumbnail_id.as_deref()).await
}
