//! Short single-shot generations: the title, tags and categories.

use crate::clients::{CompletionRequest, TextGenerator};
use crate::config::GenerationConfig;
use crate::error::Error;
use crate::utils::head_chars;
use tracing::{info, instrument};

/// Split a comma separated completion into trimmed, non-empty items.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn title_prompt(topic: &str, excerpt: &str) -> String {
    format!(
        "Generate a catchy and relevant title for a blog post about {topic}. The content of the blog post is:\n\n{excerpt}\n\n---\n\n"
    )
}

pub fn tags_prompt(topic: &str) -> String {
    format!("List 5 relevant tags for a blog post about {topic}, separated by commas:")
}

pub fn categories_prompt(topic: &str) -> String {
    format!("List 1-2 relevant categories for a blog post about {topic}, separated by commas:")
}

pub struct TitleSynthesizer<'a, G> {
    generator: &'a G,
    settings: &'a GenerationConfig,
}

impl<'a, G: TextGenerator> TitleSynthesizer<'a, G> {
    pub fn new(generator: &'a G, settings: &'a GenerationConfig) -> Self {
        Self {
            generator,
            settings,
        }
    }

    /// Title derived from the topic and the opening of the body.
    #[instrument(level = "info", skip(self, body))]
    pub async fn synthesize_title(&self, topic: &str, body: &str) -> Result<String, Error> {
        let prompt = title_prompt(topic, head_chars(body, self.settings.excerpt_chars));
        let request = CompletionRequest::new(
            &prompt,
            self.settings.title_max_tokens,
            self.settings.temperature,
        );
        let title = self.generator.complete(&request).await?.trim().to_string();
        info!(%title, "Synthesized title");
        Ok(title)
    }
}

pub struct TaxonomySynthesizer<'a, G> {
    generator: &'a G,
    settings: &'a GenerationConfig,
}

impl<'a, G: TextGenerator> TaxonomySynthesizer<'a, G> {
    pub fn new(generator: &'a G, settings: &'a GenerationConfig) -> Self {
        Self {
            generator,
            settings,
        }
    }

    async fn list(&self, prompt: &str) -> Result<Vec<String>, Error> {
        let request = CompletionRequest::new(
            prompt,
            self.settings.taxonomy_max_tokens,
            self.settings.temperature,
        );
        let text = self.generator.complete(&request).await?;
        Ok(split_list(&text))
    }

    #[instrument(level = "info", skip(self))]
    pub async fn synthesize_tags(&self, topic: &str) -> Result<Vec<String>, Error> {
        let tags = self.list(&tags_prompt(topic)).await?;
        info!(?tags, "Synthesized tags");
        Ok(tags)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn synthesize_categories(&self, topic: &str) -> Result<Vec<String>, Error> {
        let categories = self.list(&categories_prompt(topic)).await?;
        info!(?categories, "Synthesized categories");
        Ok(categories)
    }
}
