//! Supporting facts for a topic, taken from a relevance-ranked news search.

use crate::clients::NewsSearch;
use crate::clients::news::{ArticleQuery, SortBy};
use crate::error::Error;
use crate::models::Fact;
use tracing::{debug, info, instrument};

pub struct FactsFetcher<'a, N> {
    news: &'a N,
    language: &'a str,
    limit: u32,
}

impl<'a, N: NewsSearch> FactsFetcher<'a, N> {
    pub fn new(news: &'a N, language: &'a str, limit: u32) -> Self {
        Self {
            news,
            language,
            limit,
        }
    }

    /// Fetch at most `limit` facts in relevance order.
    ///
    /// Articles without a title or url are dropped. An empty result is not
    /// an error; service failures propagate.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_facts(&self, topic: &str) -> Result<Vec<Fact>, Error> {
        let articles = self
            .news
            .search_articles(&ArticleQuery {
                query: topic,
                language: self.language,
                sort_by: SortBy::Relevancy,
                page_size: self.limit,
            })
            .await?;

        let facts: Vec<Fact> = articles
            .into_iter()
            .filter_map(|article| match (article.title, article.url) {
                (Some(title), Some(url)) if !title.is_empty() && !url.is_empty() => {
                    Some(Fact { title, url })
                }
                _ => None,
            })
            .take(self.limit as usize)
            .collect();

        info!(count = facts.len(), "Fetched facts");
        debug!(facts = ?facts, "Facts");
        Ok(facts)
    }
}
