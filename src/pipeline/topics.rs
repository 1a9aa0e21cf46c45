//! Topic discovery from news headlines.

use crate::clients::NewsSearch;
use crate::error::Error;
use itertools::Itertools;
use tracing::{info, instrument};

/// Top headline titles of each source, in source order.
///
/// Blank titles are dropped, and a headline carried by several sources is
/// kept once.
#[instrument(level = "info", skip(news))]
pub async fn discover_topics<N: NewsSearch>(
    news: &N,
    sources: &[String],
    per_source: u32,
) -> Result<Vec<String>, Error> {
    let mut titles = Vec::new();
    for source in sources {
        let headlines = news.top_headlines(source, per_source).await?;
        info!(%source, count = headlines.len(), "Fetched headlines");
        titles.extend(headlines.into_iter().filter_map(|h| h.title));
    }

    let topics: Vec<String> = titles
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unique()
        .collect();
    info!(count = topics.len(), "Discovered topics");
    Ok(topics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeNews, news_article};
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_discover_topics_across_sources() {
        let mut headlines = HashMap::new();
        headlines.insert(
            "techcrunch".to_string(),
            vec![
                news_article(Some("AI Chips 2023"), Some("u1")),
                news_article(None, Some("u2")),
                news_article(Some("  "), Some("u3")),
            ],
        );
        headlines.insert(
            "the-verge".to_string(),
            vec![
                news_article(Some("AI Chips 2023"), Some("u4")),
                news_article(Some("Rust in the kernel"), Some("u5")),
            ],
        );
        let news = FakeNews {
            headlines,
            ..Default::default()
        };

        let topics = discover_topics(
            &news,
            &["techcrunch".to_string(), "the-verge".to_string()],
            5,
        )
        .await
        .unwrap();

        assert_eq!(topics, vec!["AI Chips 2023", "Rust in the kernel"]);
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let news = FakeNews {
            fail: true,
            ..Default::default()
        };
        let result = discover_topics(&news, &["techcrunch".to_string()], 5).await;
        assert!(result.is_err());
    }
}
