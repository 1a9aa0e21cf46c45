//! Batch driver: runs the pipeline over many topics and delivers each
//! article, isolating failures per topic.

use super::{Pipeline, publish_article};
use crate::clients::{ImageSearch, NewsSearch, Publisher, TextGenerator, VideoSearch};
use crate::outputs::json;
use futures::stream::{self, StreamExt};
use tracing::{error, info, instrument};

/// Where assembled articles go.
pub enum Delivery<'a, P> {
    /// Upload the image and create the post.
    Publish(&'a P),
    /// Write the article under this directory instead of publishing.
    DryRun(&'a str),
}

/// Outcome of a batch, one entry per topic in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<bool>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|ok| **ok).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.successful()
    }
}

/// Generate and deliver one topic. Every failure is logged and reported as
/// `false`; nothing propagates.
async fn process_topic<N, I, V, G, P>(
    pipeline: &Pipeline<'_, N, I, V, G>,
    delivery: &Delivery<'_, P>,
    index: usize,
    topic: &str,
) -> bool
where
    N: NewsSearch,
    I: ImageSearch,
    V: VideoSearch,
    G: TextGenerator,
    P: Publisher,
{
    let article = match pipeline.run(topic).await {
        Ok(article) => article,
        Err(e) => {
            error!(index, %topic, error = %e, "Pipeline failed; skipping topic");
            return false;
        }
    };

    match delivery {
        Delivery::DryRun(dir) => match json::write_article(&article, dir).await {
            Ok(path) => {
                info!(index, %topic, path = %path.display(), "Wrote dry-run article");
                true
            }
            Err(e) => {
                error!(index, %topic, error = %e, "Failed to write dry-run article");
                false
            }
        },
        Delivery::Publish(publisher) => match publish_article(*publisher, &article).await {
            Ok(post_id) => {
                info!(index, %topic, %post_id, title = %article.title, "Published article");
                true
            }
            Err(e) => {
                error!(index, %topic, error = %e, "Publishing failed; skipping topic");
                false
            }
        },
    }
}

/// Process `topics` with at most `concurrency` in flight.
#[instrument(level = "info", skip_all, fields(topics = topics.len(), concurrency = concurrency))]
pub async fn run_batch<N, I, V, G, P>(
    pipeline: &Pipeline<'_, N, I, V, G>,
    delivery: &Delivery<'_, P>,
    topics: &[String],
    concurrency: usize,
) -> BatchReport
where
    N: NewsSearch,
    I: ImageSearch,
    V: VideoSearch,
    G: TextGenerator,
    P: Publisher,
{
    let mut results: Vec<(usize, bool)> = stream::iter(topics.iter().enumerate())
        .map(|(i, topic)| async move { (i, process_topic(pipeline, delivery, i, topic).await) })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;
    results.sort_by_key(|(i, _)| *i);

    let report = BatchReport {
        outcomes: results.into_iter().map(|(_, ok)| ok).collect(),
    };
    info!(
        total = report.total(),
        successful = report.successful(),
        failed = report.failed(),
        "Completed topic processing"
    );
    report
}
