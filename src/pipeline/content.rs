//! Article body generation by chained completion rounds.
//!
//! The first round is prompted with the topic and the rendered facts. Every
//! following round is prompted with only the tail of the previous round's
//! output, which keeps the model anchored on its own continuation without
//! resending the whole body. Rounds are strictly sequential.
//!
//! Each round's output is trimmed and scrubbed of wrap-up phrases before it
//! is appended to the draft.

use crate::clients::{CompletionRequest, TextGenerator};
use crate::config::GenerationConfig;
use crate::error::Error;
use crate::models::Fact;
use crate::utils::{tail_chars, truncate_for_log};
use tracing::{debug, info, instrument};

/// Phrases removed from generated text wherever they appear.
pub const BANNED_PHRASES: [&str; 5] = [
    "In conclusion,",
    "Overall,",
    "In summary,",
    "To sum up,",
    "Thanks for reading,",
];

/// Remove every banned phrase from `text`.
///
/// Removal repeats until no phrase is left, so a phrase that only appears
/// once another has been cut out is removed too.
pub fn strip_banned_phrases(text: &str) -> String {
    let mut cleaned = text.to_string();
    while BANNED_PHRASES.iter().any(|p| cleaned.contains(p)) {
        for phrase in BANNED_PHRASES {
            cleaned = cleaned.replace(phrase, "");
        }
    }
    cleaned
}

/// Render facts as a Markdown list separated by blank lines.
pub fn render_facts(facts: &[Fact]) -> String {
    facts
        .iter()
        .map(Fact::to_markdown)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prompt for the first round.
pub fn initial_prompt(topic: &str, facts: &[Fact]) -> String {
    if facts.is_empty() {
        format!(
            "Write a 2-page long blog post about the trending technology topic: {topic}.\n\n---\n\n"
        )
    } else {
        format!(
            "Write a 2-page long blog post about the trending technology topic: {topic}. Include the following current facts:\n\n{}\n\n---\n\n",
            render_facts(facts)
        )
    }
}

/// Prompt for every round after the first.
pub fn continuation_prompt(topic: &str, previous_tail: &str) -> String {
    format!("Continue writing the blog post about {topic}:\n\n{previous_tail}\n\n---\n\n")
}

/// The body being accumulated for one topic.
#[derive(Debug, Default)]
pub struct ArticleDraft {
    body: String,
    last_chunk: String,
}

impl ArticleDraft {
    /// Clean a raw completion and append it to the body.
    pub fn push_chunk(&mut self, raw: &str) -> &str {
        let chunk = strip_banned_phrases(raw.trim());
        self.body.push_str(&chunk);
        // A phrase may straddle the seam between two clean chunks
        if BANNED_PHRASES.iter().any(|p| self.body.contains(p)) {
            self.body = strip_banned_phrases(&self.body);
        }
        self.last_chunk = chunk;
        &self.last_chunk
    }

    /// Consume the draft, returning the trimmed body.
    pub fn finish(self) -> String {
        self.body.trim().to_string()
    }
}

pub struct ContentSynthesizer<'a, G> {
    generator: &'a G,
    settings: &'a GenerationConfig,
}

impl<'a, G: TextGenerator> ContentSynthesizer<'a, G> {
    pub fn new(generator: &'a G, settings: &'a GenerationConfig) -> Self {
        Self {
            generator,
            settings,
        }
    }

    /// Generate the full article body for `topic`.
    #[instrument(level = "info", skip(self, facts), fields(facts = facts.len(), rounds = self.settings.rounds))]
    pub async fn synthesize(&self, topic: &str, facts: &[Fact]) -> Result<String, Error> {
        let mut draft = ArticleDraft::default();
        let mut prompt = initial_prompt(topic, facts);

        for round in 1..=self.settings.rounds {
            let request = CompletionRequest::new(
                &prompt,
                self.settings.content_max_tokens,
                self.settings.temperature,
            );
            let raw = self.generator.complete(&request).await?;
            let chunk = draft.push_chunk(&raw);
            debug!(
                round,
                chars = chunk.chars().count(),
                preview = %truncate_for_log(chunk, 120),
                "Generated chunk"
            );
            prompt = continuation_prompt(topic, tail_chars(chunk, self.settings.excerpt_chars));
        }

        let body = draft.finish();
        info!(chars = body.chars().count(), "Synthesized article body");
        Ok(body)
    }
}
