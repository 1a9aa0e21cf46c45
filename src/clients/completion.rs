//! Text generation through an OpenAI-compatible completions API.
//!
//! Prompts are plain text (not chat messages) and each request carries its
//! own token budget and temperature, so the same client serves the long
//! article rounds and the short title and taxonomy prompts.
//!
//! Calls are not retried. Elapsed time is logged for every call.

use crate::clients::TextGenerator;
use crate::config::OpenAiConfig;
use crate::error::{Error, Service};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// One completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    pub max_tokens: u32,
    /// Number of completions to generate. Only the first is used.
    pub n: u32,
    pub temperature: f32,
    pub stop: Option<&'a str>,
}

impl<'a> CompletionRequest<'a> {
    /// A single completion with no stop sequence.
    pub fn new(prompt: &'a str, max_tokens: u32, temperature: f32) -> Self {
        Self {
            prompt,
            max_tokens,
            n: 1,
            temperature,
            stop: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    n: u32,
    temperature: f32,
    stop: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

pub struct OpenAiCompletions {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompletions {
    pub fn new(http: Client, config: &OpenAiConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn send(&self, request: &CompletionRequest<'_>) -> Result<String, Error> {
        let body = CompletionBody {
            model: &self.model,
            prompt: request.prompt,
            max_tokens: request.max_tokens,
            n: request.n,
            temperature: request.temperature,
            stop: request.stop,
        };

        let response = self
            .http
            .post(format!("{}/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Error::request(Service::TextGeneration))?;

        let status = response.status();
        let raw = response
            .bytes()
            .await
            .map_err(Error::request(Service::TextGeneration))?;
        if !status.is_success() {
            return Err(Error::Status {
                service: Service::TextGeneration,
                status,
                body: String::from_utf8_lossy(&raw).into_owned(),
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_slice(&raw).map_err(Error::decode(Service::TextGeneration))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| Error::Api {
                service: Service::TextGeneration,
                message: "response contained no choices".to_string(),
            })
    }
}

impl TextGenerator for OpenAiCompletions {
    #[instrument(level = "info", skip_all, fields(model = %self.model, max_tokens = request.max_tokens))]
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, Error> {
        let t0 = Instant::now();
        let res = self.send(request).await;
        let dt = t0.elapsed();

        match &res {
            Ok(text) => debug!(
                elapsed_ms = dt.as_millis() as u64,
                chars = text.chars().count(),
                "completion succeeded"
            ),
            Err(e) => warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "completion failed"),
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    fn client(server: &MockServer) -> OpenAiCompletions {
        OpenAiCompletions::new(
            Client::new(),
            &OpenAiConfig {
                api_key: "sk-test".to_string(),
                base_url: format!("{}/v1", server.uri()),
                model: "gpt-3.5-turbo-instruct".to_string(),
            },
        )
    }

    #[test]
    fn test_request_defaults() {
        let request = CompletionRequest::new("hello", 50, 0.7);
        assert_eq!(request.n, 1);
        assert_eq!(request.stop, None);
    }

    #[tokio::test]
    async fn test_complete_sends_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo-instruct",
                "prompt": "Say hi",
                "max_tokens": 3400,
                "n": 1,
                "stop": null
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cmpl-1",
                "object": "text_completion",
                "choices": [{"text": "\n\nHi there.", "index": 0, "finish_reason": "stop"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server)
            .complete(&CompletionRequest::new("Say hi", 3400, 0.7))
            .await
            .unwrap();
        assert_eq!(text, "\n\nHi there.");
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&CompletionRequest::new("x", 10, 0.7))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { service: Service::TextGeneration, .. }));
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&CompletionRequest::new("x", 10, 0.7))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { service: Service::TextGeneration, .. }));
    }
}
