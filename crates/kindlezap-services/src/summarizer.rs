//! Text summarization through an OpenAI-compatible chat completions API.

use async_trait::async_trait;
use kindlezap_core::{Summary, SummaryConfig};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Returned whenever a summary cannot be produced.
pub const FALLBACK_SUMMARY: &str = "An error occurred while summarizing the text.";

const PROMPT_PREFIX: &str = "Give me a summary of this book: ";

/// Produces a short summary of document text. Never fails: problems yield [`FALLBACK_SUMMARY`].
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Summary;
}

#[derive(Debug, Error)]
enum SummaryError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error ({error_type}): {message} - Status: {status}")]
    Api {
        status: u16,
        error_type: String,
        message: String,
    },

    #[error("response contained no summary")]
    EmptyResponse,
}

pub struct OpenAiSummarizer {
    http_client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    max_chars: usize,
}

impl OpenAiSummarizer {
    pub fn new(config: &SummaryConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to create HTTP client for summaries, using default client");
                reqwest::Client::default()
            });

        Self {
            http_client,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_chars: config.max_chars,
        }
    }

    /// Prompt for `text`, truncated to the configured number of characters.
    pub fn prompt_for(&self, text: &str) -> String {
        format!("{}{}", PROMPT_PREFIX, truncate_chars(text, self.max_chars))
    }

    async fn request_summary(&self, prompt: String) -> Result<String, SummaryError> {
        let api_key = self.api_key.as_deref().ok_or(SummaryError::MissingApiKey)?;

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let (error_type, message) = parse_api_error(&error_text);
            return Err(SummaryError::Api {
                status: status.as_u16(),
                error_type,
                message,
            });
        }

        let chat_response: ChatCompletionResponse = response.json().await?;
        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(SummaryError::EmptyResponse)
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, text: &str) -> Summary {
        if text.trim().is_empty() {
            tracing::debug!("No text to summarize");
            return Summary::fallback(FALLBACK_SUMMARY);
        }

        tracing::debug!(model = %self.model, chars = text.chars().count(), "Requesting summary");
        match self.request_summary(self.prompt_for(text)).await {
            Ok(summary) => Summary::generated(summary),
            Err(e) => {
                tracing::warn!(error = %e, "Summarization failed, using fallback");
                Summary::fallback(FALLBACK_SUMMARY)
            }
        }
    }
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn parse_api_error(body: &str) -> (String, String) {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            let error = value.get("error")?;
            let message = error.get("message")?.as_str()?.to_string();
            let error_type = error
                .get("type")
                .and_then(|t| t.as_str())
                .unwrap_or("api_error")
                .to_string();
            Some((error_type, message))
        })
        .unwrap_or_else(|| ("api_error".to_string(), body.to_string()))
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
