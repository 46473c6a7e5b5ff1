//! Change summarization through the OpenAI chat-completions API.
//!
//! The public entry point is [`Summarizer::summarize`], which always resolves
//! to a non-empty string: every failure class maps to a fixed fallback text so
//! callers can persist the result unconditionally.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Inputs shorter than this (trimmed) are not worth a network call.
pub const MIN_SUMMARY_INPUT: usize = 12;

/// Canned response for inputs below [`MIN_SUMMARY_INPUT`].
pub const NO_CHANGES_RESPONSE: &str = "No significant changes to summarize.";

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const SUMMARY_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "You summarize website content changes clearly and concisely.";

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("API key rejected")]
    Unauthorized,

    #[error("account quota exhausted")]
    Quota,

    #[error("rate limited")]
    RateLimited,

    #[error("AI service error: {0}")]
    Api(String),

    #[error("could not reach AI service: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct Summarizer {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl Summarizer {
    /// Blank keys count as absent, matching how a missing env var behaves.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Summarize `input`, degrading to a fallback string on any failure.
    pub async fn summarize(&self, input: &str) -> String {
        if input.trim().chars().count() < MIN_SUMMARY_INPUT {
            return NO_CHANGES_RESPONSE.to_string();
        }
        match self.try_summarize(input).await {
            Ok(summary) => summary,
            Err(err) => {
                tracing::warn!(error = %err, "summarization degraded to fallback");
                fallback_for(&err)
            }
        }
    }

    /// Summarize `input`, surfacing the failure class instead of mapping it.
    pub async fn try_summarize(&self, input: &str) -> Result<String, SummaryError> {
        let api_key = self.api_key.as_deref().ok_or(SummaryError::MissingApiKey)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| SummaryError::Unauthorized)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let payload = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT,
                },
                {
                    "role": "user",
                    "content": format!(
                        "Here is the difference in content from a website. \
                         Summarize what changed:\n\n{input}"
                    ),
                }
            ],
        });

        let response = self
            .client
            .post(COMPLETIONS_URL)
            .timeout(SUMMARY_TIMEOUT)
            .headers(headers)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_api_failure(status, &body));
        }

        let result = response.json::<serde_json::Value>().await?;
        let content = result["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| SummaryError::Api("malformed completion response".to_string()))?;
        Ok(content.trim().to_string())
    }
}

fn classify_api_failure(status: StatusCode, body: &str) -> SummaryError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        SummaryError::Unauthorized
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        if body.contains("insufficient_quota") {
            SummaryError::Quota
        } else {
            SummaryError::RateLimited
        }
    } else {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {status}"));
        SummaryError::Api(message)
    }
}

/// The fixed fallback text for each failure class. This is the only place
/// errors turn into user-visible strings.
pub fn fallback_for(err: &SummaryError) -> String {
    match err {
        SummaryError::MissingApiKey => {
            "Summary unavailable: no API key configured.".to_string()
        }
        SummaryError::Unauthorized => "Summary unavailable: API key rejected.".to_string(),
        SummaryError::Quota => "Summary unavailable: account out of credits.".to_string(),
        SummaryError::RateLimited => {
            "Summary unavailable: rate limited, try again later.".to_string()
        }
        SummaryError::Api(message) => format!("Summary unavailable: AI error ({message})."),
        SummaryError::Http(_) => {
            "Summary unavailable: could not reach AI service.".to_string()
        }
    }
}
