use std::time::Duration;

use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

use crate::clip_chars;

/// Upper bound on the extracted text kept from one page, in characters.
pub const MAX_CONTENT_LENGTH: usize = 3500;

const FETCH_TIMEOUT: Duration = Duration::from_secs(8);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Elements whose text is never page content.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "svg", "noscript", "head", "template",
];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL `{url}`: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("no visible text extracted from {url}")]
    EmptyContent { url: String },
}

pub struct PageFetcher {
    client: Client,
    max_content_length: usize,
}

impl PageFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_max_content_length(MAX_CONTENT_LENGTH)
    }

    pub fn with_max_content_length(max_content_length: usize) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            max_content_length,
        })
    }

    /// Fetch `url` and return the page's visible text, whitespace-collapsed
    /// and truncated to the configured length.
    pub async fn fetch_page_text(&self, url: &str) -> Result<String, FetchError> {
        let target = normalize_url(url)?;

        let response = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: target.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: target.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Request {
            url: target.to_string(),
            source,
        })?;

        let text = extract_visible_text(&body, self.max_content_length);
        tracing::debug!(url = %target, chars = text.chars().count(), "extracted page text");

        if text.is_empty() {
            return Err(FetchError::EmptyContent {
                url: target.to_string(),
            });
        }
        Ok(text)
    }
}

/// Parse `raw` into an absolute http(s) URL. Scheme-less input like
/// `example.com` gets an `https://` prefix.
pub fn normalize_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            message: "empty URL".to_string(),
        });
    }

    match Url::parse(trimmed) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(url),
        Ok(url) => Err(FetchError::InvalidUrl {
            url: trimmed.to_string(),
            message: format!("unsupported scheme `{}`", url.scheme()),
        }),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{trimmed}"))
            .map_err(|e| FetchError::InvalidUrl {
                url: trimmed.to_string(),
                message: e.to_string(),
            }),
        Err(e) => Err(FetchError::InvalidUrl {
            url: trimmed.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Extract visible text from an HTML document: text nodes outside
/// [`NOISE_TAGS`], whitespace collapsed to single spaces, truncated to
/// `max_chars`.
pub fn extract_visible_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").unwrap();

    let mut raw = String::new();
    let root = document
        .select(&body_selector)
        .next()
        .map(|el| *el)
        .unwrap_or_else(|| *document.root_element());

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let noisy = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| NOISE_TAGS.contains(&el.name()))
        });
        if noisy {
            continue;
        }
        raw.push_str(text);
        raw.push(' ');
    }

    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    clip_chars(&collapsed, max_chars).trim_end().to_string()
}
