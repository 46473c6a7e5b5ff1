use std::env;

use watch_service_cli::summary::DEFAULT_MODEL;

/// Runtime configuration, collected from the environment once at startup and
/// passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    /// Allowed CORS origin; permissive when unset.
    pub client_url: Option<String>,
    /// Absent key degrades summaries to fallback text, nothing else.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://linkwatch.db".to_string()),
            client_url: env::var("CLIENT_URL").ok().filter(|v| !v.trim().is_empty()),
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }
}
