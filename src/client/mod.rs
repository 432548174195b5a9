pub mod ollama;
pub mod openai;

use std::time::Duration;

use async_trait::async_trait;

use crate::transcript::History;

pub use ollama::{OllamaClient, OllamaConfig};
pub use openai::{OpenAIClient, OpenAIConfig};

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("backend at {url} is unavailable")]
    BackendUnavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("rate limited by provider: {0}")]
    RateLimit(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("failed to set up the HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

/// A backend able to produce the next message of a conversation.
///
/// Every call is one round trip to the backend. Implementations never retry.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, model: &str, history: &History<'_>) -> Result<String, Error>;
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(Error::HttpClient)
}
