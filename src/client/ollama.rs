use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{DEFAULT_TIMEOUT, Error, ModelClient, http_client};
use crate::transcript::History;

pub const DEFAULT_HOST: &str = "http://localhost:11434";

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Passed through as the `options` object of every request.
    pub options: Option<Map<String, Value>>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_HOST.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            options: None,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a Map<String, Value>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Client for a local Ollama server's `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    options: Option<Map<String, Value>>,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self, Error> {
        let base_url = config.base_url.trim_end_matches('/').to_owned();
        Ok(Self {
            client: http_client(config.timeout)?,
            base_url,
            options: config.options,
        })
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn generate(&self, model: &str, history: &History<'_>) -> Result<String, Error> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model,
            prompt: history.prompt(),
            stream: false,
            options: self.options.as_ref(),
        };

        debug!(%url, model, turn = history.turn(), "Sending generate request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| Error::BackendUnavailable {
                url: self.base_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|error| error.error)
                .unwrap_or(body);
            return Err(Error::Generation(format!("Ollama returned {status}: {message}")));
        }

        let response: GenerateResponse = response.json().await.map_err(|error| {
            Error::Generation(format!("Failed to parse Ollama response: {error}"))
        })?;

        Ok(response.response)
    }
}
