use std::fmt::{self, Debug};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DEFAULT_TIMEOUT, Error, ModelClient, http_client};
use crate::transcript::History;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAIConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Debug for OpenAIConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    User,
    Assistant,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct Message<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for an OpenAI-compatible chat completions API.
pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl Debug for OpenAIClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAIClient {
    /// Fails with [`Error::Authentication`] when the API key is empty.
    pub fn new(config: OpenAIConfig) -> Result<Self, Error> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Authentication("no API key configured".to_owned()));
        }

        let base_url = config.base_url.trim_end_matches('/').to_owned();
        Ok(Self {
            client: http_client(config.timeout)?,
            api_key: config.api_key,
            base_url,
        })
    }
}

/// The topic as the opening user message, then the prior interjections with
/// the generating seat's own lines as the assistant.
fn messages<'a>(history: &History<'a>) -> Vec<Message<'a>> {
    let mut messages = Vec::with_capacity(history.turn() + 1);
    messages.push(Message {
        role: Role::User,
        content: history.topic(),
    });
    messages.extend(
        history
            .interjections()
            .iter()
            .enumerate()
            .map(|(index, interjection)| Message {
                role: if history.is_own(index) {
                    Role::Assistant
                } else {
                    Role::User
                },
                content: &interjection.words,
            }),
    );
    messages
}

fn provider_message(body: String) -> String {
    serde_json::from_str::<ErrorResponse>(&body)
        .map(|response| response.error.message)
        .unwrap_or(body)
}

#[async_trait]
impl ModelClient for OpenAIClient {
    async fn generate(&self, model: &str, history: &History<'_>) -> Result<String, Error> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model,
            messages: messages(history),
        };

        debug!(%url, model, turn = history.turn(), "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|source| Error::BackendUnavailable {
                url: self.base_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = provider_message(response.text().await.unwrap_or_default());
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(message),
                StatusCode::TOO_MANY_REQUESTS => Error::RateLimit(message),
                _ => Error::Generation(format!("provider returned {status}: {message}")),
            });
        }

        let response: ChatResponse = response.json().await.map_err(|error| {
            Error::Generation(format!("Failed to parse chat completion response: {error}"))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Generation("No choices in chat completion response".to_owned()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}
