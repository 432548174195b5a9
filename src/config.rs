use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::client::{self, ModelClient, OllamaClient, OllamaConfig, OpenAIClient, OpenAIConfig};
use crate::conversation::{Conversation, DEFAULT_TURNS};

pub const DEFAULT_MODEL: &str = "llama2";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Ollama,
    OpenAI,
}

/// Settings read from the process environment (and `.env`, when loaded).
#[derive(Deserialize, Default)]
pub struct Environment {
    pub ollama_host: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
}

impl Environment {
    pub fn from_env() -> Result<Self> {
        envy::from_env().context("Failed to read configuration from the environment")
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub model_a: Option<String>,
    pub model_b: Option<String>,
    pub turns: Option<usize>,
    pub backend: Option<Backend>,
    pub ollama: OllamaSection,
    pub openai: OpenAISection,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct OllamaSection {
    pub host: Option<String>,
    pub timeout_secs: Option<u64>,
    pub options: Option<Map<String, Value>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct OpenAISection {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse config TOML")
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text)
    }

    /// Loads `explicit` if given, else the default config file if it exists.
    pub async fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path).await;
        }
        match default_config_path() {
            Some(path) if tokio::fs::try_exists(&path).await.unwrap_or(false) => {
                Self::load(&path).await
            }
            _ => Ok(Self::default()),
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("config.toml"))
}

/// Values given on the command line. They win over every other source.
#[derive(Debug, Default)]
pub struct Overrides {
    pub model_a: Option<String>,
    pub model_b: Option<String>,
    pub turns: Option<usize>,
    pub backend: Option<Backend>,
}

pub struct Settings {
    pub model_a: String,
    pub model_b: String,
    pub turns: usize,
    pub backend: Backend,
    pub ollama: OllamaConfig,
    pub openai_base_url: String,
    pub openai_timeout: Duration,
    openai_api_key: Option<String>,
}

impl Settings {
    /// Command line, then environment, then config file, then defaults.
    pub fn resolve(overrides: Overrides, environment: Environment, file: FileConfig) -> Self {
        let ollama_defaults = OllamaConfig::default();
        let ollama = OllamaConfig {
            base_url: environment
                .ollama_host
                .or(file.ollama.host)
                .unwrap_or(ollama_defaults.base_url),
            timeout: file
                .ollama
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(ollama_defaults.timeout),
            options: file.ollama.options,
        };

        Self {
            model_a: overrides
                .model_a
                .or(file.model_a)
                .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            model_b: overrides
                .model_b
                .or(file.model_b)
                .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            turns: overrides.turns.or(file.turns).unwrap_or(DEFAULT_TURNS),
            backend: overrides.backend.or(file.backend).unwrap_or_default(),
            ollama,
            openai_base_url: environment
                .openai_base_url
                .or(file.openai.base_url)
                .unwrap_or_else(|| client::openai::DEFAULT_BASE_URL.to_owned()),
            openai_timeout: file
                .openai
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(client::DEFAULT_TIMEOUT),
            openai_api_key: environment.openai_api_key,
        }
    }

    pub fn conversation(&self, topic: impl Into<String>) -> Conversation {
        Conversation::new(&self.model_a, &self.model_b, topic).with_turns(self.turns)
    }

    pub fn client(&self) -> Result<Box<dyn ModelClient>, client::Error> {
        let client: Box<dyn ModelClient> = match self.backend {
            Backend::Ollama => Box::new(OllamaClient::new(self.ollama.clone())?),
            Backend::OpenAI => Box::new(OpenAIClient::new(OpenAIConfig {
                api_key: self.openai_api_key.clone().unwrap_or_default(),
                base_url: self.openai_base_url.clone(),
                timeout: self.openai_timeout,
            })?),
        };
        Ok(client)
    }
}
