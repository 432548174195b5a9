//! Lets two language models talk to each other.
//!
//! A [`Conversation`] alternates two model identifiers over a topic, handing
//! each turn to a [`ModelClient`]: either a local Ollama server
//! ([`OllamaClient`]) or an OpenAI-compatible chat API ([`OpenAIClient`]).

pub mod client;
pub mod config;
pub mod conversation;
pub mod transcript;

pub use client::{Error, ModelClient, OllamaClient, OllamaConfig, OpenAIClient, OpenAIConfig};
pub use conversation::{Conversation, DEFAULT_TURNS, have_conversation};
pub use transcript::{History, Interjection, Transcript};
