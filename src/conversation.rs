use tracing::{debug, warn};

use crate::client::{Error, ModelClient};
use crate::transcript::{History, Transcript};

pub const DEFAULT_TURNS: usize = 4;

/// Two models taking turns on a topic, model A speaking first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub model_a: String,
    pub model_b: String,
    pub topic: String,
    pub turns: usize,
}

impl Conversation {
    pub fn new(
        model_a: impl Into<String>,
        model_b: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            model_a: model_a.into(),
            model_b: model_b.into(),
            topic: topic.into(),
            turns: DEFAULT_TURNS,
        }
    }

    pub fn with_turns(mut self, turns: usize) -> Self {
        self.turns = turns;
        self
    }

    /// The model speaking on the given 0-based turn.
    pub fn speaker(&self, turn: usize) -> &str {
        if turn % 2 == 0 {
            &self.model_a
        } else {
            &self.model_b
        }
    }

    /// Runs every turn in order. The first failing turn aborts the run and its
    /// error is returned as is; the transcript so far is dropped.
    pub async fn run(&self, client: &dyn ModelClient) -> Result<Transcript, Error> {
        let mut transcript = Transcript::default();

        for turn in 0..self.turns {
            let speaker = self.speaker(turn);
            let history = History::new(&self.topic, &transcript);

            debug!(turn, speaker, "Generating");

            let words = match client.generate(speaker, &history).await {
                Ok(words) => words,
                Err(error) => {
                    warn!(turn, speaker, %error, "Turn failed, aborting conversation");
                    return Err(error);
                }
            };
            transcript.push(speaker, words);
        }

        Ok(transcript)
    }
}

pub async fn have_conversation(
    model_a: &str,
    model_b: &str,
    topic: &str,
    turns: usize,
    client: &dyn ModelClient,
) -> Result<Transcript, Error> {
    Conversation::new(model_a, model_b, topic)
        .with_turns(turns)
        .run(client)
        .await
}
