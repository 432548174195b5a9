use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub interjections: Vec<Interjection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interjection {
    pub speaker: String,
    pub words: String,
}

impl Transcript {
    pub fn len(&self) -> usize {
        self.interjections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interjections.is_empty()
    }

    pub(crate) fn push(&mut self, speaker: &str, words: String) {
        self.interjections.push(Interjection {
            speaker: speaker.to_owned(),
            words,
        });
    }

    /// Renders one `speaker: words` line per interjection.
    pub fn to_lines(&self) -> String {
        self.interjections
            .iter()
            .map(|interjection| format!("{}: {}", interjection.speaker, interjection.words))
            .join("\n")
    }
}

/// The read-only view of a conversation handed to a model client for one turn.
#[derive(Debug, Clone, Copy)]
pub struct History<'a> {
    topic: &'a str,
    transcript: &'a Transcript,
}

impl<'a> History<'a> {
    pub fn new(topic: &'a str, transcript: &'a Transcript) -> Self {
        Self { topic, transcript }
    }

    pub fn topic(&self) -> &'a str {
        self.topic
    }

    pub fn interjections(&self) -> &'a [Interjection] {
        &self.transcript.interjections
    }

    /// Index of the turn about to be generated.
    pub fn turn(&self) -> usize {
        self.transcript.len()
    }

    /// Whether the interjection at `index` was spoken from the same seat as
    /// the turn about to be generated.
    pub fn is_own(&self, index: usize) -> bool {
        index % 2 == self.turn() % 2
    }

    /// The topic followed by one `\n{speaker}: {words}` line per interjection.
    pub fn prompt(&self) -> String {
        let mut prompt = self.topic.to_owned();
        for interjection in self.interjections() {
            prompt.push_str(&format!("\n{}: {}", interjection.speaker, interjection.words));
        }
        prompt
    }
}
