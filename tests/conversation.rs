use std::sync::Mutex;

use async_trait::async_trait;
use model_dialogue::{Conversation, Error, History, ModelClient, Transcript, have_conversation};

/// Answers every turn with `{model}:{turn}` and records what it was asked.
#[derive(Default)]
struct EchoClient {
    calls: Mutex<Vec<(String, String)>>,
}

impl EchoClient {
    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for EchoClient {
    async fn generate(&self, model: &str, history: &History<'_>) -> Result<String, Error> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_owned(), history.prompt()));
        Ok(format!("{model}:{}", history.turn()))
    }
}

/// Succeeds until `fail_on` (0-based), then fails with a generation error.
struct FailingClient {
    fail_on: usize,
    calls: Mutex<usize>,
}

#[async_trait]
impl ModelClient for FailingClient {
    async fn generate(&self, model: &str, history: &History<'_>) -> Result<String, Error> {
        *self.calls.lock().unwrap() += 1;
        if history.turn() == self.fail_on {
            return Err(Error::Generation(format!("{model} is out of ideas")));
        }
        Ok("fine".to_owned())
    }
}

fn words(transcript: &Transcript) -> Vec<&str> {
    transcript
        .interjections
        .iter()
        .map(|interjection| interjection.words.as_str())
        .collect()
}

#[tokio::test]
async fn echo_client_yields_turns_in_order() {
    let client = EchoClient::default();

    let transcript = have_conversation("A", "B", "hello", 4, &client)
        .await
        .unwrap();

    assert_eq!(words(&transcript), vec!["A:0", "B:1", "A:2", "B:3"]);
}

#[tokio::test]
async fn transcript_length_matches_turn_count() {
    for turns in 1..=7 {
        let client = EchoClient::default();
        let transcript = have_conversation("A", "B", "topic", turns, &client)
            .await
            .unwrap();

        assert_eq!(transcript.len(), turns);
        assert_eq!(client.calls().len(), turns);
    }
}

#[tokio::test]
async fn speakers_alternate_starting_with_model_a() {
    let client = EchoClient::default();
    let transcript = have_conversation("llama2", "mistral", "topic", 5, &client)
        .await
        .unwrap();

    for (index, interjection) in transcript.interjections.iter().enumerate() {
        let expected = if index % 2 == 0 { "llama2" } else { "mistral" };
        assert_eq!(interjection.speaker, expected);
    }
}

#[tokio::test]
async fn zero_turns_makes_no_calls() {
    let client = EchoClient::default();
    let transcript = have_conversation("A", "B", "topic", 0, &client)
        .await
        .unwrap();

    assert!(transcript.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn each_turn_sees_the_whole_transcript_so_far() {
    let client = EchoClient::default();
    have_conversation("A", "B", "Let's talk", 3, &client)
        .await
        .unwrap();

    assert_eq!(
        client.calls(),
        vec![
            ("A".to_owned(), "Let's talk".to_owned()),
            ("B".to_owned(), "Let's talk\nA: A:0".to_owned()),
            ("A".to_owned(), "Let's talk\nA: A:0\nB: B:1".to_owned()),
        ]
    );
}

#[tokio::test]
async fn failure_aborts_the_run_with_the_client_error() {
    let client = FailingClient {
        fail_on: 2,
        calls: Mutex::new(0),
    };

    let result = have_conversation("A", "B", "topic", 5, &client).await;

    match result {
        Err(Error::Generation(message)) => assert_eq!(message, "A is out of ideas"),
        other => panic!("expected a generation error, got {other:?}"),
    }
    assert_eq!(*client.calls.lock().unwrap(), 3);
}

#[tokio::test]
async fn default_turn_count_is_four() {
    let client = EchoClient::default();
    let conversation = Conversation::new("A", "B", "topic");

    assert_eq!(conversation.turns, 4);
    assert_eq!(conversation.run(&client).await.unwrap().len(), 4);
}

#[tokio::test]
async fn same_model_can_take_both_seats() {
    let client = EchoClient::default();
    let transcript = Conversation::new("llama2", "llama2", "topic")
        .with_turns(2)
        .run(&client)
        .await
        .unwrap();

    assert_eq!(words(&transcript), vec!["llama2:0", "llama2:1"]);
}
