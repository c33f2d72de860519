//! Recording sessions driven through the composer with a scripted recognizer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use insight_core::http::{NoticeLevel, RecordingNotifier};
use insight_core::storage::{KeyValueStore, MemoryStore, VOICE_TRANSCRIPTS_KEY};
use insight_core::voice::{RecognitionEvent, SpeechRecognizer};
use insight_core::{ClientConfig, Composer, Error, InsightClient, Result};
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct FakeRecognizer {
    deny_microphone: bool,
    microphone_delay: Option<Duration>,
    sender: Mutex<Option<mpsc::UnboundedSender<RecognitionEvent>>>,
    starts: Mutex<usize>,
    stops: Mutex<usize>,
}

impl FakeRecognizer {
    fn emit(&self, event: RecognitionEvent) {
        let sender = self.sender.lock().unwrap().clone();
        sender.expect("recognizer not started").send(event).unwrap();
    }

    fn starts(&self) -> usize {
        *self.starts.lock().unwrap()
    }

    fn stops(&self) -> usize {
        *self.stops.lock().unwrap()
    }
}

#[async_trait]
impl SpeechRecognizer for FakeRecognizer {
    async fn request_microphone(&self) -> Result<()> {
        if let Some(delay) = self.microphone_delay {
            tokio::time::sleep(delay).await;
        }
        if self.deny_microphone {
            Err(Error::Permission("denied".to_string()))
        } else {
            Ok(())
        }
    }

    async fn start(&self, events: mpsc::UnboundedSender<RecognitionEvent>) -> Result<()> {
        *self.starts.lock().unwrap() += 1;
        *self.sender.lock().unwrap() = Some(events);
        Ok(())
    }

    fn stop(&self) {
        *self.stops.lock().unwrap() += 1;
    }
}

fn composer_with(
    recognizer: Arc<FakeRecognizer>,
    storage: MemoryStore,
) -> (Composer, Arc<RecordingNotifier>) {
    composer_for(ClientConfig::default(), recognizer, storage)
}

fn composer_for(
    config: ClientConfig,
    recognizer: Arc<FakeRecognizer>,
    storage: MemoryStore,
) -> (Composer, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let client = InsightClient::new(&config, Arc::new(storage), notifier.clone()).unwrap();
    (Composer::new(Arc::new(client), recognizer), notifier)
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn cumulative_updates_finalize_one_transcript() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let storage = MemoryStore::new();
    let (composer, notifier) = composer_with(Arc::clone(&recognizer), storage.clone());

    composer.start_recording().await.unwrap();
    assert!(composer.is_recording());

    recognizer.emit(RecognitionEvent::Result("hello".to_string()));
    recognizer.emit(RecognitionEvent::Result("hello world".to_string()));
    wait_until(|| composer.client().voice().current_transcript == "hello world").await;

    composer.stop_recording();

    let voice = composer.client().voice();
    assert!(!voice.is_recording());
    assert_eq!(voice.history.len(), 1);
    assert_eq!(voice.history[0].content, "hello world");
    assert_eq!(composer.fields().content, "hello world");
    assert!(storage
        .get(VOICE_TRANSCRIPTS_KEY)
        .unwrap()
        .unwrap()
        .contains("hello world"));
    assert_eq!(
        notifier.messages(NoticeLevel::Success),
        vec!["Voice recording started", "Voice recording completed and saved"]
    );

    composer.stop_recording();
    assert_eq!(composer.client().voice().history.len(), 1);
    assert_eq!(recognizer.stops(), 1);
}

#[tokio::test]
async fn denied_microphone_keeps_session_idle() {
    let recognizer = Arc::new(FakeRecognizer {
        deny_microphone: true,
        ..FakeRecognizer::default()
    });
    let (composer, notifier) = composer_with(Arc::clone(&recognizer), MemoryStore::new());

    let result = composer.start_recording().await;

    assert!(matches!(result, Err(Error::Permission(_))));
    let voice = composer.client().voice();
    assert!(!voice.is_recording());
    assert!(voice.error.is_some());
    assert_eq!(recognizer.starts(), 0);
    assert_eq!(
        notifier.messages(NoticeLevel::Error),
        vec!["Failed to start recording. Please check your microphone permissions."]
    );
}

#[tokio::test]
async fn engine_end_restarts_while_recording() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let (composer, _) = composer_with(Arc::clone(&recognizer), MemoryStore::new());

    composer.start_recording().await.unwrap();
    recognizer.emit(RecognitionEvent::End);
    wait_until(|| recognizer.starts() == 2).await;

    assert!(composer.is_recording());
    composer.stop_recording();
}

#[tokio::test]
async fn recognition_error_stops_and_keeps_history() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let (composer, notifier) = composer_with(Arc::clone(&recognizer), MemoryStore::new());

    composer.start_recording().await.unwrap();
    recognizer.emit(RecognitionEvent::Result("first take".to_string()));
    wait_until(|| composer.client().voice().current_transcript == "first take").await;
    composer.stop_recording();

    composer.start_recording().await.unwrap();
    recognizer.emit(RecognitionEvent::Error("network".to_string()));
    wait_until(|| !composer.is_recording()).await;

    let voice = composer.client().voice();
    assert_eq!(voice.error.as_deref(), Some("network"));
    assert_eq!(voice.history.len(), 1);
    assert_eq!(voice.history[0].content, "first take");
    assert_eq!(
        notifier.messages(NoticeLevel::Error),
        vec!["Speech recognition error. Please try again."]
    );
}

#[tokio::test(start_paused = true)]
async fn ticker_counts_recording_seconds() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let (composer, _) = composer_with(Arc::clone(&recognizer), MemoryStore::new());

    composer.start_recording().await.unwrap();
    tokio::time::sleep(Duration::from_millis(3_500)).await;

    assert_eq!(composer.client().voice().recording_time, 3);

    recognizer.emit(RecognitionEvent::Result("timed".to_string()));
    wait_until(|| composer.client().voice().current_transcript == "timed").await;
    composer.stop_recording();

    let history = composer.client().voice().history;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].duration, 3);
}

#[tokio::test]
async fn transcript_history_can_be_pruned() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let storage = MemoryStore::new();
    let (composer, _) = composer_with(Arc::clone(&recognizer), storage.clone());

    for take in ["one", "two"] {
        composer.start_recording().await.unwrap();
        recognizer.emit(RecognitionEvent::Result(take.to_string()));
        wait_until(|| composer.client().voice().current_transcript == take).await;
        composer.stop_recording();
    }

    let client = composer.client();
    let first_id = client.voice().history[0].id.clone();
    assert!(client.remove_transcript(&first_id).unwrap());
    assert!(!client.remove_transcript(&first_id).unwrap());
    assert_eq!(client.voice().history.len(), 1);

    client.clear_transcripts().unwrap();
    assert!(client.voice().history.is_empty());
    assert_eq!(storage.get(VOICE_TRANSCRIPTS_KEY).unwrap().as_deref(), Some("[]"));
}

#[tokio::test(start_paused = true)]
async fn overlapping_starts_run_one_session() {
    let recognizer = Arc::new(FakeRecognizer {
        microphone_delay: Some(Duration::from_millis(10)),
        ..FakeRecognizer::default()
    });
    let (composer, notifier) = composer_with(Arc::clone(&recognizer), MemoryStore::new());

    let (first, second) = tokio::join!(composer.start_recording(), composer.start_recording());
    first.unwrap();
    second.unwrap();
    assert_eq!(recognizer.starts(), 1);

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert_eq!(composer.client().voice().recording_time, 3);
    assert_eq!(
        notifier.messages(NoticeLevel::Success),
        vec!["Voice recording started"]
    );

    composer.stop_recording();
    composer.start_recording().await.unwrap();
    assert_eq!(recognizer.starts(), 2);
    composer.stop_recording();
}

#[tokio::test]
async fn saving_mid_recording_stops_and_clears_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/notes/create"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "note": {
                "_id": "n1",
                "title": "Dictated",
                "content": "remember the milk",
                "userId": "u1",
                "isFavourite": false,
                "createdAt": "2024-03-01T00:00:00Z",
                "updatedAt": "2024-03-01T00:00:00Z",
                "__v": 0
            },
            "message": "Note created successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let recognizer = Arc::new(FakeRecognizer::default());
    let (composer, _) = composer_for(
        ClientConfig::new(server.uri()).unwrap(),
        Arc::clone(&recognizer),
        MemoryStore::new(),
    );

    composer.start_recording().await.unwrap();
    recognizer.emit(RecognitionEvent::Result("remember the milk".to_string()));
    wait_until(|| composer.fields().content == "remember the milk").await;

    let note = composer.save().await.unwrap();

    assert_eq!(note.id.as_str(), "n1");
    assert!(!composer.is_recording());
    assert_eq!(recognizer.stops(), 1);
    let voice = composer.client().voice();
    assert!(voice.current_transcript.is_empty());
    assert_eq!(voice.recording_time, 0);
    assert_eq!(voice.history.len(), 1);
    assert_eq!(voice.history[0].content, "remember the milk");
    assert!(composer.fields().content.is_empty());
}
