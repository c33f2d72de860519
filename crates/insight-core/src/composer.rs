//! Note composer.
//!
//! Holds the composer's local fields and drives a voice recording session:
//! a one-second ticker plus a pump that feeds recognizer callbacks into the
//! voice store and the content field. Saving validates locally and creates
//! the note through [`InsightClient`].

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::NewNote;
use crate::client::InsightClient;
use crate::error::{Error, Result};
use crate::http::NoticeLevel;
use crate::models::Note;
use crate::store::NotesEvent;
use crate::util::{is_http_url, normalize_text_option};
use crate::voice::{RecognitionEvent, SpeechRecognizer, VoiceEvent};

pub const URL_ERROR_MESSAGE: &str = "Please enter a valid URL starting with http:// or https://";
const EMPTY_NOTE_MESSAGE: &str = "Please add some content before saving";
const NOT_AN_IMAGE_MESSAGE: &str = "Please select an image file";
const START_FAILED_MESSAGE: &str =
    "Failed to start recording. Please check your microphone permissions.";
const RECOGNITION_FAILED_MESSAGE: &str = "Speech recognition error. Please try again.";

/// Empty, or starting with `http://` / `https://` after trimming.
#[must_use]
pub fn validate_url(url: &str) -> bool {
    let url = url.trim();
    url.is_empty() || is_http_url(url)
}

/// Append the transcript's words that `content` does not already contain.
///
/// Recognizer results are cumulative, so merging every update this way is
/// idempotent. Repeated words inside a transcript are collapsed.
#[must_use]
pub fn merge_transcript(content: &str, transcript: &str) -> String {
    let mut seen: HashSet<&str> = content.split_whitespace().collect();
    let additions: Vec<&str> = transcript
        .split_whitespace()
        .filter(|word| seen.insert(*word))
        .collect();

    if additions.is_empty() {
        return content.to_string();
    }
    let base = content.trim_end();
    if base.is_empty() {
        additions.join(" ")
    } else {
        format!("{base} {}", additions.join(" "))
    }
}

/// Locally attached image. Counts as content but is never uploaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComposerFields {
    pub content: String,
    pub url: String,
    pub url_error: Option<String>,
    pub image: Option<ImageAttachment>,
    pub show_url_input: bool,
}

impl ComposerFields {
    #[must_use]
    pub fn has_payload(&self) -> bool {
        !self.content.trim().is_empty() || !self.url.trim().is_empty() || self.image.is_some()
    }
}

#[derive(Default)]
struct RecordingTasks {
    starting: bool,
    ticker: Option<JoinHandle<()>>,
    pump: Option<JoinHandle<()>>,
}

impl RecordingTasks {
    fn abort_all(&mut self) {
        for handle in [self.ticker.take(), self.pump.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}

/// Exclusive right to start a session, released on drop.
struct StartClaim<'a> {
    tasks: &'a Mutex<RecordingTasks>,
}

impl Drop for StartClaim<'_> {
    fn drop(&mut self) {
        lock(self.tasks).starting = false;
    }
}

struct Inner {
    client: Arc<InsightClient>,
    recognizer: Arc<dyn SpeechRecognizer>,
    fields: Mutex<ComposerFields>,
    tasks: Mutex<RecordingTasks>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Inner {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.client.notifier().notify(level, message);
    }

    /// Stop the recognizer and ticker and finalize the transcript.
    /// Returns false when nothing was recording.
    fn finish(&self) -> bool {
        if !self.client.is_recording() {
            return false;
        }
        self.recognizer.stop();
        if let Some(ticker) = lock(&self.tasks).ticker.take() {
            ticker.abort();
        }
        self.client.dispatch_voice(VoiceEvent::stop_now());
        true
    }

    fn fail(&self, reason: String) {
        tracing::warn!("Speech recognition error: {reason}");
        self.client.dispatch_voice(VoiceEvent::Failed(reason));
        self.notify(NoticeLevel::Error, RECOGNITION_FAILED_MESSAGE);
        self.finish();
    }

    fn absorb(&self, transcript: &str) {
        if !self.client.is_recording() {
            return;
        }
        self.client
            .dispatch_voice(VoiceEvent::TranscriptUpdated(transcript.to_string()));
        let mut fields = lock(&self.fields);
        fields.content = merge_transcript(&fields.content, transcript);
    }
}

async fn run_ticker(inner: Arc<Inner>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.tick().await;
    loop {
        interval.tick().await;
        if !inner.client.is_recording() {
            break;
        }
        inner.client.dispatch_voice(VoiceEvent::Tick);
    }
}

async fn run_pump(
    inner: Arc<Inner>,
    sender: mpsc::UnboundedSender<RecognitionEvent>,
    mut receiver: mpsc::UnboundedReceiver<RecognitionEvent>,
) {
    while let Some(event) = receiver.recv().await {
        match event {
            RecognitionEvent::Result(transcript) => inner.absorb(&transcript),
            RecognitionEvent::Error(reason) => {
                inner.fail(reason);
                break;
            }
            RecognitionEvent::End => {
                if !inner.client.is_recording() {
                    break;
                }
                tracing::debug!("Recognizer ended while recording; restarting");
                if let Err(error) = inner.recognizer.start(sender.clone()).await {
                    inner.fail(error.to_string());
                    break;
                }
            }
        }
    }
}

/// Composer bound to a client and a speech recognizer.
pub struct Composer {
    inner: Arc<Inner>,
}

impl fmt::Debug for Composer {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Composer")
            .field("fields", &*lock(&self.inner.fields))
            .field("recording", &self.inner.client.is_recording())
            .finish_non_exhaustive()
    }
}

impl Drop for Composer {
    fn drop(&mut self) {
        lock(&self.inner.tasks).abort_all();
    }
}

impl Composer {
    pub fn new(client: Arc<InsightClient>, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                recognizer,
                fields: Mutex::new(ComposerFields::default()),
                tasks: Mutex::new(RecordingTasks::default()),
            }),
        }
    }

    pub fn client(&self) -> &Arc<InsightClient> {
        &self.inner.client
    }

    pub fn fields(&self) -> ComposerFields {
        lock(&self.inner.fields).clone()
    }

    pub fn set_content(&self, content: impl Into<String>) {
        lock(&self.inner.fields).content = content.into();
    }

    pub fn show_url_input(&self) {
        lock(&self.inner.fields).show_url_input = true;
    }

    /// Edit the URL, validating as the user types. An empty URL hides the input.
    pub fn set_url(&self, url: impl Into<String>) {
        let mut fields = lock(&self.inner.fields);
        fields.url = url.into();
        fields.url_error = if validate_url(&fields.url) {
            None
        } else {
            Some(URL_ERROR_MESSAGE.to_string())
        };
        fields.show_url_input = !fields.url.trim().is_empty();
    }

    pub fn clear_url(&self) {
        let mut fields = lock(&self.inner.fields);
        fields.url.clear();
        fields.url_error = None;
        fields.show_url_input = false;
    }

    pub fn attach_image(&self, image: ImageAttachment) -> Result<()> {
        if !image.mime_type.starts_with("image/") {
            self.inner.notify(NoticeLevel::Error, NOT_AN_IMAGE_MESSAGE);
            return Err(Error::Validation(NOT_AN_IMAGE_MESSAGE.to_string()));
        }
        lock(&self.inner.fields).image = Some(image);
        self.inner
            .notify(NoticeLevel::Success, "Image attached successfully");
        Ok(())
    }

    pub fn remove_image(&self) {
        lock(&self.inner.fields).image = None;
    }

    pub fn is_recording(&self) -> bool {
        self.inner.client.is_recording()
    }

    /// Ask for the microphone, then start recognition with a fresh session.
    ///
    /// Starting while already recording, or while another start is pending,
    /// does nothing.
    pub async fn start_recording(&self) -> Result<()> {
        let Some(_claim) = self.claim_start() else {
            return Ok(());
        };
        let client = &self.inner.client;

        if let Err(error) = self.inner.recognizer.request_microphone().await {
            tracing::warn!("Microphone unavailable: {error}");
            client.dispatch_voice(VoiceEvent::StartFailed(error.to_string()));
            self.inner.notify(NoticeLevel::Error, START_FAILED_MESSAGE);
            return Err(error);
        }

        let owner = client.auth().user_id().map(str::to_string);
        client.dispatch_voice(VoiceEvent::start_now(owner));

        let (sender, receiver) = mpsc::unbounded_channel();
        if let Err(error) = self.inner.recognizer.start(sender.clone()).await {
            tracing::warn!("Recognizer failed to start: {error}");
            client.dispatch_voice(VoiceEvent::Failed(error.to_string()));
            client.dispatch_voice(VoiceEvent::stop_now());
            self.inner.notify(NoticeLevel::Error, START_FAILED_MESSAGE);
            return Err(error);
        }

        let ticker = tokio::spawn(run_ticker(Arc::clone(&self.inner)));
        let pump = tokio::spawn(run_pump(Arc::clone(&self.inner), sender, receiver));
        {
            let mut tasks = lock(&self.inner.tasks);
            tasks.abort_all();
            tasks.ticker = Some(ticker);
            tasks.pump = Some(pump);
        }

        self.inner
            .notify(NoticeLevel::Success, "Voice recording started");
        Ok(())
    }

    fn claim_start(&self) -> Option<StartClaim<'_>> {
        let mut tasks = lock(&self.inner.tasks);
        if tasks.starting || self.is_recording() {
            return None;
        }
        tasks.starting = true;
        Some(StartClaim {
            tasks: &self.inner.tasks,
        })
    }

    /// Stop recording and finalize the transcript. A no-op when idle.
    pub fn stop_recording(&self) {
        let stopped = self.inner.finish();
        if let Some(pump) = lock(&self.inner.tasks).pump.take() {
            pump.abort();
        }
        if stopped {
            self.inner
                .notify(NoticeLevel::Success, "Voice recording completed and saved");
        }
    }

    /// Create a note from the composer fields.
    ///
    /// On success every field is cleared and the voice session is reset.
    pub async fn save(&self) -> Result<Note> {
        let fields = self.fields();
        if !fields.has_payload() {
            self.inner.notify(NoticeLevel::Warning, EMPTY_NOTE_MESSAGE);
            return Err(Error::Validation(EMPTY_NOTE_MESSAGE.to_string()));
        }
        if !validate_url(&fields.url) {
            lock(&self.inner.fields).url_error = Some(URL_ERROR_MESSAGE.to_string());
            return Err(Error::Validation(URL_ERROR_MESSAGE.to_string()));
        }

        let client = &self.inner.client;
        client.apply(NotesEvent::ResetSearch);
        let created = client
            .create_note(&NewNote {
                content: fields.content.trim().to_string(),
                link: normalize_text_option(Some(fields.url)),
            })
            .await?;

        *lock(&self.inner.fields) = ComposerFields::default();
        self.stop_recording();
        client.dispatch_voice(VoiceEvent::ClearSession);

        let message = if created.message.trim().is_empty() {
            "Note saved"
        } else {
            created.message.trim()
        };
        self.inner.notify(NoticeLevel::Success, message);
        Ok(created.note)
    }
}
