//! Speech recognition engine capability.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// Callback from a running recognizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Cumulative transcript for the whole session so far.
    Result(String),
    Error(String),
    /// The engine stopped on its own (silence, platform limit).
    End,
}

/// Continuous, interim-result speech recognizer.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Ask for microphone access; `Error::Permission` when refused.
    async fn request_microphone(&self) -> Result<()>;

    /// Begin (or resume) recognition, delivering events on `events`.
    async fn start(&self, events: mpsc::UnboundedSender<RecognitionEvent>) -> Result<()>;

    fn stop(&self);
}

/// Recognizer for runtimes without speech support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedRecognizer;

#[async_trait]
impl SpeechRecognizer for UnsupportedRecognizer {
    async fn request_microphone(&self) -> Result<()> {
        Err(Error::Recognition(
            "Speech recognition is not available in this runtime".to_string(),
        ))
    }

    async fn start(&self, _events: mpsc::UnboundedSender<RecognitionEvent>) -> Result<()> {
        Err(Error::Recognition(
            "Speech recognition is not available in this runtime".to_string(),
        ))
    }

    fn stop(&self) {}
}
