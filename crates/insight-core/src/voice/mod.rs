//! Voice capture: recording session state, transcript history, and the
//! speech recognizer capability.

mod engine;
mod session;

pub use engine::{RecognitionEvent, SpeechRecognizer, UnsupportedRecognizer};
pub use session::{
    reduce_voice, RecordingStatus, TranscriptRecord, VoiceEvent, VoiceState, VoiceStore,
};
