//! Voice recording session state and finalized transcript history.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::storage::{KeyValueStore, VOICE_TRANSCRIPTS_KEY};

/// A finished recording's transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRecord {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds spent recording.
    pub duration: u64,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordingStatus {
    #[default]
    Idle,
    Recording,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoiceState {
    pub status: RecordingStatus,
    /// Whole seconds since the session started.
    pub recording_time: u64,
    /// Latest cumulative recognition result.
    pub current_transcript: String,
    pub session_id: Option<String>,
    pub owner: Option<String>,
    pub history: Vec<TranscriptRecord>,
    pub error: Option<String>,
}

impl VoiceState {
    #[must_use]
    pub const fn is_recording(&self) -> bool {
        matches!(self.status, RecordingStatus::Recording)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoiceEvent {
    Started {
        session_id: String,
        owner: Option<String>,
    },
    StartFailed(String),
    Tick,
    TranscriptUpdated(String),
    Stopped {
        record_id: String,
        at: DateTime<Utc>,
    },
    /// Records the error only; the controller stops the session separately.
    Failed(String),
    RemoveTranscript(String),
    ClearHistory,
    /// Drop the in-progress transcript and counters, keeping history.
    ClearSession,
}

impl VoiceEvent {
    /// Start event with a fresh time-ordered session id.
    #[must_use]
    pub fn start_now(owner: Option<String>) -> Self {
        Self::Started {
            session_id: Uuid::now_v7().to_string(),
            owner,
        }
    }

    #[must_use]
    pub fn stop_now() -> Self {
        Self::Stopped {
            record_id: Uuid::now_v7().to_string(),
            at: Utc::now(),
        }
    }
}

#[must_use]
pub fn reduce_voice(mut state: VoiceState, event: VoiceEvent) -> VoiceState {
    match event {
        VoiceEvent::Started { session_id, owner } => {
            if !state.is_recording() {
                state.status = RecordingStatus::Recording;
                state.recording_time = 0;
                state.current_transcript.clear();
                state.session_id = Some(session_id);
                state.owner = owner;
                state.error = None;
            }
        }
        VoiceEvent::StartFailed(reason) => {
            state.status = RecordingStatus::Idle;
            state.error = Some(reason);
        }
        VoiceEvent::Tick => {
            if state.is_recording() {
                state.recording_time += 1;
            }
        }
        VoiceEvent::TranscriptUpdated(text) => {
            if state.is_recording() {
                state.current_transcript = text;
            }
        }
        VoiceEvent::Stopped { record_id, at } => {
            if state.is_recording() {
                let content = state.current_transcript.trim();
                if !content.is_empty() {
                    state.history.push(TranscriptRecord {
                        id: record_id,
                        content: content.to_string(),
                        timestamp: at,
                        duration: state.recording_time,
                        session_id: state.session_id.clone().unwrap_or_default(),
                        user_id: state.owner.clone(),
                    });
                }
                state.status = RecordingStatus::Idle;
                state.recording_time = 0;
                state.current_transcript.clear();
                state.session_id = None;
            }
        }
        VoiceEvent::Failed(reason) => state.error = Some(reason),
        VoiceEvent::RemoveTranscript(id) => state.history.retain(|record| record.id != id),
        VoiceEvent::ClearHistory => state.history.clear(),
        VoiceEvent::ClearSession => {
            let history = std::mem::take(&mut state.history);
            state = VoiceState {
                history,
                ..VoiceState::default()
            };
        }
    }
    state
}

/// Voice state plus the persisted transcript history.
pub struct VoiceStore {
    state: VoiceState,
    storage: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for VoiceStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("VoiceStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl VoiceStore {
    /// Load persisted history; unreadable history starts empty.
    pub fn hydrate(storage: Arc<dyn KeyValueStore>) -> Self {
        let history = match storage.get(VOICE_TRANSCRIPTS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                tracing::warn!("Ignoring unreadable transcript history: {error}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!("Failed to read transcript history: {error}");
                Vec::new()
            }
        };

        Self {
            state: VoiceState {
                history,
                ..VoiceState::default()
            },
            storage,
        }
    }

    pub const fn state(&self) -> &VoiceState {
        &self.state
    }

    /// Apply `event`, persisting history whenever it changed.
    pub fn dispatch(&mut self, event: VoiceEvent) -> Result<()> {
        let before = self.state.history.len();
        let touches_history = matches!(
            event,
            VoiceEvent::Stopped { .. } | VoiceEvent::RemoveTranscript(_) | VoiceEvent::ClearHistory
        );
        self.state = reduce_voice(std::mem::take(&mut self.state), event);

        if touches_history && self.state.history.len() != before {
            let serialized = serde_json::to_string(&self.state.history)?;
            self.storage.set(VOICE_TRANSCRIPTS_KEY, &serialized)?;
        }
        Ok(())
    }
}
