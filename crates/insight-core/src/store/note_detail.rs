//! Single-note detail view state.

use crate::api::NoteDetail;
use crate::models::{Note, NoteSuggestions};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteDetailState {
    pub note: Option<Note>,
    pub suggestions: NoteSuggestions,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoteDetailEvent {
    FetchStarted,
    FetchSucceeded(NoteDetail),
    FetchFailed(String),
    Clear,
}

#[must_use]
pub fn reduce_note_detail(mut state: NoteDetailState, event: NoteDetailEvent) -> NoteDetailState {
    match event {
        NoteDetailEvent::FetchStarted => {
            state = NoteDetailState {
                is_loading: true,
                ..NoteDetailState::default()
            };
        }
        NoteDetailEvent::FetchSucceeded(detail) => {
            state.note = Some(detail.note);
            state.suggestions = detail.suggestions;
            state.is_loading = false;
        }
        NoteDetailEvent::FetchFailed(message) => {
            state.is_loading = false;
            state.error = Some(message);
        }
        NoteDetailEvent::Clear => state = NoteDetailState::default(),
    }
    state
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn detail() -> NoteDetail {
        serde_json::from_value(json!({
            "note": {
                "_id": "n1",
                "title": "Rust",
                "content": "ownership",
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            },
            "suggestions": { "relatedTopics": ["borrowing"] }
        }))
        .unwrap()
    }

    #[test]
    fn fetch_success_stores_note_and_suggestions() {
        let state = reduce_note_detail(NoteDetailState::default(), NoteDetailEvent::FetchStarted);
        assert!(state.is_loading);

        let state = reduce_note_detail(state, NoteDetailEvent::FetchSucceeded(detail()));
        assert!(!state.is_loading);
        assert_eq!(state.note.as_ref().map(|note| note.title.as_str()), Some("Rust"));
        assert_eq!(state.suggestions.related_topics, vec!["borrowing"]);
    }

    #[test]
    fn refetch_drops_previous_note_and_records_failure() {
        let state = reduce_note_detail(
            NoteDetailState::default(),
            NoteDetailEvent::FetchSucceeded(detail()),
        );
        let state = reduce_note_detail(state, NoteDetailEvent::FetchStarted);
        assert!(state.note.is_none());
        assert!(state.suggestions.is_empty());

        let state = reduce_note_detail(state, NoteDetailEvent::FetchFailed("Note not found".into()));
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("Note not found"));

        assert_eq!(
            reduce_note_detail(state, NoteDetailEvent::Clear),
            NoteDetailState::default()
        );
    }
}
