//! Notes state store.
//!
//! Canonical note collection plus the derived search view, driven by a
//! pure reducer so every transition can be tested without a runtime.

use crate::models::{Note, NoteId};

const UPDATE_PROCESSING_MESSAGE: &str = "Processing your note update...";

/// Ordering of the canonical collection by creation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    /// Newest first.
    #[default]
    Descending,
}

impl SortOrder {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Derived search view over the canonical collection.
///
/// `Active` with no matches is distinct from `Inactive`, so a search that
/// finds nothing never falls back to showing every note.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SearchView {
    #[default]
    Inactive,
    Active { term: String, matches: Vec<Note> },
}

impl SearchView {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

/// Coarse lifecycle of the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotesPhase {
    Idle,
    Loading,
    ReadyWithError,
    Ready,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotesState {
    /// Canonical collection, kept sorted by `sort_order` except that freshly
    /// created notes are appended in place.
    pub notes: Vec<Note>,
    pub search: SearchView,
    pub sort_order: SortOrder,
    pub is_loading: bool,
    /// True once any list request has completed.
    pub loaded: bool,
    pub error: Option<String>,
    pub processing_message: Option<String>,
    pub selected_note: Option<Note>,
    pub is_edit_modal_open: bool,
}

impl NotesState {
    #[must_use]
    pub fn phase(&self) -> NotesPhase {
        if self.is_loading {
            NotesPhase::Loading
        } else if self.error.is_some() {
            NotesPhase::ReadyWithError
        } else if self.loaded {
            NotesPhase::Ready
        } else {
            NotesPhase::Idle
        }
    }

    /// Notes a list view should render: search matches while searching.
    #[must_use]
    pub fn visible_notes(&self) -> &[Note] {
        match &self.search {
            SearchView::Inactive => &self.notes,
            SearchView::Active { matches, .. } => matches,
        }
    }

    pub fn favourite_notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|note| note.is_favourite)
    }

    #[must_use]
    pub fn find(&self, note_id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == note_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotesEvent {
    ListStarted,
    ListSucceeded(Vec<Note>),
    ListFailed(String),
    CreateStarted,
    CreateSucceeded(Note),
    CreateFailed(String),
    UpdateStarted,
    UpdateSucceeded(Note),
    UpdateFailed(String),
    DeleteStarted,
    DeleteSucceeded(NoteId),
    DeleteFailed(String),
    FavoriteSucceeded { note_id: NoteId, is_favourite: bool },
    FavoriteFailed(String),
    ToggleSort,
    Search(String),
    ResetSearch,
    OpenEdit(NoteId),
    CloseEdit,
    ClearError,
    /// A pending call was dropped before it completed.
    Abandoned,
    Reset,
}

/// Apply one event to the notes state.
#[must_use]
pub fn reduce_notes(mut state: NotesState, event: NotesEvent) -> NotesState {
    match event {
        NotesEvent::ListStarted => {
            state.is_loading = true;
            state.error = None;
        }
        NotesEvent::ListSucceeded(notes) => {
            state.notes = notes;
            sort_notes(&mut state.notes, state.sort_order);
            state.is_loading = false;
            state.loaded = true;
            state.error = None;
            refresh_search(&mut state);
        }
        NotesEvent::CreateStarted | NotesEvent::DeleteStarted => {
            state.is_loading = true;
        }
        NotesEvent::UpdateStarted => {
            state.is_loading = true;
            state.processing_message = Some(UPDATE_PROCESSING_MESSAGE.to_string());
        }
        NotesEvent::CreateSucceeded(note) => {
            state.notes.push(note);
            settle_success(&mut state);
        }
        NotesEvent::UpdateSucceeded(note) => {
            if let Some(slot) = state.notes.iter_mut().find(|existing| existing.id == note.id) {
                *slot = note.clone();
            }
            if state
                .selected_note
                .as_ref()
                .is_some_and(|selected| selected.id == note.id)
            {
                state.selected_note = None;
                state.is_edit_modal_open = false;
            }
            state.processing_message = None;
            settle_success(&mut state);
        }
        NotesEvent::DeleteSucceeded(note_id) => {
            state.notes.retain(|note| note.id != note_id);
            if state
                .selected_note
                .as_ref()
                .is_some_and(|selected| selected.id == note_id)
            {
                state.selected_note = None;
                state.is_edit_modal_open = false;
            }
            settle_success(&mut state);
        }
        NotesEvent::FavoriteSucceeded {
            note_id,
            is_favourite,
        } => {
            if let Some(note) = state.notes.iter_mut().find(|note| note.id == note_id) {
                note.is_favourite = is_favourite;
            }
            if let Some(selected) = state
                .selected_note
                .as_mut()
                .filter(|selected| selected.id == note_id)
            {
                selected.is_favourite = is_favourite;
            }
            refresh_search(&mut state);
        }
        NotesEvent::ListFailed(message) => {
            state.is_loading = false;
            state.loaded = true;
            state.error = Some(message);
        }
        NotesEvent::CreateFailed(message)
        | NotesEvent::DeleteFailed(message)
        | NotesEvent::FavoriteFailed(message) => {
            state.is_loading = false;
            state.error = Some(message);
        }
        NotesEvent::UpdateFailed(message) => {
            state.is_loading = false;
            state.processing_message = None;
            state.error = Some(message);
        }
        NotesEvent::ToggleSort => {
            state.sort_order = state.sort_order.toggled();
            sort_notes(&mut state.notes, state.sort_order);
            refresh_search(&mut state);
        }
        NotesEvent::Search(term) => {
            let term = term.trim().to_lowercase();
            state.search = if term.is_empty() {
                SearchView::Inactive
            } else {
                SearchView::Active {
                    matches: filter_notes(&state.notes, &term),
                    term,
                }
            };
        }
        NotesEvent::ResetSearch => state.search = SearchView::Inactive,
        NotesEvent::OpenEdit(note_id) => {
            if let Some(note) = state.find(&note_id).cloned() {
                state.selected_note = Some(note);
                state.is_edit_modal_open = true;
            }
        }
        NotesEvent::CloseEdit => {
            state.selected_note = None;
            state.is_edit_modal_open = false;
        }
        NotesEvent::ClearError => state.error = None,
        NotesEvent::Abandoned => {
            state.is_loading = false;
            state.processing_message = None;
        }
        NotesEvent::Reset => {
            state = NotesState::default();
        }
    }
    state
}

fn settle_success(state: &mut NotesState) {
    state.is_loading = false;
    state.error = None;
    refresh_search(state);
}

/// Stable sort: notes with equal timestamps keep their relative order.
fn sort_notes(notes: &mut [Note], order: SortOrder) {
    match order {
        SortOrder::Ascending => notes.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Descending => notes.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

fn filter_notes(notes: &[Note], term: &str) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| note.matches_lowercase(term))
        .cloned()
        .collect()
}

fn refresh_search(state: &mut NotesState) {
    if let SearchView::Active { term, matches } = &mut state.search {
        *matches = filter_notes(&state.notes, term);
    }
}
