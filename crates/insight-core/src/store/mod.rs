//! Client state stores.
//!
//! Each store is a plain state struct plus a pure `reduce_*` function;
//! stores that mirror durable storage wrap the reducer with the writes.

mod auth;
mod note_detail;
mod notes;

pub use auth::{reduce_auth, AuthEvent, AuthState, AuthStore};
pub use note_detail::{reduce_note_detail, NoteDetailEvent, NoteDetailState};
pub use notes::{reduce_notes, NotesEvent, NotesPhase, NotesState, SearchView, SortOrder};
