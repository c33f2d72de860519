//! Typed remote operations over the HTTP client adapter.

mod auth;
mod notes;

pub use auth::{AuthApi, AuthPayload, LoginRequest, SignupRequest};
pub use notes::{
    CreatedNote, DeletedNote, FavoriteToggle, NewNote, NoteDetail, NoteUpdate, NotesApi,
    UpdatedNote,
};

/// Encode a single path segment.
fn segment(value: &str) -> String {
    urlencoding::encode(value.trim()).into_owned()
}
