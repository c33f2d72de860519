//! Data models for Insight

mod note;
mod suggestions;
mod user;

pub use note::{Note, NoteId};
pub use suggestions::{NoteSuggestions, RelatedResource};
pub use user::User;
