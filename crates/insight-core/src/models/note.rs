//! Note model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned opaque note identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A note as returned by the note-management API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier (immutable)
    #[serde(rename = "_id", alias = "id")]
    pub id: NoteId,
    /// Server-derived title
    #[serde(default)]
    pub title: String,
    /// Plain text content
    pub content: String,
    /// Optional attached URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Owner identifier (immutable)
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(rename = "isFavourite", alias = "isFavorite", default)]
    pub is_favourite: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Revision marker
    #[serde(rename = "__v", default)]
    pub revision: u32,
}

impl Note {
    /// Case-insensitive containment check over title and content.
    ///
    /// `needle` must already be lower-cased.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }

    /// Get first line of content as a preview, truncated to `max_len` characters
    #[must_use]
    pub fn preview(&self, max_len: usize) -> String {
        let first_line = self.content.lines().next().unwrap_or("");
        if first_line.chars().count() <= max_len {
            return first_line.to_string();
        }
        let truncated: String = first_line.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "_id": "65f0c0ffee",
        "title": "Groceries",
        "content": "Buy milk\nand eggs",
        "link": "https://shop.example.com",
        "isFavourite": true,
        "userId": "u1",
        "createdAt": "2024-03-12T10:00:00.000Z",
        "updatedAt": "2024-03-12T11:30:00.000Z",
        "__v": 2
    }"#;

    #[test]
    fn note_parses_server_payload() {
        let note: Note = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(note.id.as_str(), "65f0c0ffee");
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.link.as_deref(), Some("https://shop.example.com"));
        assert!(note.is_favourite);
        assert_eq!(note.revision, 2);
        assert!(note.created_at < note.updated_at);
    }

    #[test]
    fn note_defaults_optional_fields() {
        let note: Note = serde_json::from_str(
            r#"{"_id":"n1","content":"c","createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(note.link.is_none());
        assert!(!note.is_favourite);
        assert!(note.title.is_empty());
    }

    #[test]
    fn matches_lowercase_checks_title_and_content() {
        let note: Note = serde_json::from_str(SAMPLE).unwrap();
        assert!(note.matches_lowercase("grocer"));
        assert!(note.matches_lowercase("eggs"));
        assert!(!note.matches_lowercase("bread"));
    }

    #[test]
    fn preview_truncates_with_ellipsis() {
        let mut note: Note = serde_json::from_str(SAMPLE).unwrap();
        note.content = "This is a very long sentence that should be shortened".to_string();
        assert_eq!(note.preview(20), "This is a very lo...");
        assert_eq!(note.preview(200), note.content);
    }
}
