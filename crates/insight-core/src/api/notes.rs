//! Remote note operations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::segment;
use crate::error::Result;
use crate::http::{HttpClient, Method};
use crate::models::{Note, NoteId, NoteSuggestions};
use crate::util::{normalize_text_option, require_text};

const EMPTY_CONTENT_MESSAGE: &str = "Note content cannot be empty";
const MISSING_NOTE_ID_MESSAGE: &str = "Note id is required";
const MISSING_USER_ID_MESSAGE: &str = "User id is required";

/// Input for note creation; the server derives the title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNote {
    pub content: String,
    pub link: Option<String>,
}

impl NewNote {
    /// Trimmed copy; content is required, an empty link is dropped.
    pub fn validated(&self) -> Result<Self> {
        Ok(Self {
            content: require_text(&self.content, EMPTY_CONTENT_MESSAGE)?,
            link: normalize_text_option(self.link.clone()),
        })
    }
}

/// Full desired state of an existing note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteUpdate {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub link: String,
}

impl NoteUpdate {
    pub fn validated(&self) -> Result<Self> {
        Ok(Self {
            id: NoteId::new(require_text(self.id.as_str(), MISSING_NOTE_ID_MESSAGE)?),
            title: self.title.trim().to_string(),
            content: require_text(&self.content, EMPTY_CONTENT_MESSAGE)?,
            link: self.link.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteDetail {
    pub note: Note,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestions: NoteSuggestions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedNote {
    pub note: Note,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdatedNote {
    pub note: Note,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedNote {
    pub deleted_note_id: NoteId,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggle {
    #[serde(alias = "isFavourite")]
    pub is_favorite: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct NotesList {
    #[serde(default)]
    notes: Vec<Note>,
}

/// Note CRUD and favourite operations against `/notes`.
#[derive(Debug, Clone)]
pub struct NotesApi {
    http: Arc<HttpClient>,
}

impl NotesApi {
    pub const fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// All notes owned by `user_id`; the server performs the filtering.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Note>> {
        let user_id = require_text(user_id, MISSING_USER_ID_MESSAGE)?;
        let payload: NotesList = self
            .http
            .send_json(Method::GET, &format!("/notes/u/{}", segment(&user_id)), None)
            .await?;
        Ok(payload.notes)
    }

    /// One note plus its suggestions bundle.
    pub async fn fetch(&self, note_id: &NoteId) -> Result<NoteDetail> {
        let note_id = require_text(note_id.as_str(), MISSING_NOTE_ID_MESSAGE)?;
        self.http
            .send_json(Method::GET, &format!("/notes/{}", segment(&note_id)), None)
            .await
    }

    pub async fn create(&self, input: &NewNote) -> Result<CreatedNote> {
        let input = input.validated()?;
        let mut body = json!({ "content": input.content });
        if let Some(link) = input.link {
            body["link"] = json!(link);
        }

        self.http
            .send_json(Method::POST, "/notes/create", Some(&body))
            .await
    }

    /// Full replacement update; the complete desired state is sent.
    pub async fn update(&self, input: &NoteUpdate) -> Result<UpdatedNote> {
        let input = input.validated()?;
        let body = json!({
            "noteId": input.id,
            "title": input.title,
            "content": input.content,
            "link": input.link,
        });

        self.http
            .send_json(
                Method::PUT,
                &format!("/notes/update/{}", segment(input.id.as_str())),
                Some(&body),
            )
            .await
    }

    pub async fn delete(&self, note_id: &NoteId) -> Result<DeletedNote> {
        let note_id = require_text(note_id.as_str(), MISSING_NOTE_ID_MESSAGE)?;
        self.http
            .send_json(
                Method::DELETE,
                &format!("/notes/remove/{}", segment(&note_id)),
                None,
            )
            .await
    }

    /// Flip the favourite flag server-side. Each call toggles.
    pub async fn toggle_favorite(&self, note_id: &NoteId, user_id: &str) -> Result<FavoriteToggle> {
        let note_id = require_text(note_id.as_str(), MISSING_NOTE_ID_MESSAGE)?;
        let user_id = require_text(user_id, MISSING_USER_ID_MESSAGE)?;
        let body = json!({ "noteId": note_id, "userId": user_id });

        self.http
            .send_json(Method::POST, "/notes/favorite", Some(&body))
            .await
    }
}

fn null_as_default<'de, D>(deserializer: D) -> std::result::Result<NoteSuggestions, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<NoteSuggestions>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn note_detail_defaults_missing_suggestions() {
        let detail: NoteDetail = serde_json::from_value(json!({
            "note": {
                "_id": "n1",
                "content": "c",
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            },
            "suggestions": null
        }))
        .unwrap();
        assert!(detail.suggestions.is_empty());
    }

    #[test]
    fn deleted_note_reads_camel_case_id() {
        let deleted: DeletedNote =
            serde_json::from_value(json!({ "deletedNoteId": "n9", "message": "Deleted" })).unwrap();
        assert_eq!(deleted.deleted_note_id.as_str(), "n9");
    }

    #[test]
    fn favorite_toggle_accepts_both_spellings() {
        let toggle: FavoriteToggle =
            serde_json::from_value(json!({ "isFavourite": true })).unwrap();
        assert!(toggle.is_favorite);
        assert!(toggle.message.is_empty());
    }

    #[test]
    fn new_note_validation_trims_and_drops_empty_link() {
        let input = NewNote {
            content: "  Buy milk ".to_string(),
            link: Some("   ".to_string()),
        }
        .validated()
        .unwrap();
        assert_eq!(input.content, "Buy milk");
        assert!(input.link.is_none());

        assert!(matches!(
            NewNote::default().validated(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn note_update_validation_requires_id_and_content() {
        let update = NoteUpdate {
            id: NoteId::new(" "),
            title: "T".to_string(),
            content: "C".to_string(),
            link: String::new(),
        };
        assert!(update.validated().is_err());
    }
}
