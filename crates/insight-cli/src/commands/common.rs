use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use insight_core::storage::FileStore;
use insight_core::store::NotesState;
use insight_core::util::normalize_text_option;
use insight_core::{ClientConfig, InsightClient, Note, NoteId};
use serde::Serialize;

use crate::error::CliError;
use crate::notifier::TerminalNotifier;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub content: String,
    pub link: Option<String>,
    pub favourite: bool,
    pub created_at: String,
    pub updated_at: String,
    pub relative_time: String,
}

/// Connection options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub backend: Option<String>,
    pub api_version: Option<String>,
    pub storage_path: Option<PathBuf>,
}

pub fn open_client(options: &ClientOptions) -> Result<Arc<InsightClient>, CliError> {
    let config = resolve_config(options.backend.clone(), options.api_version.clone())?;
    let storage_path = resolve_storage_path(options.storage_path.clone());
    tracing::debug!("Using session store at {}", storage_path.display());

    let storage = FileStore::open(storage_path)?;
    let client = InsightClient::new(&config, Arc::new(storage), Arc::new(TerminalNotifier))?;
    Ok(Arc::new(client))
}

/// Flag values override the environment, which overrides the defaults.
pub fn resolve_config(
    backend: Option<String>,
    api_version: Option<String>,
) -> Result<ClientConfig, CliError> {
    Ok(ClientConfig::from_env_with_overrides(backend, api_version)?)
}

pub fn resolve_storage_path(cli_storage_path: Option<PathBuf>) -> PathBuf {
    cli_storage_path
        .or_else(|| std::env::var_os("INSIGHT_STORAGE_PATH").map(PathBuf::from))
        .unwrap_or_else(default_storage_path)
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("insight")
        .join("storage.json")
}

pub fn require_signed_in(client: &InsightClient) -> Result<(), CliError> {
    if client.auth().is_signed_in() {
        Ok(())
    } else {
        Err(CliError::NotLoggedIn)
    }
}

/// Fetch the note list and resolve `note_query` as an exact id or a unique prefix.
pub async fn resolve_note(client: &InsightClient, note_query: &str) -> Result<Note, CliError> {
    let note_query = normalize_note_identifier(note_query)?;
    client.fetch_notes().await?;
    find_note(&client.notes(), &note_query)
}

pub fn find_note(state: &NotesState, note_query: &str) -> Result<Note, CliError> {
    if let Some(note) = state.find(&NoteId::new(note_query)) {
        return Ok(note.clone());
    }

    let matches = state
        .notes
        .iter()
        .filter(|note| note.id.as_str().starts_with(note_query))
        .collect::<Vec<_>>();

    match matches.as_slice() {
        [] => Err(CliError::NoteNotFound(note_query.to_string())),
        [note] => Ok((*note).clone()),
        _ => {
            let options = matches
                .iter()
                .take(3)
                .map(|note| short_id(note.id.as_str()))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{note_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

/// Visible notes after the favourites filter and limit.
pub fn select_notes(state: &NotesState, favourites: bool, limit: Option<usize>) -> Vec<Note> {
    state
        .visible_notes()
        .iter()
        .filter(|note| !favourites || note.is_favourite)
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now = Utc::now();
    notes
        .iter()
        .map(|note| {
            let short_id = short_id(note.id.as_str());
            let marker = if note.is_favourite { '*' } else { ' ' };
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.created_at, now);
            format!("{short_id:<13} {marker} {preview:<40}  {relative_time}")
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        preview: note_preview(note, 80),
        content: note.content.clone(),
        link: note.link.clone(),
        favourite: note.is_favourite,
        created_at: note.created_at.to_rfc3339(),
        updated_at: note.updated_at.to_rfc3339(),
        relative_time: format_relative_time(note.created_at, Utc::now()),
    }
}

/// Title when the server derived one, otherwise the first content line.
pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let title = note.title.trim();
    if title.is_empty() {
        note.preview(max_chars)
    } else if title.chars().count() <= max_chars {
        title.to_string()
    } else {
        let mut truncated = title
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn short_id(id: &str) -> String {
    id.chars().take(13).collect()
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let days = elapsed.num_days();

    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if days < 1 {
        format!("{}h ago", elapsed.num_hours())
    } else if days < 7 {
        format!("{days}d ago")
    } else if days < 30 {
        format!("{}w ago", days / 7)
    } else if days < 365 {
        format!("{}mo ago", days / 30)
    } else {
        format!("{}y ago", days / 365)
    }
}

/// Note content from the arguments, falling back to piped stdin.
pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_text_option(Some(content_parts.join(" "))) {
        return Ok(content);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(CliError::EmptyContent);
    }
    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    normalize_text_option(Some(buffer)).ok_or(CliError::EmptyContent)
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    normalize_text_option(Some(id.to_string())).ok_or(CliError::EmptyNoteId)
}
