use insight_core::api::NoteUpdate;
use insight_core::composer::{validate_url, URL_ERROR_MESSAGE};
use insight_core::{Error, InsightClient, Note};

use crate::commands::common::{require_signed_in, resolve_note};
use crate::error::CliError;

/// Field overrides for `insight edit`; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct EditFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub link: Option<String>,
}

pub async fn run_edit(client: &InsightClient, id: &str, fields: EditFields) -> Result<(), CliError> {
    require_signed_in(client)?;
    let note = resolve_note(client, id).await?;

    let update = build_update(&note, fields)?;
    if update_is_noop(&note, &update) {
        println!("{}", note.id);
        return Ok(());
    }

    let updated = client.update_note(&update).await?;
    println!("{}", updated.note.id);
    Ok(())
}

/// Full replacement payload: every field is sent, edited or not.
pub fn build_update(note: &Note, fields: EditFields) -> Result<NoteUpdate, CliError> {
    let link = fields
        .link
        .or_else(|| note.link.clone())
        .unwrap_or_default();
    if !validate_url(&link) {
        return Err(Error::Validation(URL_ERROR_MESSAGE.to_string()).into());
    }

    Ok(NoteUpdate {
        id: note.id.clone(),
        title: fields.title.unwrap_or_else(|| note.title.clone()),
        content: fields.content.unwrap_or_else(|| note.content.clone()),
        link,
    })
}

fn update_is_noop(note: &Note, update: &NoteUpdate) -> bool {
    update.title == note.title
        && update.content == note.content
        && update.link == note.link.clone().unwrap_or_default()
}
