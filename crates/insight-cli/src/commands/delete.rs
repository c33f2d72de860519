use insight_core::InsightClient;

use crate::commands::common::{require_signed_in, resolve_note};
use crate::error::CliError;

pub async fn run_delete(client: &InsightClient, id: &str) -> Result<(), CliError> {
    require_signed_in(client)?;
    let note = resolve_note(client, id).await?;

    let deleted = client.delete_note(&note.id).await?;
    println!("{}", deleted.deleted_note_id);
    Ok(())
}
