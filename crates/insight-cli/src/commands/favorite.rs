use insight_core::InsightClient;

use crate::commands::common::{require_signed_in, resolve_note};
use crate::error::CliError;

pub async fn run_favorite(client: &InsightClient, id: &str) -> Result<(), CliError> {
    require_signed_in(client)?;
    let note = resolve_note(client, id).await?;

    let toggle = client.toggle_favorite(&note.id).await?;
    let state = if toggle.is_favorite {
        "favourite"
    } else {
        "not favourite"
    };
    println!("{} {state}", note.id);
    Ok(())
}
