use std::sync::Arc;

use insight_core::voice::UnsupportedRecognizer;
use insight_core::{Composer, InsightClient};

use crate::commands::common::{require_signed_in, resolve_note_content};
use crate::error::CliError;

pub async fn run_add(
    client: Arc<InsightClient>,
    content_parts: &[String],
    url: Option<&str>,
) -> Result<(), CliError> {
    require_signed_in(&client)?;
    let content = resolve_note_content(content_parts)?;

    let composer = Composer::new(client, Arc::new(UnsupportedRecognizer));
    composer.set_content(content);
    if let Some(url) = url {
        composer.set_url(url);
    }

    let note = composer.save().await?;
    println!("{}", note.id);
    Ok(())
}
