use insight_core::voice::TranscriptRecord;
use insight_core::InsightClient;

use crate::cli::TranscriptCommands;
use crate::error::CliError;

pub fn run_transcripts(client: &InsightClient, command: TranscriptCommands) -> Result<(), CliError> {
    match command {
        TranscriptCommands::List { json } => {
            let history = client.voice().history;
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else if history.is_empty() {
                println!("No saved transcripts.");
            } else {
                for line in format_transcript_lines(&history) {
                    println!("{line}");
                }
            }
        }
        TranscriptCommands::Remove { id } => {
            if !client.remove_transcript(id.trim())? {
                return Err(CliError::TranscriptNotFound(id));
            }
            println!("{}", id.trim());
        }
        TranscriptCommands::Clear => client.clear_transcripts()?,
    }
    Ok(())
}

pub fn format_transcript_lines(history: &[TranscriptRecord]) -> Vec<String> {
    history
        .iter()
        .map(|record| {
            format!(
                "{}  {}  {:>4}s  {}",
                record.id,
                record.timestamp.format("%Y-%m-%d %H:%M"),
                record.duration,
                record.content
            )
        })
        .collect()
}
