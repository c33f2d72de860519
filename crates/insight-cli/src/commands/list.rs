use insight_core::store::{NotesEvent, SortOrder};
use insight_core::InsightClient;

use crate::cli::SortArg;
use crate::commands::common::{
    format_note_lines, note_to_list_item, require_signed_in, select_notes, NoteListItem,
};
use crate::error::CliError;

#[derive(Debug)]
pub struct ListOptions {
    pub search: Option<String>,
    pub sort: SortArg,
    pub favourites: bool,
    pub limit: Option<usize>,
    pub as_json: bool,
}

pub async fn run_list(client: &InsightClient, options: ListOptions) -> Result<(), CliError> {
    require_signed_in(client)?;

    let wanted = match options.sort {
        SortArg::Asc => SortOrder::Ascending,
        SortArg::Desc => SortOrder::Descending,
    };
    if client.notes().sort_order != wanted {
        client.apply(NotesEvent::ToggleSort);
    }

    client.fetch_notes().await?;
    if let Some(term) = options.search {
        client.apply(NotesEvent::Search(term));
    }

    let notes = select_notes(&client.notes(), options.favourites, options.limit);

    if options.as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("No notes found.");
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }

    Ok(())
}
