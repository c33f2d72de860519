use insight_core::api::NoteDetail;
use insight_core::models::RelatedResource;
use insight_core::InsightClient;

use crate::commands::common::{require_signed_in, resolve_note};
use crate::error::CliError;

pub async fn run_show(client: &InsightClient, id: &str, as_json: bool) -> Result<(), CliError> {
    require_signed_in(client)?;
    let note = resolve_note(client, id).await?;

    let detail = client.fetch_note(&note.id).await?;
    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "note": detail.note,
                "suggestions": detail.suggestions,
            }))?
        );
    } else {
        for line in format_detail_lines(&detail) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_detail_lines(detail: &NoteDetail) -> Vec<String> {
    let note = &detail.note;
    let mut lines = Vec::new();

    let title = if note.title.trim().is_empty() {
        "(untitled)"
    } else {
        note.title.as_str()
    };
    let marker = if note.is_favourite { " *" } else { "" };
    lines.push(format!("{title}{marker}"));
    lines.push(format!(
        "{}  created {}",
        note.id,
        note.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    if let Some(link) = &note.link {
        lines.push(format!("Link: {link}"));
    }
    lines.push(String::new());
    lines.extend(note.content.lines().map(str::to_string));

    let suggestions = &detail.suggestions;
    if suggestions.is_empty() {
        return lines;
    }

    if !suggestions.related_topics.is_empty() {
        lines.push(String::new());
        lines.push(format!("Topics: {}", suggestions.related_topics.join(", ")));
    }
    for (heading, resources) in [
        ("Articles", &suggestions.related_articles),
        ("Websites", &suggestions.related_websites),
        ("Videos", &suggestions.related_videos),
        ("Images", &suggestions.related_images),
        ("Blogs", &suggestions.related_blogs),
        ("Links", &suggestions.related_links),
    ] {
        push_resources(&mut lines, heading, resources);
    }
    lines
}

fn push_resources(lines: &mut Vec<String>, heading: &str, resources: &[RelatedResource]) {
    if resources.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("{heading}:"));
    for resource in resources {
        if resource.description.is_empty() {
            lines.push(format!("  - {} <{}>", resource.title, resource.url));
        } else {
            lines.push(format!(
                "  - {} <{}>: {}",
                resource.title, resource.url, resource.description
            ));
        }
    }
}
