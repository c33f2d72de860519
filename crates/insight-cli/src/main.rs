//! Insight CLI - terminal front end for the Insight note service
//!
//! Every command runs through the same client layer a graphical front end
//! would use: the session is restored from the local store, and whatever the
//! command changes is persisted back before exit.

mod cli;
mod commands;
mod error;
mod notifier;


use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::{open_client, ClientOptions};
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, EditFields};
use crate::commands::favorite::run_favorite;
use crate::commands::list::{run_list, ListOptions};
use crate::commands::show::run_show;
use crate::commands::transcripts::run_transcripts;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter())
        .init();

    let cli = Cli::parse();
    let client = open_client(&ClientOptions {
        backend: cli.backend,
        api_version: cli.api_version,
        storage_path: cli.storage_path,
    })?;

    let result = match cli.command {
        Commands::Auth { command } => run_auth(&client, command).await,
        Commands::List {
            search,
            sort,
            favourites,
            limit,
            json,
        } => {
            run_list(
                &client,
                ListOptions {
                    search,
                    sort,
                    favourites,
                    limit,
                    as_json: json,
                },
            )
            .await
        }
        Commands::Show { id, json } => run_show(&client, &id, json).await,
        Commands::Add { content, url } => {
            run_add(Arc::clone(&client), &content, url.as_deref()).await
        }
        Commands::Edit {
            id,
            title,
            content,
            link,
        } => {
            run_edit(
                &client,
                &id,
                EditFields {
                    title,
                    content,
                    link,
                },
            )
            .await
        }
        Commands::Delete { id } => run_delete(&client, &id).await,
        Commands::Favorite { id } => run_favorite(&client, &id).await,
        Commands::Transcripts { command } => run_transcripts(&client, command),
    };

    client.settle().await;
    result
}

fn log_filter() -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match "insight=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}
