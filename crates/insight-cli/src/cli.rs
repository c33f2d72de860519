use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "insight")]
#[command(about = "Take notes and browse AI suggestions from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend host, e.g. http://localhost:5000 (defaults to INSIGHT_BACKEND)
    #[arg(long, global = true, value_name = "URL")]
    pub backend: Option<String>,

    /// API version path segment (defaults to INSIGHT_API_VERSION or v1)
    #[arg(long, global = true, value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Optional path to the local session store
    #[arg(long, global = true, value_name = "PATH")]
    pub storage_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign up, log in, or inspect the current session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// List notes
    List {
        /// Only show notes whose title or content contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Creation-date sort order
        #[arg(long, value_enum, default_value_t = SortArg::Desc)]
        sort: SortArg,
        /// Only show favourite notes
        #[arg(long)]
        favourites: bool,
        /// Number of notes to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a note with its suggestions
    Show {
        /// Note ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note content
        content: Vec<String>,
        /// Attach a link (must start with http:// or https://)
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },
    /// Replace an existing note's fields
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// New title (keeps the current one when omitted)
        #[arg(long)]
        title: Option<String>,
        /// New content (keeps the current one when omitted)
        #[arg(long)]
        content: Option<String>,
        /// New link; pass an empty string to remove it
        #[arg(long, value_name = "URL")]
        link: Option<String>,
    },
    /// Delete a note
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Toggle a note's favourite flag
    #[command(alias = "favourite")]
    Favorite {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Manage saved voice transcripts
    Transcripts {
        #[command(subcommand)]
        command: TranscriptCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortArg {
    Asc,
    Desc,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account and start a session
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
        /// Password confirmation; never sent to the server
        #[arg(long, value_name = "PASSWORD")]
        confirm: String,
    },
    /// Log in with email and password
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// End the session on the server and locally
    Logout,
    /// Show the locally stored session
    Status,
    /// Refresh the profile from the server
    Profile,
}

#[derive(Subcommand)]
pub enum TranscriptCommands {
    /// List saved transcripts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove one transcript
    Remove {
        /// Transcript ID
        id: String,
    },
    /// Remove every saved transcript
    Clear,
}
