pub mod add;
pub mod auth_cmd;
pub mod common;
pub mod delete;
pub mod edit;
pub mod favorite;
pub mod list;
pub mod show;
pub mod transcripts;
