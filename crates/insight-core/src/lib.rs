//! insight-core - Core library for Insight
//!
//! This crate contains the client-side state synchronization layer used by
//! Insight front ends: the HTTP adapter with request de-duplication and
//! forced logout, the remote note and auth operations, the state stores,
//! and the voice-to-note composer.

pub mod api;
pub mod client;
pub mod composer;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod models;
pub mod storage;
pub mod store;
pub mod util;
pub mod voice;

pub use client::InsightClient;
pub use composer::Composer;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{Note, NoteId, NoteSuggestions, User};
