//! One Pace addon for Stremio, backed by Torbox
//!
//! Serves a fixed catalog of One Pace episodes through the Stremio addon
//! protocol and resolves playable URLs by asking Torbox to cache the
//! episode torrents.
//!
//! # Modules
//!
//! - `models` - Episodes, stream sources, Torbox torrents, addon payloads
//! - `catalog` - Static episode registry
//! - `api` - Torbox client
//! - `stream` - Resolution state machine and resolver
//! - `server` - HTTP dispatcher
//! - `config` / `logging` / `cli` - Ambient setup

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod stream;

// Re-export commonly used types
pub use models::{
    EpisodeRef, RemoteTorrent, StreamDescriptor, StreamSource, TorrentFile,
};

pub use api::{DebridApi, SubmitOutcome, TorboxClient};
pub use catalog::{EpisodeRepository, StaticCatalog};
pub use error::{AddonError, Result};
pub use stream::{RetryPolicy, StreamResolver};
