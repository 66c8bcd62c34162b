//! API clients for external services
//!
//! - Torbox: debrid torrent cache that turns info-hashes into direct URLs

pub mod torbox;

pub use torbox::{magnet_link, DebridApi, SubmitOutcome, TorboxClient};
