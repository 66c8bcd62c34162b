//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use onepace_torbox::api::{DebridApi, SubmitOutcome};
use onepace_torbox::catalog::StaticCatalog;
use onepace_torbox::error::{AddonError, Result};
use onepace_torbox::models::{RemoteTorrent, TorrentFile};

pub const RO_1_HASH: &str = "cdab4a928dbbff643bbe5531f216eb36a60c85af";
pub const OTHER_HASH: &str = "0123456789abcdef0123456789abcdef01234567";

// =============================================================================
// Catalog Fixtures
// =============================================================================

/// Catalog with a single episode (RO_1, S1E1) carrying the given sources
pub fn catalog_with_sources(sources: &[(Option<&str>, u32)]) -> StaticCatalog {
    let mut doc = String::from(
        r#"
version = 1

[addon]
id = "community.onepace.torbox"
version = "1.0.0"
name = "One Pace (Torbox)"
description = "test"
logo = "https://example.com/logo.svg"
catalog_id = "onepace"
catalog_name = "One Pace"
stream_name = "Torbox"
binge_group = "one-pace"

[series]
id = "pp_onepace"
name = "One Pace"
poster = "https://example.com/poster.jpg"

[[episodes]]
id = "RO_1"
season = 1
episode = 1
title = "Romance Dawn, the Dawn of an Adventure"
"#,
    );
    for (hash, file_index) in sources {
        doc.push_str("\n[[episodes.sources]]\n");
        if let Some(hash) = hash {
            doc.push_str(&format!("info_hash = \"{}\"\n", hash));
        }
        doc.push_str(&format!("file_index = {}\n", file_index));
    }
    StaticCatalog::from_toml(&doc).expect("fixture catalog")
}

pub fn torrent(id: u64, hash: &str, state: &str, file_ids: &[u64]) -> RemoteTorrent {
    RemoteTorrent {
        id,
        hash: hash.to_string(),
        name: format!("torrent-{}", id),
        download_state: state.to_string(),
        download_finished: false,
        progress: 1.0,
        files: file_ids
            .iter()
            .map(|&id| TorrentFile {
                id,
                name: format!("file-{}.mkv", id),
                size: 1024,
            })
            .collect(),
    }
}

/// Real reqwest failure: nothing listens on port 1
pub async fn transport_error() -> AddonError {
    let err = reqwest::get("http://127.0.0.1:1/").await.unwrap_err();
    AddonError::Transport(err)
}

// =============================================================================
// Scripted Debrid Service
// =============================================================================

/// Remote call observed by [`ScriptedDebrid`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Submit(String),
    DownloadUrl(u64, u64),
}

/// In-memory debrid service replaying scripted answers
///
/// List answers are consumed in order; once exhausted the list is empty.
/// Download URLs without a scripted answer fail with an upstream error.
#[derive(Default)]
pub struct ScriptedDebrid {
    lists: Mutex<VecDeque<Result<Vec<RemoteTorrent>>>>,
    submissions: Mutex<VecDeque<Result<SubmitOutcome>>>,
    urls: Mutex<HashMap<(u64, u64), String>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedDebrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(self, torrents: Vec<RemoteTorrent>) -> Self {
        self.lists.lock().unwrap().push_back(Ok(torrents));
        self
    }

    pub fn list_error(self, err: AddonError) -> Self {
        self.lists.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn submit(self, outcome: SubmitOutcome) -> Self {
        self.submissions.lock().unwrap().push_back(Ok(outcome));
        self
    }

    pub fn submit_error(self, err: AddonError) -> Self {
        self.submissions.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn url(self, torrent_id: u64, file_id: u64, url: &str) -> Self {
        self.urls
            .lock()
            .unwrap()
            .insert((torrent_id, file_id), url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, wanted: fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| wanted(c)).count()
    }
}

#[async_trait]
impl DebridApi for ScriptedDebrid {
    async fn list_torrents(&self) -> Result<Vec<RemoteTorrent>> {
        self.calls.lock().unwrap().push(Call::List);
        self.lists
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn submit_torrent(&self, info_hash: &str) -> Result<SubmitOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Submit(info_hash.to_string()));
        self.submissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(SubmitOutcome::Pending))
    }

    async fn request_download_url(&self, torrent_id: u64, file_id: u64) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::DownloadUrl(torrent_id, file_id));
        self.urls
            .lock()
            .unwrap()
            .get(&(torrent_id, file_id))
            .cloned()
            .ok_or_else(|| AddonError::Upstream {
                status: 200,
                body: "download not available".to_string(),
            })
    }
}
