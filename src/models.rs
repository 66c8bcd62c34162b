//! Data structures for the One Pace addon
//!
//! Models are organized by where they come from:
//! - **Catalog**: episodes and their candidate torrent sources
//! - **Torbox**: read-only views of torrents owned by the debrid service
//! - **Addon protocol**: JSON payloads served to Stremio

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// =============================================================================
// Catalog Models
// =============================================================================

/// One playable unit of the series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub series_id: String,
    pub season: u32,
    pub episode: u32,
    pub episode_id: String,
    pub title: String,
}

impl EpisodeRef {
    /// Composite stream id (`pp_onepace:1:1`)
    pub fn stream_id(&self) -> String {
        format!("{}:{}:{}", self.series_id, self.season, self.episode)
    }
}

impl fmt::Display for EpisodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} S{:02}E{:02} - {}",
            self.episode_id, self.season, self.episode, self.title
        )
    }
}

/// Candidate torrent (and file within it) for an episode
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamSource {
    #[serde(default, alias = "infoHash")]
    pub info_hash: Option<String>,
    #[serde(default, alias = "fileIdx")]
    pub file_index: u32,
}

impl StreamSource {
    pub fn new(info_hash: impl Into<String>, file_index: u32) -> Self {
        Self {
            info_hash: Some(info_hash.into()),
            file_index,
        }
    }
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.info_hash {
            Some(hash) => write!(f, "{}#{}", hash, self.file_index),
            None => write!(f, "<no hash>#{}", self.file_index),
        }
    }
}

// =============================================================================
// Torbox Models
// =============================================================================

/// Download state reported once Torbox holds the complete data
pub const STATE_COMPLETED: &str = "completed";

/// Download state reported while Torbox seeds a finished torrent
pub const STATE_UPLOADING: &str = "uploading";

/// File inside a remote torrent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentFile {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

/// Torrent record as listed by Torbox
///
/// This is a read-through view: the addon never changes these fields, it
/// only observes what the service reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTorrent {
    pub id: u64,
    pub hash: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_finished: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<TorrentFile>,
}

impl RemoteTorrent {
    /// Case-insensitive info-hash comparison
    pub fn matches_hash(&self, info_hash: &str) -> bool {
        self.hash.eq_ignore_ascii_case(info_hash)
    }

    /// Torbox is inconsistent about which readiness signal it reports, so
    /// any of the three counts.
    pub fn is_ready(&self) -> bool {
        self.download_state.eq_ignore_ascii_case(STATE_COMPLETED)
            || self.download_state.eq_ignore_ascii_case(STATE_UPLOADING)
            || self.download_finished
    }

    /// Map a catalog file index to a Torbox file id
    ///
    /// Falls back to the first listed file when the index is out of range,
    /// and to the index itself when Torbox lists no files at all.
    pub fn file_id_for(&self, file_index: u32) -> u64 {
        self.files
            .get(file_index as usize)
            .or_else(|| self.files.first())
            .map(|file| file.id)
            .unwrap_or(u64::from(file_index))
    }
}

impl fmt::Display for RemoteTorrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} [{}] {:.0}%",
            self.id,
            self.hash,
            self.download_state,
            self.progress * 100.0
        )
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Addon Protocol Models
// =============================================================================

/// Catalog entry advertised in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCatalog {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub name: String,
}

/// Addon manifest served at `/manifest.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub catalogs: Vec<ManifestCatalog>,
}

/// Short series entry listed by the catalog endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaPreview {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub name: String,
    pub poster: String,
    pub genres: Vec<String>,
}

/// Episode entry inside a series meta
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub season: u32,
    pub episode: u32,
    pub id: String,
    pub title: String,
}

/// Full series metadata served by the meta endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaDetail {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub poster: String,
    pub genres: Vec<String>,
    pub description: String,
    pub director: Vec<String>,
    pub logo: String,
    pub background: String,
    pub videos: Vec<Video>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub binge_group: String,
    pub not_web_ready: bool,
}

/// Playable stream returned to Stremio, one per resolved source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDescriptor {
    pub name: String,
    pub title: String,
    pub url: String,
    pub behavior_hints: BehaviorHints,
}

impl StreamDescriptor {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        binge_group: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            url: url.into(),
            behavior_hints: BehaviorHints {
                binge_group: binge_group.into(),
                not_web_ready: false,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub metas: Vec<MetaPreview>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaResponse {
    pub meta: MetaDetail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamsResponse {
    pub streams: Vec<StreamDescriptor>,
}

// =============================================================================
// Unit Tests
// =============================================================================
