//! Episode catalog
//!
//! Static, versioned registry mapping episode identifiers to their
//! candidate torrent sources. The default registry is embedded in the
//! binary; a replacement TOML file can be supplied through the config.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{AddonError, Result};
use crate::models::{
    EpisodeRef, Manifest, ManifestCatalog, MetaDetail, MetaPreview, StreamSource, Video,
};

/// Registry shipped with the addon
const EMBEDDED_CATALOG: &str = include_str!("../catalog/onepace.toml");

/// Read-only lookup of episodes and their sources
///
/// Implementations are pure and synchronous: no network or blocking I/O.
pub trait EpisodeRepository: Send + Sync {
    /// Series every composite stream id must reference
    fn series_id(&self) -> &str;

    /// Resolve a `series:season:episode` token or a bare episode code
    fn episode(&self, stream_id: &str) -> Result<EpisodeRef>;

    /// Candidate sources for an episode, in preference order
    fn sources(&self, episode: &EpisodeRef) -> Vec<StreamSource>;

    /// Label and binge group attached to resolved streams
    fn stream_labels(&self) -> StreamLabels;
}

/// Presentation strings for resolved streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLabels {
    pub name: String,
    pub binge_group: String,
}

// =============================================================================
// Catalog Document
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
struct CatalogDocument {
    version: u32,
    addon: AddonSection,
    series: SeriesSection,
    #[serde(default)]
    episodes: Vec<EpisodeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct AddonSection {
    id: String,
    version: String,
    name: String,
    description: String,
    logo: String,
    catalog_id: String,
    catalog_name: String,
    stream_name: String,
    binge_group: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SeriesSection {
    id: String,
    name: String,
    poster: String,
    #[serde(default)]
    preview_genres: Vec<String>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    director: Vec<String>,
    #[serde(default)]
    logo: String,
    #[serde(default)]
    background: String,
}

#[derive(Debug, Clone, Deserialize)]
struct EpisodeEntry {
    id: String,
    season: u32,
    episode: u32,
    title: String,
    #[serde(default)]
    sources: Vec<StreamSource>,
}

// =============================================================================
// Static Catalog
// =============================================================================

/// In-memory catalog loaded from a TOML document
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    doc: CatalogDocument,
}

impl StaticCatalog {
    /// Load the registry compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml(EMBEDDED_CATALOG)
    }

    /// Load a registry from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AddonError::InvalidCatalog(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Parse and validate a registry document
    pub fn from_toml(text: &str) -> Result<Self> {
        let doc: CatalogDocument =
            toml::from_str(text).map_err(|e| AddonError::InvalidCatalog(e.to_string()))?;

        let mut ids = HashSet::new();
        let mut positions = HashSet::new();
        for entry in &doc.episodes {
            if !ids.insert(entry.id.as_str()) {
                return Err(AddonError::InvalidCatalog(format!(
                    "duplicate episode id {}",
                    entry.id
                )));
            }
            if !positions.insert((entry.season, entry.episode)) {
                return Err(AddonError::InvalidCatalog(format!(
                    "duplicate episode S{}E{}",
                    entry.season, entry.episode
                )));
            }
        }

        Ok(Self { doc })
    }

    /// Registry version
    pub fn version(&self) -> u32 {
        self.doc.version
    }

    /// Catalog id advertised in the manifest
    pub fn catalog_id(&self) -> &str {
        &self.doc.addon.catalog_id
    }

    pub fn manifest(&self) -> Manifest {
        let addon = &self.doc.addon;
        Manifest {
            id: addon.id.clone(),
            version: addon.version.clone(),
            name: addon.name.clone(),
            description: addon.description.clone(),
            logo: addon.logo.clone(),
            resources: vec!["catalog".into(), "meta".into(), "stream".into()],
            types: vec!["series".into()],
            catalogs: vec![ManifestCatalog {
                kind: "series".into(),
                id: addon.catalog_id.clone(),
                name: addon.catalog_name.clone(),
            }],
        }
    }

    /// Series previews for a catalog id
    pub fn catalog(&self, catalog_id: &str) -> Result<Vec<MetaPreview>> {
        if catalog_id != self.doc.addon.catalog_id {
            return Err(AddonError::not_found(format!("catalog {}", catalog_id)));
        }
        let series = &self.doc.series;
        Ok(vec![MetaPreview {
            kind: "series".into(),
            id: series.id.clone(),
            name: series.name.clone(),
            poster: series.poster.clone(),
            genres: series.preview_genres.clone(),
        }])
    }

    /// Full series metadata with the episode list
    pub fn meta(&self, series_id: &str) -> Result<MetaDetail> {
        let series = &self.doc.series;
        if series_id != series.id {
            return Err(AddonError::not_found(format!("series {}", series_id)));
        }
        Ok(MetaDetail {
            id: series.id.clone(),
            kind: "series".into(),
            name: series.name.clone(),
            poster: series.poster.clone(),
            genres: series.genres.clone(),
            description: series.description.clone(),
            director: series.director.clone(),
            logo: series.logo.clone(),
            background: series.background.clone(),
            videos: self
                .doc
                .episodes
                .iter()
                .map(|e| Video {
                    season: e.season,
                    episode: e.episode,
                    id: e.id.clone(),
                    title: e.title.clone(),
                })
                .collect(),
        })
    }

    fn entry_by_position(&self, season: u32, episode: u32) -> Option<&EpisodeEntry> {
        self.doc
            .episodes
            .iter()
            .find(|e| e.season == season && e.episode == episode)
    }

    fn entry_by_code(&self, code: &str) -> Option<&EpisodeEntry> {
        self.doc.episodes.iter().find(|e| e.id == code)
    }

    fn to_ref(&self, entry: &EpisodeEntry) -> EpisodeRef {
        EpisodeRef {
            series_id: self.doc.series.id.clone(),
            season: entry.season,
            episode: entry.episode,
            episode_id: entry.id.clone(),
            title: entry.title.clone(),
        }
    }
}

impl EpisodeRepository for StaticCatalog {
    fn series_id(&self) -> &str {
        &self.doc.series.id
    }

    fn episode(&self, stream_id: &str) -> Result<EpisodeRef> {
        let not_found = || AddonError::not_found(format!("stream id {}", stream_id));

        let entry = if stream_id.contains(':') {
            let parts: Vec<&str> = stream_id.split(':').collect();
            let [series, season, episode] = parts.as_slice() else {
                return Err(not_found());
            };
            if *series != self.series_id() {
                return Err(not_found());
            }
            let season: u32 = season.parse().map_err(|_| not_found())?;
            let episode: u32 = episode.parse().map_err(|_| not_found())?;
            self.entry_by_position(season, episode)
        } else {
            self.entry_by_code(stream_id)
        };

        entry.map(|e| self.to_ref(e)).ok_or_else(not_found)
    }

    fn sources(&self, episode: &EpisodeRef) -> Vec<StreamSource> {
        self.entry_by_code(&episode.episode_id)
            .map(|e| e.sources.clone())
            .unwrap_or_default()
    }

    fn stream_labels(&self) -> StreamLabels {
        StreamLabels {
            name: self.doc.addon.stream_name.clone(),
            binge_group: self.doc.addon.binge_group.clone(),
        }
    }
}
