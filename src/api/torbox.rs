//! Torbox debrid API client
//!
//! Lists the account's torrents, submits magnet links and exchanges a
//! cached torrent file for a direct download URL.
//! API docs: https://api-docs.torbox.app

use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{AddonError, Result};
use crate::models::RemoteTorrent;

/// Per-request timeout for Torbox calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Public trackers appended to every magnet link
///
/// Without announce URLs Torbox relies on DHT alone, which rarely finds
/// peers for the older releases in the catalog.
pub const PUBLIC_TRACKERS: &[&str] = &[
    "udp://tracker.opentrackr.org:1337/announce",
    "udp://open.stealth.si:80/announce",
    "udp://tracker.torrent.eu.org:451/announce",
    "udp://exodus.desync.com:6969/announce",
    "udp://tracker.openbittorrent.com:6969/announce",
    "udp://open.demonii.com:1337/announce",
];

pub const DEFAULT_BASE_URL: &str = "https://api.torbox.app/v1/api";

/// Build a magnet link for an info-hash with the public tracker list
pub fn magnet_link(info_hash: &str) -> String {
    let mut magnet = format!("magnet:?xt=urn:btih:{}", info_hash);
    for tracker in PUBLIC_TRACKERS {
        magnet.push_str("&tr=");
        magnet.push_str(&urlencoding::encode(tracker));
    }
    magnet
}

/// What Torbox answered to a magnet submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Full torrent record returned inline
    Created(RemoteTorrent),
    /// Only an acknowledgement; the record has to be found by re-listing
    Pending,
}

/// Operations the stream resolver needs from a debrid service
#[async_trait]
pub trait DebridApi: Send + Sync {
    /// All torrents on the account
    async fn list_torrents(&self) -> Result<Vec<RemoteTorrent>>;

    /// Register a torrent by info-hash
    async fn submit_torrent(&self, info_hash: &str) -> Result<SubmitOutcome>;

    /// Direct playback URL for one file of a cached torrent
    async fn request_download_url(&self, torrent_id: u64, file_id: u64) -> Result<String>;
}

/// Standard Torbox response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn failure_reason(&self) -> String {
        self.detail
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "no detail".to_string())
    }
}

/// Torbox API client
pub struct TorboxClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl TorboxClient {
    /// Create a client against the public Torbox API
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    ///
    /// Fails when the HTTP client cannot be built (TLS backend missing).
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Whether an API key is available
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn token(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AddonError::Config("TORBOX_API_KEY is not set".to_string()))
    }

    /// Turn a raw response into its envelope, mapping HTTP failures
    async fn envelope<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %body, "torbox request failed");
            return Err(AddonError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| AddonError::InvalidResponse(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl DebridApi for TorboxClient {
    async fn list_torrents(&self) -> Result<Vec<RemoteTorrent>> {
        let token = self.token()?;
        let response = self
            .client
            .get(format!("{}/torrents/mylist", self.base_url))
            .query(&[("bypass_cache", "true")])
            .bearer_auth(token)
            .send()
            .await?;

        let envelope: Envelope<Vec<RemoteTorrent>> = Self::envelope(response).await?;
        if !envelope.success {
            return Err(AddonError::Upstream {
                status: 200,
                body: envelope.failure_reason(),
            });
        }

        let torrents = envelope.data.unwrap_or_default();
        tracing::debug!(count = torrents.len(), "listed torrents");
        Ok(torrents)
    }

    async fn submit_torrent(&self, info_hash: &str) -> Result<SubmitOutcome> {
        let token = self.token()?;
        let magnet = magnet_link(info_hash);
        let response = self
            .client
            .post(format!("{}/torrents/createtorrent", self.base_url))
            .bearer_auth(token)
            .form(&[("magnet", magnet.as_str())])
            .send()
            .await?;

        let envelope: Envelope<serde_json::Value> = Self::envelope(response).await?;
        if !envelope.success {
            return Err(AddonError::Upstream {
                status: 200,
                body: envelope.failure_reason(),
            });
        }

        // createtorrent usually answers with {torrent_id, hash, auth_id};
        // only a complete record can skip reconciliation.
        let outcome = envelope
            .data
            .and_then(|data| serde_json::from_value::<RemoteTorrent>(data).ok())
            .map(SubmitOutcome::Created)
            .unwrap_or(SubmitOutcome::Pending);

        tracing::info!(
            info_hash,
            created = matches!(outcome, SubmitOutcome::Created(_)),
            "submitted magnet"
        );
        Ok(outcome)
    }

    async fn request_download_url(&self, torrent_id: u64, file_id: u64) -> Result<String> {
        let token = self.token()?;
        let response = self
            .client
            .get(format!("{}/torrents/requestdl", self.base_url))
            .query(&[
                ("token", token.to_string()),
                ("torrent_id", torrent_id.to_string()),
                ("file_id", file_id.to_string()),
                ("zip_link", "false".to_string()),
            ])
            .bearer_auth(token)
            .send()
            .await?;

        let envelope: Envelope<String> = Self::envelope(response).await?;
        if !envelope.success {
            return Err(AddonError::Upstream {
                status: 200,
                body: envelope.failure_reason(),
            });
        }

        envelope
            .data
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AddonError::Upstream {
                status: 200,
                body: format!("no download URL for torrent {} file {}", torrent_id, file_id),
            })
    }
}
