//! Stream resolver
//!
//! Turns an episode's stream sources into playable descriptors by driving
//! each source through the [`Resolution`] state machine against Torbox.
//!
//! A missing stream is a normal outcome for content Torbox has not cached
//! yet. Anything Torbox answers with (HTTP errors, `success: false`,
//! unparsable bodies) is logged and skips only the source that hit it. A
//! missing API key or a transport failure aborts the episode, and the
//! dispatcher renders that as an empty stream list.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::DebridApi;
use crate::catalog::EpisodeRepository;
use crate::error::Result;
use crate::models::{EpisodeRef, StreamDescriptor, StreamSource};
use crate::stream::locks::SubmissionLocks;
use crate::stream::state::{Observation, Outcome, Resolution, RetryPolicy, Target};

/// Resolves catalog episodes into Torbox download URLs
pub struct StreamResolver {
    catalog: Arc<dyn EpisodeRepository>,
    debrid: Arc<dyn DebridApi>,
    policy: RetryPolicy,
    locks: SubmissionLocks,
}

impl StreamResolver {
    pub fn new(
        catalog: Arc<dyn EpisodeRepository>,
        debrid: Arc<dyn DebridApi>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            catalog,
            debrid,
            policy,
            locks: SubmissionLocks::new(),
        }
    }

    /// Streams for a composite or bare stream id
    ///
    /// Unknown ids fail with `NotFound` before any remote call.
    pub async fn streams_for(&self, stream_id: &str) -> Result<Vec<StreamDescriptor>> {
        let episode = self.catalog.episode(stream_id)?;
        self.resolve_episode(&episode).await
    }

    /// Resolve every source of an episode, sequentially and in order
    pub async fn resolve_episode(&self, episode: &EpisodeRef) -> Result<Vec<StreamDescriptor>> {
        let sources = self.catalog.sources(episode);
        debug!(
            stream_id = %episode.stream_id(),
            episode = %episode,
            sources = sources.len(),
            "resolving episode"
        );

        let mut streams = Vec::new();
        for source in &sources {
            if let Some(stream) = self.resolve_source(episode, source).await? {
                streams.push(stream);
            }
        }

        info!(
            episode = %episode.episode_id,
            resolved = streams.len(),
            candidates = sources.len(),
            "episode resolved"
        );
        Ok(streams)
    }

    /// Resolve one source into at most one descriptor
    pub async fn resolve_source(
        &self,
        episode: &EpisodeRef,
        source: &StreamSource,
    ) -> Result<Option<StreamDescriptor>> {
        let Some(info_hash) = source.info_hash.as_deref().filter(|h| !h.is_empty()) else {
            debug!(
                episode = %episode.episode_id,
                source = %source,
                "source has no info hash, skipping"
            );
            return Ok(None);
        };

        let target = Target {
            info_hash: info_hash.to_string(),
            file_index: source.file_index,
        };

        let driven = {
            let _guard = self.locks.acquire(info_hash).await;
            self.drive(&target).await
        };
        let outcome = match driven {
            Ok(outcome) => outcome,
            Err(err) if err.aborts_episode() => return Err(err),
            Err(err) => {
                warn!(source = %source, error = %err, "torbox rejected source, skipping");
                return Ok(None);
            }
        };

        match outcome {
            Outcome::Ready(url) => {
                let labels = self.catalog.stream_labels();
                Ok(Some(StreamDescriptor::new(
                    labels.name,
                    format!("{}\n{}", episode.episode_id, episode.title),
                    url,
                    labels.binge_group,
                )))
            }
            Outcome::NotReady(state) => {
                info!(info_hash, state = %state, "torrent not cached yet");
                Ok(None)
            }
            Outcome::Unmatched => {
                warn!(
                    info_hash,
                    attempts = self.policy.max_attempts,
                    "submitted torrent never appeared in the list"
                );
                Ok(None)
            }
            Outcome::Unavailable(reason) => {
                warn!(info_hash, reason = %reason, "download URL unavailable");
                Ok(None)
            }
        }
    }

    /// Run the state machine to completion for one target
    async fn drive(&self, target: &Target) -> Result<Outcome> {
        let mut state = Resolution::Lookup;

        loop {
            debug!(info_hash = %target.info_hash, state = %state, "resolution step");

            let observation = match &state {
                Resolution::Finished(outcome) => return Ok(outcome.clone()),
                Resolution::Lookup => Observation::Listed(self.debrid.list_torrents().await?),
                Resolution::Submit => {
                    Observation::Submitted(self.debrid.submit_torrent(&target.info_hash).await?)
                }
                Resolution::Reconcile { attempt } => {
                    tokio::time::sleep(self.policy.delay_for(*attempt)).await;
                    Observation::Listed(self.debrid.list_torrents().await?)
                }
                Resolution::ReadyCheck(torrent) => {
                    debug!(torrent = %torrent, "checking readiness");
                    Observation::Inspected
                }
                Resolution::StreamUrl {
                    torrent_id,
                    file_id,
                } => match self
                    .debrid
                    .request_download_url(*torrent_id, *file_id)
                    .await
                {
                    Ok(url) => Observation::UrlIssued(url),
                    Err(e) => Observation::UrlRefused(e.to_string()),
                },
            };

            state = state.advance(observation, target, &self.policy);
        }
    }
}
