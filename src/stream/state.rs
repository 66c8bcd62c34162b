//! Resolution state machine
//!
//! One stream source moves through
//! `Lookup -> (ReadyCheck | Submit) -> Reconcile* -> ReadyCheck -> StreamUrl -> Finished`.
//! [`Resolution::advance`] is pure; the resolver performs the I/O each
//! state asks for and feeds the result back as an [`Observation`].

use std::fmt;
use std::time::Duration;

use crate::api::SubmitOutcome;
use crate::models::RemoteTorrent;

/// Bounded retry policy for the submit/re-list race
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-list attempts after an acknowledged-only submission
    pub max_attempts: u32,
    /// Delay unit; attempt `n` waits `base_delay * n`
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Policy without waits (for tests and offline tooling)
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Linear backoff before re-list attempt `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Worst-case time spent waiting across all attempts
    pub fn total_delay(&self) -> Duration {
        (1..=self.max_attempts).map(|n| self.delay_for(n)).sum()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(2))
    }
}

/// Source being resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub info_hash: String,
    pub file_index: u32,
}

/// Terminal result for one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Direct playback URL
    Ready(String),
    /// Torbox holds the torrent but has not finished caching it
    NotReady(String),
    /// Submission acknowledged but the torrent never showed up in the list
    Unmatched,
    /// Torbox refused the download URL
    Unavailable(String),
}

/// Current step of a resolution attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Lookup,
    Submit,
    Reconcile { attempt: u32 },
    ReadyCheck(RemoteTorrent),
    StreamUrl { torrent_id: u64, file_id: u64 },
    Finished(Outcome),
}

/// Result of the I/O a state requested
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Listed(Vec<RemoteTorrent>),
    Submitted(SubmitOutcome),
    /// ReadyCheck needs no I/O
    Inspected,
    UrlIssued(String),
    UrlRefused(String),
}

impl Resolution {
    /// Move to the next state
    pub fn advance(self, observation: Observation, target: &Target, policy: &RetryPolicy) -> Self {
        match (self, observation) {
            (Resolution::Lookup, Observation::Listed(torrents)) => {
                match find_match(torrents, &target.info_hash) {
                    Some(torrent) => Resolution::ReadyCheck(torrent),
                    None => Resolution::Submit,
                }
            }

            (Resolution::Submit, Observation::Submitted(SubmitOutcome::Created(torrent))) => {
                Resolution::ReadyCheck(torrent)
            }
            (Resolution::Submit, Observation::Submitted(SubmitOutcome::Pending)) => {
                if policy.max_attempts == 0 {
                    Resolution::Finished(Outcome::Unmatched)
                } else {
                    Resolution::Reconcile { attempt: 1 }
                }
            }

            (Resolution::Reconcile { attempt }, Observation::Listed(torrents)) => {
                match find_match(torrents, &target.info_hash) {
                    Some(torrent) => Resolution::ReadyCheck(torrent),
                    None if attempt >= policy.max_attempts => {
                        Resolution::Finished(Outcome::Unmatched)
                    }
                    None => Resolution::Reconcile {
                        attempt: attempt + 1,
                    },
                }
            }

            (Resolution::ReadyCheck(torrent), Observation::Inspected) => {
                if torrent.is_ready() {
                    Resolution::StreamUrl {
                        torrent_id: torrent.id,
                        file_id: torrent.file_id_for(target.file_index),
                    }
                } else {
                    Resolution::Finished(Outcome::NotReady(torrent.download_state))
                }
            }

            (Resolution::StreamUrl { .. }, Observation::UrlIssued(url)) => {
                Resolution::Finished(Outcome::Ready(url))
            }
            (Resolution::StreamUrl { .. }, Observation::UrlRefused(reason)) => {
                Resolution::Finished(Outcome::Unavailable(reason))
            }

            (Resolution::Finished(outcome), _) => Resolution::Finished(outcome),

            (state, observation) => Resolution::Finished(Outcome::Unavailable(format!(
                "unexpected {:?} while in {}",
                observation, state
            ))),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Lookup => write!(f, "LOOKUP"),
            Resolution::Submit => write!(f, "SUBMIT"),
            Resolution::Reconcile { attempt } => write!(f, "RECONCILE({})", attempt),
            Resolution::ReadyCheck(torrent) => write!(f, "READY_CHECK(#{})", torrent.id),
            Resolution::StreamUrl {
                torrent_id,
                file_id,
            } => write!(f, "STREAM_URL(#{}/{})", torrent_id, file_id),
            Resolution::Finished(outcome) => write!(f, "FINISHED({:?})", outcome),
        }
    }
}

/// First torrent whose hash equals `info_hash`, ignoring case
fn find_match(torrents: Vec<RemoteTorrent>, info_hash: &str) -> Option<RemoteTorrent> {
    torrents.into_iter().find(|t| t.matches_hash(info_hash))
}
