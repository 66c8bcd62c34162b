//! Per info-hash submission locks
//!
//! Two requests resolving the same hash must not both submit it. Whoever
//! holds the lock runs lookup, submit and reconcile; the next holder then
//! finds the torrent during its own lookup. Entries are dropped as soon as
//! nobody holds or waits on them, so the map stays as small as the set of
//! in-flight hashes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

/// Keyed async mutex over lowercase info-hashes
#[derive(Debug, Default)]
pub struct SubmissionLocks {
    slots: Mutex<HashMap<String, Slot>>,
}

/// Held while a hash is being resolved
#[derive(Debug)]
pub struct SubmissionGuard<'a> {
    locks: &'a SubmissionLocks,
    key: String,
    _held: OwnedMutexGuard<()>,
}

impl SubmissionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `info_hash`
    pub async fn acquire(&self, info_hash: &str) -> SubmissionGuard<'_> {
        let key = info_hash.to_ascii_lowercase();
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };
        let held = slot.lock_owned().await;
        SubmissionGuard {
            locks: self,
            key,
            _held: held,
        }
    }

    /// Number of hashes currently held or awaited
    pub fn in_flight(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self
            .locks
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // map + this guard; any more references are waiters
        if slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) <= 2)
        {
            slots.remove(&self.key);
        }
    }
}
