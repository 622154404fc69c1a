//! Active-Stream Registry
//!
//! Tracks in-flight streams so they can be cancelled by id. The registry is
//! the only mutable shared state in the client; entries are added when a
//! stream starts and removed unconditionally when it ends, whichever exit
//! path is taken.

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

/// Maps stream ids to their cancellation tokens.
///
/// Owned by one client instance; there is no global registry. At most one
/// entry exists per id at any time.
#[derive(Debug, Default)]
pub struct StreamRegistry {
    streams: DashMap<String, CancellationToken>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self {
            streams: DashMap::new(),
        }
    }

    /// Register a stream and return its fresh cancellation token.
    ///
    /// Ids are expected to be unique per in-flight call; a stale entry under
    /// the same id is cancelled and replaced so the invariant of one entry
    /// per id holds.
    pub fn register(&self, stream_id: &str) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.streams.insert(stream_id.to_string(), token.clone()) {
            tracing::warn!("replacing active stream with duplicate id {}", stream_id);
            previous.cancel();
        }
        token
    }

    /// Cancel a stream if it is active; returns whether an entry existed.
    ///
    /// Cancelling an unknown or already-finished id is a logged no-op.
    pub fn cancel(&self, stream_id: &str) -> bool {
        match self.streams.remove(stream_id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => {
                tracing::debug!("cancel requested for unknown stream {}", stream_id);
                false
            }
        }
    }

    /// Remove an entry. Safe to call for ids already removed by `cancel`.
    pub fn remove(&self, stream_id: &str) {
        self.streams.remove(stream_id);
    }

    /// Guard that removes the entry when dropped, covering every exit path
    /// of a stream.
    pub(crate) fn removal_guard<'a>(&'a self, stream_id: &'a str) -> RemovalGuard<'a> {
        RemovalGuard {
            registry: self,
            stream_id,
        }
    }

    /// Whether an entry exists for this id.
    pub fn contains(&self, stream_id: &str) -> bool {
        self.streams.contains_key(stream_id)
    }

    /// Number of registered streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

/// Removes a registry entry on drop.
pub(crate) struct RemovalGuard<'a> {
    registry: &'a StreamRegistry,
    stream_id: &'a str,
}

impl Drop for RemovalGuard<'_> {
    fn drop(&mut self) {
        self.registry.remove(self.stream_id);
    }
}
