//! Per-channel busy markers for the re-post sequence.

use dashmap::DashMap;
use motion_common::ChannelId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Default)]
struct Inner {
    busy: DashMap<ChannelId, u64>,
    next_token: AtomicU64,
}

/// Set of channels with a re-post sequence in flight.
///
/// Cloning yields another handle to the same table.
#[derive(Debug, Clone, Default)]
pub struct ChannelLockTable {
    inner: Arc<Inner>,
}

impl ChannelLockTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `channel` busy unless it already is. Never waits.
    ///
    /// The returned lease clears the marker when dropped.
    #[must_use]
    pub fn try_acquire(&self, channel: ChannelId) -> Option<ChannelLease> {
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        match self.inner.busy.entry(channel) {
            dashmap::mapref::entry::Entry::Occupied(_) => None,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(token);
                trace!(channel_id = %channel, "Channel lock acquired");
                Some(ChannelLease {
                    table: self.clone(),
                    channel,
                    token,
                })
            }
        }
    }

    /// Clears the busy marker for `channel`. Releasing a free channel is a
    /// no-op.
    pub fn release(&self, channel: ChannelId) {
        if self.inner.busy.remove(&channel).is_some() {
            trace!(channel_id = %channel, "Channel lock released");
        }
    }

    /// Whether a sequence is in flight for `channel`.
    #[must_use]
    pub fn is_busy(&self, channel: ChannelId) -> bool {
        self.inner.busy.contains_key(&channel)
    }

    /// Number of channels currently busy.
    #[must_use]
    pub fn busy_count(&self) -> usize {
        self.inner.busy.len()
    }

    fn release_token(&self, channel: ChannelId, token: u64) {
        // A lease only clears its own marker, never one re-acquired after an
        // explicit release.
        if self
            .inner
            .busy
            .remove_if(&channel, |_, held| *held == token)
            .is_some()
        {
            trace!(channel_id = %channel, "Channel lock released");
        }
    }
}

/// Proof that the holder owns a channel's re-post slot.
#[derive(Debug)]
#[must_use = "the channel is released as soon as the lease is dropped"]
pub struct ChannelLease {
    table: ChannelLockTable,
    channel: ChannelId,
    token: u64,
}

impl ChannelLease {
    /// The leased channel.
    #[must_use]
    pub const fn channel(&self) -> ChannelId {
        self.channel
    }
}

impl Drop for ChannelLease {
    fn drop(&mut self) {
        self.table.release_token(self.channel, self.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: ChannelId = ChannelId(7);

    #[test]
    fn test_second_acquire_fails_until_drop() {
        let locks = ChannelLockTable::new();
        let lease = locks.try_acquire(C).unwrap();
        assert!(locks.is_busy(C));
        assert!(locks.try_acquire(C).is_none());
        assert!(locks.try_acquire(ChannelId(8)).is_some());

        drop(lease);
        assert!(!locks.is_busy(C));
        assert!(locks.try_acquire(C).is_some());
    }

    #[test]
    fn test_release_is_idempotent() {
        let locks = ChannelLockTable::new();
        locks.release(C);
        let _lease = locks.try_acquire(C).unwrap();
        locks.release(C);
        locks.release(C);
        assert!(!locks.is_busy(C));
    }

    #[test]
    fn test_stale_lease_does_not_release_new_holder() {
        let locks = ChannelLockTable::new();
        let stale = locks.try_acquire(C).unwrap();
        locks.release(C);

        let current = locks.try_acquire(C).unwrap();
        drop(stale);
        assert!(locks.is_busy(C));
        drop(current);
        assert_eq!(locks.busy_count(), 0);
    }
}
