//! Dedup of surfaced notifications.
//!
//! A client shows at most one notification per unread episode. The set of
//! already-surfaced ids is persisted under a single well-known key as a
//! flat JSON array of integers. An entity can notify on two channels
//! (a new top-level item, or a new reply inside it); the persisted form
//! encodes the reply channel by offsetting the id, while the in-process
//! API keeps the two channels as an explicit pair.

use crate::config;

use super::store::KvStore;

/// Offset that derives the reply-channel storage key from an entity id.
pub const THREAD_KEY_OFFSET: i64 = 10_000;

/// Which notification fired for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyChannel {
    /// The entity itself is new (fresh letter, fresh chat request).
    Primary,
    /// A reply arrived inside an existing entity.
    Thread,
}

/// Notification state per entity: unseen, then notified once, then
/// acknowledged when the user opens the entity. No time-based expiry.
pub struct NotifiedSet<S> {
    store: S,
}

impl<S: KvStore> NotifiedSet<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Whether a notification already fired for this id on this channel.
    /// Checks exactly one storage key; the channels never shadow each other.
    pub fn was_notified(&self, id: i64, channel: NotifyChannel) -> bool {
        self.load().contains(&storage_key(id, channel))
    }

    /// Record that a notification fired. Marking twice is a no-op.
    pub fn mark_notified(&self, id: i64, channel: NotifyChannel) {
        if id >= THREAD_KEY_OFFSET {
            // The offset scheme cannot tell Thread(id) from Primary(id + offset)
            // once ids reach the offset magnitude.
            tracing::warn!(id, "notified id at or above the thread-key offset");
        }
        let key = storage_key(id, channel);
        let mut ids = self.load();
        if !ids.contains(&key) {
            ids.push(key);
            self.save(&ids);
        }
    }

    /// The user opened the entity: forget both channels for this id.
    /// Clearing an id that was never notified is a no-op.
    pub fn clear(&self, id: i64) {
        let mut ids = self.load();
        let before = ids.len();
        ids.retain(|&key| key != id && key != id + THREAD_KEY_OFFSET);
        if ids.len() != before {
            self.save(&ids);
        }
    }

    /// Decode the persisted array. Malformed state reads as empty and is
    /// rewritten wholesale on the next mark, so corruption never spreads.
    fn load(&self) -> Vec<i64> {
        let Some(raw) = self.store.get(config::NOTIFIED_IDS_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<i64>>(&raw) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("notified-id state unreadable, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    fn save(&self, ids: &[i64]) {
        let json = serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string());
        self.store.set(config::NOTIFIED_IDS_KEY, &json);
    }
}

fn storage_key(id: i64, channel: NotifyChannel) -> i64 {
    match channel {
        NotifyChannel::Primary => id,
        NotifyChannel::Thread => id + THREAD_KEY_OFFSET,
    }
}
