//! File-backed sticky record store.

use crate::error::StoreError;
use crate::record::{StickyDocument, StickyRecord};
use motion_common::{ChannelId, GuildId, JsonDocument, MessageId};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Durable mapping of (guild, channel) to [`StickyRecord`].
///
/// Every call reads the whole document and mutating calls write it back, all
/// under one internal lock, so each call is atomic on its own. Nothing spans
/// two calls.
#[derive(Debug)]
pub struct StickyStore {
    document: JsonDocument<StickyDocument>,
    lock: Mutex<()>,
}

impl StickyStore {
    /// Creates a store for the document at `path`. A missing file is an
    /// empty store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            document: JsonDocument::new(path),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.document.path()
    }

    async fn read(&self) -> Result<StickyDocument, StoreError> {
        self.document.load().await.map_err(StoreError::Read)
    }

    async fn write(&self, document: &StickyDocument) -> Result<(), StoreError> {
        self.document.save(document).await.map_err(StoreError::Write)
    }

    /// Like [`StickyStore::get`] but reports read failures.
    ///
    /// # Errors
    ///
    /// [`StoreError::Read`] when the document is unreadable.
    pub async fn try_get(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<Option<StickyRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read().await?;
        Ok(document
            .get_mut(&guild.to_string())
            .and_then(|channels| channels.remove(&channel.to_string())))
    }

    /// The record for a channel. Read failures are logged and read as absent.
    pub async fn get(&self, guild: GuildId, channel: ChannelId) -> Option<StickyRecord> {
        self.try_get(guild, channel).await.unwrap_or_else(|e| {
            warn!(guild_id = %guild, channel_id = %channel, error = %e, "Treating sticky as absent");
            None
        })
    }

    /// Inserts or replaces the record for a channel.
    ///
    /// # Errors
    ///
    /// Fails if the document cannot be read or written; it is left unchanged.
    pub async fn put(
        &self,
        guild: GuildId,
        channel: ChannelId,
        record: StickyRecord,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read().await?;
        document
            .entry(guild.to_string())
            .or_default()
            .insert(channel.to_string(), record);
        self.write(&document).await?;
        debug!(guild_id = %guild, channel_id = %channel, "Sticky saved");
        Ok(())
    }

    /// Removes the record for a channel; absent records are a no-op.
    ///
    /// # Errors
    ///
    /// Fails if the document cannot be read or written.
    pub async fn remove(&self, guild: GuildId, channel: ChannelId) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read().await?;
        let guild_key = guild.to_string();

        let Some(channels) = document.get_mut(&guild_key) else {
            return Ok(());
        };
        if channels.remove(&channel.to_string()).is_none() {
            return Ok(());
        }
        if channels.is_empty() {
            document.remove(&guild_key);
        }

        self.write(&document).await?;
        debug!(guild_id = %guild, channel_id = %channel, "Sticky removed");
        Ok(())
    }

    /// Points an existing record at a newly posted message.
    ///
    /// Returns `false`, without writing, when the record no longer exists.
    ///
    /// # Errors
    ///
    /// Fails if the document cannot be read or written.
    pub async fn update_pointer(
        &self,
        guild: GuildId,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read().await?;

        let Some(record) = document
            .get_mut(&guild.to_string())
            .and_then(|channels| channels.get_mut(&channel.to_string()))
        else {
            return Ok(false);
        };
        record.last_message_id = Some(message);

        self.write(&document).await?;
        Ok(true)
    }

    /// First record in the guild whose name is `name`, in channel-key order.
    /// Read failures are logged and read as absent.
    pub async fn find_by_name(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Option<(ChannelId, StickyRecord)> {
        self.list(guild)
            .await
            .into_iter()
            .find(|(_, record)| record.name == name)
    }

    /// Every record of a guild, in channel-key order. Read failures are
    /// logged and read as empty.
    pub async fn list(&self, guild: GuildId) -> Vec<(ChannelId, StickyRecord)> {
        let channels = {
            let _guard = self.lock.lock().await;
            match self.read().await {
                Ok(mut document) => document.remove(&guild.to_string()).unwrap_or_default(),
                Err(e) => {
                    warn!(guild_id = %guild, error = %e, "Treating guild stickies as empty");
                    return Vec::new();
                }
            }
        };

        channels
            .into_iter()
            .filter_map(|(key, record)| match key.parse::<ChannelId>() {
                Ok(channel) => Some((channel, record)),
                Err(_) => {
                    warn!(guild_id = %guild, key = %key, "Skipping sticky with malformed channel id");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: GuildId = GuildId(1);
    const C: ChannelId = ChannelId(10);

    fn store() -> (tempfile::TempDir, StickyStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StickyStore::new(dir.path().join("stickyMessages.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let (_dir, store) = store();
        assert!(store.get(G, C).await.is_none());

        store.put(G, C, StickyRecord::new("rules", "Be nice")).await.unwrap();
        assert_eq!(store.get(G, C).await.unwrap().content, "Be nice");

        store.remove(G, C).await.unwrap();
        assert!(store.get(G, C).await.is_none());
        // Removing again is a no-op.
        store.remove(G, C).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_pointer_on_missing_record_is_noop() {
        let (_dir, store) = store();
        assert!(!store.update_pointer(G, C, MessageId(5)).await.unwrap());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_update_pointer_changes_only_pointer() {
        let (_dir, store) = store();
        store.put(G, C, StickyRecord::new("rules", "Be nice")).await.unwrap();
        assert!(store.update_pointer(G, C, MessageId(5)).await.unwrap());

        let record = store.get(G, C).await.unwrap();
        assert_eq!(record.name, "rules");
        assert_eq!(record.content, "Be nice");
        assert_eq!(record.last_message_id, Some(MessageId(5)));
    }

    #[tokio::test]
    async fn test_corrupt_document_degrades_reads_and_blocks_writes() {
        let (_dir, store) = store();
        std::fs::write(store.path(), "{ corrupt").unwrap();

        assert!(store.get(G, C).await.is_none());
        assert!(store.find_by_name(G, "rules").await.is_none());
        assert!(matches!(
            store.put(G, C, StickyRecord::new("a", "b")).await,
            Err(StoreError::Read(_))
        ));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{ corrupt");
    }
}
