//! The sticky re-post engine.

use crate::error::{GatewayError, StickyError};
use crate::lock::ChannelLockTable;
use crate::record::StickyRecord;
use crate::store::StickyStore;
use crate::traits::{MessageGateway, RenderedSticky, ThemeSource};
use motion_common::{ChannelId, GuildId, MessageId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Longest content accepted, the embed description limit.
pub const MAX_CONTENT_CHARS: usize = 4096;

/// What a channel activity notification led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityOutcome {
    /// The sticky was re-posted as the given message and the pointer saved.
    Reposted(MessageId),
    /// A sequence was already running for the channel; the event was dropped.
    Busy,
    /// The channel has no sticky.
    NoSticky,
    /// The record was deleted while the new message was being posted; the
    /// new message was retired again.
    Vanished,
    /// Posting the new message failed; the record is unchanged.
    PublishFailed,
    /// The message was posted but its id could not be saved.
    PointerNotSaved(MessageId),
}

/// Coordinates the store, the channel locks and the messaging gateway.
pub struct StickyEngine {
    store: Arc<StickyStore>,
    locks: ChannelLockTable,
    gateway: Arc<dyn MessageGateway>,
    theme: Arc<dyn ThemeSource>,
    call_timeout: Duration,
}

impl std::fmt::Debug for StickyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StickyEngine")
            .field("store", &self.store.path())
            .field("busy_channels", &self.locks.busy_count())
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl StickyEngine {
    /// Creates an engine. `call_timeout` bounds every gateway call.
    pub fn new(
        store: Arc<StickyStore>,
        locks: ChannelLockTable,
        gateway: Arc<dyn MessageGateway>,
        theme: Arc<dyn ThemeSource>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            store,
            locks,
            gateway,
            theme,
            call_timeout,
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &StickyStore {
        &self.store
    }

    /// The channel lock table.
    #[must_use]
    pub const fn locks(&self) -> &ChannelLockTable {
        &self.locks
    }

    /// Handles a non-bot message in `channel`: retire the posted sticky and
    /// post a fresh one at the bottom.
    ///
    /// Failures are logged and contained; nothing is retried.
    #[instrument(skip_all, fields(guild_id = %guild, channel_id = %channel))]
    pub async fn on_activity(&self, guild: GuildId, channel: ChannelId) -> ActivityOutcome {
        // Must happen before the first await.
        let Some(_lease) = self.locks.try_acquire(channel) else {
            debug!("Sticky sequence already running, dropping event");
            return ActivityOutcome::Busy;
        };

        let Some(record) = self.store.get(guild, channel).await else {
            return ActivityOutcome::NoSticky;
        };

        if let Some(previous) = record.last_message_id {
            self.retire(channel, previous).await;
        }

        let sticky = self.render(&record.content);
        let posted = match self.call(self.gateway.publish_message(channel, &sticky)).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Failed to re-post sticky message");
                return ActivityOutcome::PublishFailed;
            }
        };

        match self.store.update_pointer(guild, channel, posted).await {
            Ok(true) => {
                debug!(message_id = %posted, "Sticky re-posted");
                ActivityOutcome::Reposted(posted)
            }
            Ok(false) => {
                debug!(message_id = %posted, "Sticky deleted mid-sequence, retiring new message");
                self.retire(channel, posted).await;
                ActivityOutcome::Vanished
            }
            Err(e) => {
                error!(message_id = %posted, error = %e, "Failed to save sticky pointer");
                ActivityOutcome::PointerNotSaved(posted)
            }
        }
    }

    /// Creates or replaces the sticky of `channel` and posts it right away.
    ///
    /// A previously posted message for the channel is retired first. This
    /// path does not take the channel lock.
    ///
    /// # Errors
    ///
    /// Rejects an empty name or bad content, and fails if posting or saving
    /// fails. When saving fails the just-posted message is retired again.
    #[instrument(skip_all, fields(guild_id = %guild, channel_id = %channel, name = %name))]
    pub async fn create(
        &self,
        guild: GuildId,
        channel: ChannelId,
        name: &str,
        content: &str,
    ) -> Result<StickyRecord, StickyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StickyError::InvalidName);
        }
        validate_content(content)?;

        if let Some(previous) = self
            .store
            .get(guild, channel)
            .await
            .and_then(|existing| existing.last_message_id)
        {
            self.retire(channel, previous).await;
        }

        let posted = self
            .call(self.gateway.publish_message(channel, &self.render(content)))
            .await
            .map_err(StickyError::Publish)?;

        let record = StickyRecord {
            name: name.to_string(),
            content: content.to_string(),
            last_message_id: Some(posted),
        };
        if let Err(e) = self.store.put(guild, channel, record.clone()).await {
            self.retire(channel, posted).await;
            return Err(e.into());
        }

        info!(name, message_id = %posted, "Sticky created");
        Ok(record)
    }

    /// Deletes the first sticky of `guild` named `name`, retiring its posted
    /// message.
    ///
    /// # Errors
    ///
    /// [`StickyError::NotFound`] when no record has that name, or a store
    /// error if removal fails.
    #[instrument(skip_all, fields(guild_id = %guild, name = %name))]
    pub async fn delete(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<(ChannelId, StickyRecord), StickyError> {
        let (channel, record) = self
            .store
            .find_by_name(guild, name)
            .await
            .ok_or_else(|| StickyError::NotFound(name.to_string()))?;

        self.remove_record(guild, channel, &record).await?;
        Ok((channel, record))
    }

    /// Deletes the sticky of `channel`, provided it is still named `name`.
    ///
    /// Used after a confirmation prompt, so a same-named sticky created in
    /// another channel meanwhile is never touched.
    ///
    /// # Errors
    ///
    /// [`StickyError::NotFound`] when the channel has no sticky or its name
    /// changed, or a store error if removal fails.
    #[instrument(skip_all, fields(guild_id = %guild, channel_id = %channel, name = %name))]
    pub async fn delete_in(
        &self,
        guild: GuildId,
        channel: ChannelId,
        name: &str,
    ) -> Result<StickyRecord, StickyError> {
        let record = self
            .store
            .get(guild, channel)
            .await
            .filter(|record| record.name == name)
            .ok_or_else(|| StickyError::NotFound(name.to_string()))?;

        self.remove_record(guild, channel, &record).await?;
        Ok(record)
    }

    async fn remove_record(
        &self,
        guild: GuildId,
        channel: ChannelId,
        record: &StickyRecord,
    ) -> Result<(), StickyError> {
        if let Some(posted) = record.last_message_id {
            self.retire(channel, posted).await;
        }
        self.store.remove(guild, channel).await?;

        info!(channel_id = %channel, "Sticky deleted");
        Ok(())
    }

    /// Looks up a sticky by name; first match wins when names repeat.
    pub async fn find(&self, guild: GuildId, name: &str) -> Option<(ChannelId, StickyRecord)> {
        self.store.find_by_name(guild, name).await
    }

    /// All stickies of a guild.
    pub async fn list(&self, guild: GuildId) -> Vec<(ChannelId, StickyRecord)> {
        self.store.list(guild).await
    }

    fn render(&self, content: &str) -> RenderedSticky {
        RenderedSticky {
            content: content.to_string(),
            color: self.theme.presentation_color(),
        }
    }

    /// Best-effort delete. A missing message counts as retired.
    async fn retire(&self, channel: ChannelId, message: MessageId) -> bool {
        match self.call(self.gateway.delete_message(channel, message)).await {
            Ok(()) => true,
            Err(GatewayError::NotFound) => {
                debug!(channel_id = %channel, message_id = %message, "Sticky message already gone");
                true
            }
            Err(e) => {
                warn!(channel_id = %channel, message_id = %message, error = %e, "Failed to delete old sticky message");
                false
            }
        }
    }

    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        tokio::time::timeout(self.call_timeout, request)
            .await
            .unwrap_or(Err(GatewayError::Timeout(self.call_timeout)))
    }
}

fn validate_content(content: &str) -> Result<(), StickyError> {
    if content.trim().is_empty() {
        return Err(StickyError::InvalidContent("content is empty".to_string()));
    }
    let length = content.chars().count();
    if length > MAX_CONTENT_CHARS {
        return Err(StickyError::InvalidContent(format!(
            "{length} characters exceeds the limit of {MAX_CONTENT_CHARS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockMessageGateway, MockThemeSource};
    use mockall::predicate::eq;
    use mockall::Sequence;

    const G: GuildId = GuildId(1);
    const C: ChannelId = ChannelId(10);

    fn theme() -> Arc<dyn ThemeSource> {
        let mut theme = MockThemeSource::new();
        theme.expect_presentation_color().return_const(0x58_65_F2_u32);
        Arc::new(theme)
    }

    fn engine(dir: &tempfile::TempDir, gateway: MockMessageGateway) -> StickyEngine {
        StickyEngine::new(
            Arc::new(StickyStore::new(dir.path().join("stickies.json"))),
            ChannelLockTable::new(),
            Arc::new(gateway),
            theme(),
            Duration::from_secs(1),
        )
    }

    async fn seed(engine: &StickyEngine, last: Option<MessageId>) {
        let mut record = StickyRecord::new("rules", "Be nice");
        record.last_message_id = last;
        engine.store().put(G, C, record).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_happens_before_publish() {
        let dir = tempfile::tempdir().unwrap();
        let mut gateway = MockMessageGateway::new();
        let mut seq = Sequence::new();
        gateway
            .expect_delete_message()
            .with(eq(C), eq(MessageId(100)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        gateway
            .expect_publish_message()
            .withf(|channel, sticky| *channel == C && sticky.content == "Be nice" && sticky.color == 0x58_65_F2)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(MessageId(101)));

        let engine = engine(&dir, gateway);
        seed(&engine, Some(MessageId(100))).await;

        assert_eq!(engine.on_activity(G, C).await, ActivityOutcome::Reposted(MessageId(101)));
        assert_eq!(
            engine.store().get(G, C).await.unwrap().last_message_id,
            Some(MessageId(101))
        );
        assert!(!engine.locks().is_busy(C));
    }

    #[tokio::test]
    async fn test_failed_delete_does_not_block_publish() {
        let dir = tempfile::tempdir().unwrap();
        let mut gateway = MockMessageGateway::new();
        gateway
            .expect_delete_message()
            .returning(|_, _| Err(GatewayError::failure("Missing Access")));
        gateway
            .expect_publish_message()
            .returning(|_, _| Ok(MessageId(101)));

        let engine = engine(&dir, gateway);
        seed(&engine, Some(MessageId(100))).await;

        assert_eq!(engine.on_activity(G, C).await, ActivityOutcome::Reposted(MessageId(101)));
    }

    #[tokio::test]
    async fn test_publish_failure_leaves_record_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut gateway = MockMessageGateway::new();
        gateway.expect_delete_message().returning(|_, _| Err(GatewayError::NotFound));
        gateway
            .expect_publish_message()
            .returning(|_, _| Err(GatewayError::failure("Missing Permissions")));

        let engine = engine(&dir, gateway);
        seed(&engine, Some(MessageId(100))).await;
        let before = engine.store().get(G, C).await;

        assert_eq!(engine.on_activity(G, C).await, ActivityOutcome::PublishFailed);
        assert_eq!(engine.store().get(G, C).await, before);
        assert!(!engine.locks().is_busy(C));
    }

    #[tokio::test]
    async fn test_no_sticky_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(&dir, MockMessageGateway::new());
        assert_eq!(engine.on_activity(G, C).await, ActivityOutcome::NoSticky);
    }

    #[tokio::test]
    async fn test_busy_channel_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(&dir, MockMessageGateway::new());
        seed(&engine, None).await;

        let _held = engine.locks().try_acquire(C).unwrap();
        assert_eq!(engine.on_activity(G, C).await, ActivityOutcome::Busy);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input_without_calls() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(&dir, MockMessageGateway::new());

        assert!(matches!(
            engine.create(G, C, "  ", "x").await,
            Err(StickyError::InvalidName)
        ));
        assert!(matches!(
            engine.create(G, C, "rules", " ").await,
            Err(StickyError::InvalidContent(_))
        ));
        let long = "x".repeat(MAX_CONTENT_CHARS + 1);
        assert!(matches!(
            engine.create(G, C, "rules", &long).await,
            Err(StickyError::InvalidContent(_))
        ));
    }

    #[tokio::test]
    async fn test_create_publish_failure_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut gateway = MockMessageGateway::new();
        gateway
            .expect_publish_message()
            .returning(|_, _| Err(GatewayError::failure("Missing Access")));

        let engine = engine(&dir, gateway);
        assert!(matches!(
            engine.create(G, C, "rules", "Be nice").await,
            Err(StickyError::Publish(_))
        ));
        assert!(engine.store().get(G, C).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_name() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(&dir, MockMessageGateway::new());
        assert!(matches!(
            engine.delete(G, "nope").await,
            Err(StickyError::NotFound(name)) if name == "nope"
        ));
    }

    #[tokio::test]
    async fn test_delete_in_only_touches_the_confirmed_channel() {
        let dir = tempfile::tempdir().unwrap();
        let mut gateway = MockMessageGateway::new();
        gateway
            .expect_delete_message()
            .with(eq(C), eq(MessageId(100)))
            .times(1)
            .returning(|_, _| Ok(()));

        let engine = engine(&dir, gateway);
        seed(&engine, Some(MessageId(100))).await;
        let other = ChannelId(5);
        let mut twin = StickyRecord::new("rules", "Other rules");
        twin.last_message_id = Some(MessageId(200));
        engine.store().put(G, other, twin.clone()).await.unwrap();

        assert!(matches!(
            engine.delete_in(G, other, "faq").await,
            Err(StickyError::NotFound(name)) if name == "faq"
        ));

        let removed = engine.delete_in(G, C, "rules").await.unwrap();
        assert_eq!(removed.content, "Be nice");
        assert!(engine.store().get(G, C).await.is_none());
        assert_eq!(engine.store().get(G, other).await, Some(twin));
    }
}
