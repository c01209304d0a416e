//! Discord adapter for the sticky engine's messaging collaborator.

use async_trait::async_trait;
use motion_common::{ChannelId, MessageId};
use motion_sticky::{GatewayError, MessageGateway, RenderedSticky};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::debug;

/// Posts and deletes sticky embeds through the Discord REST API.
#[derive(Clone)]
pub struct SerenityGateway {
    http: Arc<serenity::Http>,
}

impl SerenityGateway {
    /// Wraps the client's HTTP handle.
    pub const fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

impl std::fmt::Debug for SerenityGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerenityGateway").finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageGateway for SerenityGateway {
    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), GatewayError> {
        let channel_id = serenity::ChannelId::new(checked_id(channel.get())?);
        let message_id = serenity::MessageId::new(checked_id(message.get())?);

        self.http
            .delete_message(channel_id, message_id, None)
            .await
            .map_err(classify)
    }

    async fn publish_message(
        &self,
        channel: ChannelId,
        sticky: &RenderedSticky,
    ) -> Result<MessageId, GatewayError> {
        let channel_id = serenity::ChannelId::new(checked_id(channel.get())?);
        let embed = serenity::CreateEmbed::new()
            .description(&sticky.content)
            .colour(sticky.color);

        let posted = channel_id
            .send_message(&self.http, serenity::CreateMessage::new().embed(embed))
            .await
            .map_err(classify)?;

        debug!(channel_id = %channel, message_id = %posted.id, "Posted sticky embed");
        Ok(MessageId(posted.id.get()))
    }
}

/// Serenity id constructors panic on out-of-range values, which a hand-edited
/// store could contain.
fn checked_id(raw: u64) -> Result<u64, GatewayError> {
    if raw == 0 || raw == u64::MAX {
        Err(GatewayError::failure(format!("invalid Discord id {raw}")))
    } else {
        Ok(raw)
    }
}

fn classify(error: serenity::Error) -> GatewayError {
    if is_not_found(&error) {
        GatewayError::NotFound
    } else {
        GatewayError::failure_with_source("Discord request failed", error)
    }
}

fn is_not_found(error: &serenity::Error) -> bool {
    match error {
        serenity::Error::Http(http) => http
            .status_code()
            .is_some_and(|status| status.as_u16() == 404),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_id_rejects_out_of_range() {
        assert_eq!(checked_id(1_467_345_984_039_162_050).unwrap(), 1_467_345_984_039_162_050);
        assert!(checked_id(0).is_err());
        assert!(checked_id(u64::MAX).is_err());
    }

    #[test]
    fn test_other_errors_are_failures() {
        let error = classify(serenity::Error::Other("gateway closed"));
        assert!(!error.is_not_found());
    }
}
