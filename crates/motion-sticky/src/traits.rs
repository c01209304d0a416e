//! Collaborator traits the engine talks to.

use crate::error::GatewayError;
use async_trait::async_trait;
use motion_common::{ChannelId, MessageId};
use motion_config::ThemeStore;

/// A sticky message ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSticky {
    /// Message body.
    pub content: String,
    /// 24-bit presentation color.
    pub color: u32,
}

/// The messaging platform, as seen by the engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Deletes a message. A message that no longer exists yields
    /// [`GatewayError::NotFound`].
    async fn delete_message(&self, channel: ChannelId, message: MessageId)
        -> Result<(), GatewayError>;

    /// Posts a sticky message and returns its id.
    async fn publish_message(
        &self,
        channel: ChannelId,
        sticky: &RenderedSticky,
    ) -> Result<MessageId, GatewayError>;
}

/// Source of the color sticky messages are rendered with.
#[cfg_attr(test, mockall::automock)]
pub trait ThemeSource: Send + Sync {
    /// The current presentation color.
    fn presentation_color(&self) -> u32;
}

impl ThemeSource for ThemeStore {
    fn presentation_color(&self) -> u32 {
        self.current().primary_color()
    }
}
