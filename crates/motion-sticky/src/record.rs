//! The persisted sticky record.

use motion_common::MessageId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One sticky message configuration for a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyRecord {
    /// Human-facing name, used to address the record for deletion.
    pub name: String,
    /// Body of the posted message.
    pub content: String,
    /// The most recently posted message, if any. May already be gone.
    #[serde(default)]
    pub last_message_id: Option<MessageId>,
}

impl StickyRecord {
    /// A record that has not been posted yet.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            last_message_id: None,
        }
    }
}

/// The whole store document: guild id → channel id → record.
pub type StickyDocument = BTreeMap<String, BTreeMap<String, StickyRecord>>;
