//! Per-guild and global command enable/disable switches.

use motion_common::{GuildId, JsonDocument, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Contents of the toggle document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandToggles {
    /// Settings applying to every guild without its own entry.
    #[serde(default)]
    pub global: BTreeMap<String, bool>,
    /// Per-guild settings keyed by guild id.
    #[serde(default)]
    pub guilds: BTreeMap<String, BTreeMap<String, bool>>,
}

impl CommandToggles {
    /// Guild setting, then global setting, then enabled.
    #[must_use]
    pub fn is_enabled(&self, command: &str, guild: Option<GuildId>) -> bool {
        guild
            .and_then(|g| self.guilds.get(&g.to_string()))
            .and_then(|settings| settings.get(command))
            .or_else(|| self.global.get(command))
            .copied()
            .unwrap_or(true)
    }

    /// Records a setting for one guild, or globally when `guild` is `None`.
    pub fn set(&mut self, command: &str, enabled: bool, guild: Option<GuildId>) {
        let settings = match guild {
            Some(g) => self.guilds.entry(g.to_string()).or_default(),
            None => &mut self.global,
        };
        settings.insert(command.to_string(), enabled);
    }
}

/// File-backed toggle store. Every query reads the document so that manual
/// edits take effect without a restart.
#[derive(Debug)]
pub struct CommandToggleStore {
    document: JsonDocument<CommandToggles>,
    write_lock: Mutex<()>,
}

impl CommandToggleStore {
    /// Creates a store for the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            document: JsonDocument::new(path),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.document.path()
    }

    /// Current toggles; an unreadable document reads as empty.
    pub async fn snapshot(&self) -> CommandToggles {
        self.document.load().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read command toggles, treating all as enabled");
            CommandToggles::default()
        })
    }

    /// Whether `command` may run in `guild`.
    pub async fn is_enabled(&self, command: &str, guild: Option<GuildId>) -> bool {
        self.snapshot().await.is_enabled(command, guild)
    }

    /// Enables or disables `command` for `guild`, or globally.
    ///
    /// # Errors
    ///
    /// Fails if the existing document is unreadable or cannot be rewritten.
    pub async fn set_status(
        &self,
        command: &str,
        enabled: bool,
        guild: Option<GuildId>,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut toggles = self.document.load().await?;
        toggles.set(command, enabled, guild);
        self.document.save(&toggles).await?;
        info!(command, enabled, guild_id = ?guild.map(GuildId::get), "Command toggle updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let mut toggles = CommandToggles::default();
        assert!(toggles.is_enabled("ping", None));

        toggles.set("ping", false, None);
        assert!(!toggles.is_enabled("ping", None));
        assert!(!toggles.is_enabled("ping", Some(GuildId(1))));

        toggles.set("ping", true, Some(GuildId(1)));
        assert!(toggles.is_enabled("ping", Some(GuildId(1))));
        assert!(!toggles.is_enabled("ping", Some(GuildId(2))));
    }

    #[test]
    fn test_document_shape() {
        let mut toggles = CommandToggles::default();
        toggles.set("sticky", false, Some(GuildId(42)));
        let json = serde_json::to_value(&toggles).unwrap();
        assert_eq!(json["guilds"]["42"]["sticky"], serde_json::json!(false));
        assert!(json["global"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = CommandToggleStore::new(dir.path().join("commands_config.json"));

        store.set_status("ping", false, None).await.unwrap();
        assert!(!store.is_enabled("ping", Some(GuildId(9))).await);

        let reopened = CommandToggleStore::new(store.path());
        assert!(!reopened.is_enabled("ping", None).await);
    }
}
