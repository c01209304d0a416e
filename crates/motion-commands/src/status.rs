//! Runtime status shared between the event handler, commands and dashboard.

use motion_common::GuildId;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counts executed commands since start.
#[derive(Debug)]
pub struct CommandStats {
    start_time: Instant,
    commands_ran: AtomicU64,
}

impl Default for CommandStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandStats {
    /// Starts the uptime clock at zero commands.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            commands_ran: AtomicU64::new(0),
        }
    }

    /// Records one command invocation.
    pub fn record(&self) {
        self.commands_ran.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of commands run so far.
    #[must_use]
    pub fn commands_ran(&self) -> u64 {
        self.commands_ran.load(Ordering::Relaxed)
    }

    /// Time since the stats were created.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// A guild the bot is a member of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildSummary {
    /// Guild id.
    pub id: GuildId,
    /// Display name.
    pub name: String,
    /// Icon URL, if the guild has one.
    pub icon: Option<String>,
}

/// Point-in-time copy of [`BotPresence`].
#[derive(Debug, Clone, Default)]
pub struct PresenceSnapshot {
    /// Bot user name once connected.
    pub name: Option<String>,
    /// Bot user tag (`name#discriminator` or the bare name).
    pub tag: Option<String>,
    /// Whether the gateway reported ready.
    pub ready: bool,
    /// Connected guilds keyed by id.
    pub guilds: BTreeMap<GuildId, GuildSummary>,
}

/// Who the bot is and where it is connected, as last seen on the gateway.
#[derive(Debug, Default)]
pub struct BotPresence {
    inner: RwLock<PresenceSnapshot>,
}

impl BotPresence {
    /// An empty, not-yet-ready presence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the bot ready under the given identity.
    pub fn set_ready(&self, name: impl Into<String>, tag: impl Into<String>) {
        let mut inner = self.inner.write();
        inner.name = Some(name.into());
        inner.tag = Some(tag.into());
        inner.ready = true;
    }

    /// Adds or refreshes a guild.
    pub fn upsert_guild(&self, guild: GuildSummary) {
        self.inner.write().guilds.insert(guild.id, guild);
    }

    /// Forgets a guild the bot left or lost.
    pub fn remove_guild(&self, id: GuildId) {
        self.inner.write().guilds.remove(&id);
    }

    /// Connected guilds in id order.
    #[must_use]
    pub fn guilds(&self) -> Vec<GuildSummary> {
        self.inner.read().guilds.values().cloned().collect()
    }

    /// Copies the current state.
    #[must_use]
    pub fn snapshot(&self) -> PresenceSnapshot {
        self.inner.read().clone()
    }
}
