//! Configuration schema definitions.

use motion_common::GuildId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for MotionBot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord configuration.
    pub discord: DiscordConfig,
    /// Web dashboard configuration.
    pub dashboard: DashboardConfig,
    /// External API keep-alive pinger.
    pub keep_alive: KeepAliveConfig,
    /// On-disk locations.
    pub storage: StorageConfig,
    /// Sticky message engine tuning.
    pub sticky: StickyConfig,
    /// Logging configuration.
    pub logging: LogConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord bot token.
    pub token: String,
    /// Application (client) id.
    pub client_id: Option<u64>,
    /// Development guild; commands are registered there instead of globally.
    pub dev_guild_id: Option<GuildId>,
}

/// Web dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Whether the dashboard server runs at all.
    pub enabled: bool,
    /// TCP port to listen on.
    pub port: u16,
    /// Bind on all interfaces instead of loopback.
    pub lan_access: bool,
    /// Directory with the static dashboard front-end.
    pub static_dir: PathBuf,
}

impl DashboardConfig {
    /// Host part of the listen address.
    #[must_use]
    pub const fn host(&self) -> &'static str {
        if self.lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}

/// Keep-alive pinger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepAliveConfig {
    /// Whether pinging is enabled.
    pub enabled: bool,
    /// URL to ping.
    pub base_url: Option<String>,
    /// Seconds between pings.
    pub interval_seconds: u64,
}

impl KeepAliveConfig {
    /// The URL to ping, if pinging is enabled and a URL is set.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .filter(|url| self.enabled && !url.trim().is_empty())
    }

    /// Interval between pings.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// On-disk locations of runtime documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON documents.
    pub data_dir: PathBuf,
    /// Directory with one `<code>/main.ftl` per locale.
    pub locales_dir: PathBuf,
    /// Optional Fluent file overriding individual strings.
    pub custom_strings: PathBuf,
    /// Root directory of the per-hour command error logs.
    pub error_log_dir: PathBuf,
    /// The `.env` file the dashboard edits.
    pub env_file: PathBuf,
}

impl StorageConfig {
    /// Sticky message records.
    #[must_use]
    pub fn stickies_file(&self) -> PathBuf {
        self.data_dir.join("stickyMessages.json")
    }

    /// Theme colors.
    #[must_use]
    pub fn theme_file(&self) -> PathBuf {
        self.data_dir.join("theme.json")
    }

    /// Command enable/disable toggles.
    #[must_use]
    pub fn commands_file(&self) -> PathBuf {
        self.data_dir.join("commands_config.json")
    }

    /// Persisted language choice.
    #[must_use]
    pub fn language_file(&self) -> PathBuf {
        self.data_dir.join("settings").join("language.json")
    }
}

/// Sticky message engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickyConfig {
    /// Upper bound for a single Discord call made by the engine.
    pub call_timeout_seconds: u64,
}

impl StickyConfig {
    /// Timeout applied to each Discord call.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_seconds)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `motion_sticky=debug,info`.
    pub level: String,
    /// Emit JSON lines.
    pub json: bool,
    /// Directory for a daily rolling log file.
    pub dir: Option<PathBuf>,
}
