//! Default values for every configuration section.

use crate::schema::{
    DashboardConfig, DiscordConfig, KeepAliveConfig, LogConfig, StickyConfig, StorageConfig,
};
use std::path::PathBuf;

/// Default dashboard port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default seconds between keep-alive pings.
pub const DEFAULT_KEEP_ALIVE_INTERVAL: u64 = 15;

/// Default timeout for a single Discord call made by the sticky engine.
pub const DEFAULT_STICKY_CALL_TIMEOUT: u64 = 10;

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            client_id: None,
            dev_guild_id: None,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: DEFAULT_PORT,
            lan_access: false,
            static_dir: PathBuf::from("web"),
        }
    }
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: None,
            interval_seconds: DEFAULT_KEEP_ALIVE_INTERVAL,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            locales_dir: PathBuf::from("locales"),
            custom_strings: PathBuf::from("custom/strings.ftl"),
            error_log_dir: PathBuf::from("logs"),
            env_file: PathBuf::from(".env"),
        }
    }
}

impl Default for StickyConfig {
    fn default() -> Self {
        Self {
            call_timeout_seconds: DEFAULT_STICKY_CALL_TIMEOUT,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::Config;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.dashboard.port, 3000);
        assert_eq!(config.dashboard.host(), "127.0.0.1");
        assert_eq!(config.keep_alive.interval_seconds, 15);
        assert!(config.keep_alive.target().is_none());
        assert_eq!(config.sticky.call_timeout_seconds, 10);
        assert_eq!(
            config.storage.stickies_file(),
            std::path::Path::new("data/stickyMessages.json")
        );
    }
}
