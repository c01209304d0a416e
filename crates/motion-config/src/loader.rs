//! Configuration loading: `.env`, YAML file, environment overrides.

use crate::schema::Config;
use crate::validator::ConfigValidator;
use motion_common::GuildId;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Environment variable naming the YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "MOTIONBOT_CONFIG_PATH";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name.
        var: String,
        /// Parse failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the full configuration.
    ///
    /// Reads `.env` into the process environment, then the YAML file given by
    /// `explicit`, `MOTIONBOT_CONFIG_PATH`, `config.yaml` or `config.yml` (the
    /// first that applies), then applies environment overrides and validates.
    /// Without any file the defaults are used.
    ///
    /// # Errors
    ///
    /// Fails if a named file cannot be read or parsed, an override does not
    /// parse, or the result is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => warn!(error = %e, "Ignoring unreadable .env file"),
        }

        let mut config = match Self::resolve_path(explicit) {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration file");
                Self::read_yaml(&path)?
            }
            None => {
                info!("No configuration file found, using defaults");
                Config::default()
            }
        };

        Self::apply_env_overrides(&mut config, |key| env::var(key).ok())?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable overrides
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load`].
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let mut config = Self::read_yaml(path.as_ref())?;
        Self::apply_env_overrides(&mut config, |key| env::var(key).ok())?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Parse a YAML document. Missing sections take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for malformed YAML.
    pub fn parse_yaml(content: &str) -> Result<Config, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        ["config.yaml", "config.yml"]
            .into_iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Apply environment variable overrides to configuration.
    ///
    /// `lookup` returns the value of a variable, if set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvParseError`] for a numeric variable that does
    /// not parse.
    pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN") {
            config.discord.token = token.trim().to_string();
        }

        if let Some(client_id) = non_empty(lookup("CLIENT_ID")) {
            config.discord.client_id = Some(parse_var("CLIENT_ID", &client_id)?);
        }

        if let Some(guild_id) = lookup("GUILD_ID") {
            config.discord.dev_guild_id = if guild_id.trim().is_empty() {
                None
            } else {
                Some(parse_var::<GuildId>("GUILD_ID", &guild_id)?)
            };
        }

        if let Some(url) = lookup("GSM_BASE_URL") {
            config.keep_alive.base_url = non_empty(Some(url));
        }

        if let Some(flag) = lookup("GSM_KEEP_ALIVE") {
            config.keep_alive.enabled = parse_flag(&flag);
        }

        if let Some(flag) = lookup("DASHBOARD_LAN_ACCESS") {
            config.dashboard.lan_access = parse_flag(&flag);
        }

        if let Some(port) = non_empty(lookup("PORT")) {
            config.dashboard.port = parse_var("PORT", &port)?;
        }

        if let Some(level) = non_empty(lookup("LOG_LEVEL")) {
            config.logging.level = level;
        }

        if let Some(dir) = non_empty(lookup("DATA_DIR")) {
            config.storage.data_dir = PathBuf::from(dir);
        }

        Ok(())
    }
}

/// `true` only for a case-insensitive `"true"`.
#[must_use]
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::EnvParseError {
            var: var.to_string(),
            source: Box::new(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("1"));
        assert!(!parse_flag("false"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("DISCORD_TOKEN", "abc.def.ghi"),
            ("CLIENT_ID", "1234"),
            ("GUILD_ID", "5678"),
            ("GSM_BASE_URL", "https://gsm.example.com/"),
            ("GSM_KEEP_ALIVE", "True"),
            ("DASHBOARD_LAN_ACCESS", "true"),
            ("PORT", "8080"),
            ("DATA_DIR", "/var/lib/motionbot"),
        ]);

        ConfigLoader::apply_env_overrides(&mut config, lookup).unwrap();

        assert_eq!(config.discord.token, "abc.def.ghi");
        assert_eq!(config.discord.client_id, Some(1234));
        assert_eq!(config.discord.dev_guild_id, Some(GuildId(5678)));
        assert_eq!(config.keep_alive.target(), Some("https://gsm.example.com/"));
        assert_eq!(config.dashboard.host(), "0.0.0.0");
        assert_eq!(config.dashboard.port, 8080);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/motionbot"));
    }

    #[test]
    fn test_bad_port_is_reported_with_variable_name() {
        let mut config = Config::default();
        let err = ConfigLoader::apply_env_overrides(&mut config, lookup_from(&[("PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("'PORT'"));
    }

    #[test]
    fn test_empty_guild_id_clears_dev_guild() {
        let mut config = Config::default();
        config.discord.dev_guild_id = Some(GuildId(1));
        ConfigLoader::apply_env_overrides(&mut config, lookup_from(&[("GUILD_ID", "")])).unwrap();
        assert!(config.discord.dev_guild_id.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ConfigLoader::parse_yaml("dashboard:\n  port: 4000\n").unwrap();
        assert_eq!(config.dashboard.port, 4000);
        assert!(config.dashboard.enabled);
        assert_eq!(config.sticky.call_timeout_seconds, 10);
    }
}
