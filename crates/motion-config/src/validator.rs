//! Runtime validation of a loaded configuration.

use crate::loader::ConfigError;
use crate::schema::Config;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting every problem at once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] listing all failed checks.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if let Err(e) = validate_discord_token(&config.discord.token) {
            problems.push(e);
        }

        if config.dashboard.enabled && config.dashboard.port == 0 {
            problems.push("dashboard.port must be non-zero".to_string());
        }

        if !(1..=120).contains(&config.sticky.call_timeout_seconds) {
            problems.push("sticky.call_timeout_seconds must be between 1 and 120".to_string());
        }

        if config.keep_alive.interval_seconds == 0 {
            problems.push("keep_alive.interval_seconds must be at least 1".to_string());
        }

        if config.keep_alive.enabled && config.keep_alive.target().is_none() {
            problems.push("keep_alive is enabled but GSM_BASE_URL is not set".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(problems.join("; ")))
        }
    }
}

/// Checks that a bot token is present and has no embedded whitespace.
///
/// # Errors
///
/// Returns a description of the problem.
pub fn validate_discord_token(token: &str) -> Result<(), String> {
    if token.is_empty() {
        return Err("DISCORD_TOKEN cannot be empty".to_string());
    }
    if token.chars().any(char::is_whitespace) {
        return Err("DISCORD_TOKEN contains whitespace".to_string());
    }
    Ok(())
}
