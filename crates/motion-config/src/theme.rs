//! Theme colors shared by the bot embeds and the dashboard.

use arc_swap::ArcSwap;
use motion_common::{is_hex_color, parse_hex_color, JsonDocument, MotionError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Default primary color (Discord blurple).
pub const DEFAULT_PRIMARY: &str = "#5865F2";
/// Default accent color.
pub const DEFAULT_ACCENT: &str = "#EB459E";
/// Default error color.
pub const DEFAULT_ERROR: &str = "#ED4245";

/// The three theme colors, each `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Main embed color.
    pub primary: String,
    /// Highlight color used by the dashboard.
    pub accent: String,
    /// Color of destructive confirmations and failures.
    pub error: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY.to_string(),
            accent: DEFAULT_ACCENT.to_string(),
            error: DEFAULT_ERROR.to_string(),
        }
    }
}

impl Theme {
    /// Checks that every color is `#RRGGBB`.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("primary", &self.primary),
            ("accent", &self.accent),
            ("error", &self.error),
        ] {
            if !is_hex_color(value) {
                return Err(MotionError::validation_field(
                    format!("'{value}' is not a #RRGGBB color"),
                    field,
                ));
            }
        }
        Ok(())
    }

    /// Primary color as a 24-bit value.
    #[must_use]
    pub fn primary_color(&self) -> u32 {
        color_or(&self.primary, DEFAULT_PRIMARY)
    }

    /// Accent color as a 24-bit value.
    #[must_use]
    pub fn accent_color(&self) -> u32 {
        color_or(&self.accent, DEFAULT_ACCENT)
    }

    /// Error color as a 24-bit value.
    #[must_use]
    pub fn error_color(&self) -> u32 {
        color_or(&self.error, DEFAULT_ERROR)
    }
}

fn color_or(value: &str, fallback: &str) -> u32 {
    parse_hex_color(value)
        .or_else(|| parse_hex_color(fallback))
        .unwrap_or_default()
}

/// Cached, file-backed theme.
///
/// Read once at startup and on [`ThemeStore::reload`]; reads in between are
/// lock-free.
#[derive(Debug)]
pub struct ThemeStore {
    document: JsonDocument<Theme>,
    current: ArcSwap<Theme>,
}

impl ThemeStore {
    /// Loads the theme at `path`. An unreadable or invalid document falls back
    /// to the default theme.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let document = JsonDocument::new(path);
        let theme = Self::read(&document).await;
        Self {
            document,
            current: ArcSwap::from_pointee(theme),
        }
    }

    async fn read(document: &JsonDocument<Theme>) -> Theme {
        match document.load().await {
            Ok(theme) => match theme.validate() {
                Ok(()) => theme,
                Err(e) => {
                    warn!(error = %e, "Theme has invalid colors, using defaults");
                    Theme::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to read theme, using defaults");
                Theme::default()
            }
        }
    }

    /// The theme currently in effect.
    #[must_use]
    pub fn current(&self) -> Arc<Theme> {
        self.current.load_full()
    }

    /// Re-reads the theme from disk.
    pub async fn reload(&self) -> Arc<Theme> {
        let theme = Arc::new(Self::read(&self.document).await);
        self.current.store(Arc::clone(&theme));
        info!("Theme reloaded");
        theme
    }

    /// Validates, persists and activates `theme`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad color or a storage error if the
    /// document cannot be written; the active theme is unchanged in both cases.
    pub async fn set(&self, theme: Theme) -> Result<()> {
        theme.validate()?;
        self.document.save(&theme).await?;
        self.current.store(Arc::new(theme));
        info!("Theme updated");
        Ok(())
    }
}
