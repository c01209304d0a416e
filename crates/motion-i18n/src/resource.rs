//! Loading of Fluent resources from disk with built-in fallbacks

use crate::error::{I18nError, I18nResult};
use crate::Locale;
use fluent_bundle::FluentResource;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Loads Fluent resources for each locale
#[derive(Debug, Clone)]
pub struct ResourceManager {
    base_dir: Option<PathBuf>,
}

impl ResourceManager {
    /// Create a manager reading from `base_dir`
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: Some(base_dir.as_ref().to_path_buf()),
        }
    }

    /// Create a manager that only serves the built-in resources
    #[must_use]
    pub const fn builtin_only() -> Self {
        Self { base_dir: None }
    }

    /// Get the base directory for resources
    #[must_use]
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// On-disk location of a locale's resource.
    #[must_use]
    pub fn resource_path(&self, locale: Locale) -> Option<PathBuf> {
        self.base_dir
            .as_ref()
            .map(|dir| dir.join(locale.resource_file()))
    }

    /// Load a locale's resource, preferring the on-disk file over the
    /// built-in copy.
    ///
    /// # Errors
    ///
    /// Fails when the on-disk file exists but cannot be read or parsed.
    pub fn load_resource(&self, locale: Locale) -> I18nResult<FluentResource> {
        if let Some(path) = self.resource_path(locale).filter(|p| p.is_file()) {
            return load_file(&path);
        }

        debug!(locale = %locale, "Using built-in resource");
        parse(locale.builtin_resource().to_string(), &format!("builtin:{locale}"))
    }
}

/// Read and parse a Fluent file.
///
/// # Errors
///
/// Fails when the file cannot be read or contains syntax errors.
pub fn load_file(path: &Path) -> I18nResult<FluentResource> {
    debug!(path = %path.display(), "Loading resource file");
    let content = std::fs::read_to_string(path).map_err(|source| I18nError::ResourceLoadError {
        path: path.display().to_string(),
        source,
    })?;
    parse(content, &path.display().to_string())
}

fn parse(content: String, origin: &str) -> I18nResult<FluentResource> {
    FluentResource::try_new(content).map_err(|(_, errors)| {
        let errors: Vec<String> = errors.into_iter().map(|e| format!("{e:?}")).collect();
        error!(origin, ?errors, "Failed to parse Fluent resource");
        I18nError::FluentParseError {
            path: origin.to_string(),
            errors,
        }
    })
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new("locales")
    }
}
