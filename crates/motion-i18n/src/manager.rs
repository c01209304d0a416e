//! Internationalization manager

use crate::bundle::LocaleBundle;
use crate::error::{I18nError, I18nResult};
use crate::resource::{load_file, ResourceManager};
use crate::Locale;
use fluent_bundle::FluentArgs;
use motion_common::JsonDocument;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Persisted language choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSettings {
    /// Language code of the active locale.
    pub language: String,
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            language: Locale::default().code().to_string(),
        }
    }
}

/// Translates message keys for the bot.
///
/// Lookup order: custom override file, current language, default language,
/// then the key itself.
#[derive(Debug)]
pub struct I18nManager {
    default_locale: Locale,
    resources: ResourceManager,
    custom_path: Option<PathBuf>,
    settings: JsonDocument<LanguageSettings>,
    current: RwLock<Locale>,
    bundles: RwLock<HashMap<Locale, Arc<LocaleBundle>>>,
    custom: RwLock<Option<Arc<LocaleBundle>>>,
}

impl I18nManager {
    /// Create a manager and load every resource plus the persisted choice.
    ///
    /// Problems with individual files are logged and the affected lookups
    /// fall through to the next source; an unknown persisted language falls
    /// back to the default.
    pub async fn load(
        locales_dir: impl AsRef<Path>,
        custom_path: Option<PathBuf>,
        settings_path: impl Into<PathBuf>,
    ) -> Self {
        Self::with_resources(
            ResourceManager::new(locales_dir),
            custom_path,
            settings_path.into(),
        )
        .await
    }

    /// Manager serving only the built-in resources, persisting the language
    /// choice to `settings_path`.
    pub async fn builtin(settings_path: impl Into<PathBuf>) -> Self {
        Self::with_resources(ResourceManager::builtin_only(), None, settings_path.into()).await
    }

    async fn with_resources(
        resources: ResourceManager,
        custom_path: Option<PathBuf>,
        settings_path: PathBuf,
    ) -> Self {
        let manager = Self {
            default_locale: Locale::default(),
            resources,
            custom_path,
            settings: JsonDocument::new(settings_path),
            current: RwLock::new(Locale::default()),
            bundles: RwLock::new(HashMap::new()),
            custom: RwLock::new(None),
        };

        manager.load_all_locales();
        manager.load_custom();

        let current = match manager.settings.load().await {
            Ok(settings) => Locale::from_code(&settings.language).unwrap_or_else(|| {
                warn!(language = %settings.language, "Unknown saved language, using default");
                manager.default_locale
            }),
            Err(e) => {
                warn!(error = %e, "Failed to read language settings, using default");
                manager.default_locale
            }
        };
        *manager.current.write() = current;

        info!(current = %current, "I18nManager initialized");
        manager
    }

    fn load_all_locales(&self) {
        let mut loaded = HashMap::new();
        for locale in Locale::all() {
            match self
                .resources
                .load_resource(locale)
                .and_then(|resource| LocaleBundle::new(locale, resource))
            {
                Ok(bundle) => {
                    loaded.insert(locale, Arc::new(bundle));
                }
                Err(e) => warn!(locale = %locale, error = %e, "Failed to load locale"),
            }
        }
        *self.bundles.write() = loaded;
    }

    fn load_custom(&self) {
        let custom = self
            .custom_path
            .as_deref()
            .filter(|path| path.is_file())
            .and_then(|path| {
                match load_file(path).and_then(|r| LocaleBundle::new(self.default_locale, r)) {
                    Ok(bundle) => {
                        debug!(path = %path.display(), "Loaded custom strings");
                        Some(Arc::new(bundle))
                    }
                    Err(e) => {
                        warn!(error = %e, "Ignoring custom strings file");
                        None
                    }
                }
            });
        *self.custom.write() = custom;
    }

    /// Translate `key` with optional arguments.
    #[must_use]
    pub fn t(&self, key: &str, args: Option<&FluentArgs<'_>>) -> String {
        if let Some(text) = self
            .custom
            .read()
            .as_ref()
            .and_then(|bundle| bundle.format(key, args))
        {
            return text;
        }

        let current = self.current();
        let bundles = self.bundles.read();
        let mut order = vec![current];
        if current != self.default_locale {
            order.push(self.default_locale);
        }

        order
            .into_iter()
            .find_map(|locale| bundles.get(&locale).and_then(|b| b.format(key, args)))
            .unwrap_or_else(|| {
                debug!(key, "Missing translation");
                key.to_string()
            })
    }

    /// Translate `key` without arguments.
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.t(key, None)
    }

    /// Whether any source can translate `key`.
    #[must_use]
    pub fn has_message(&self, key: &str) -> bool {
        self.custom
            .read()
            .as_ref()
            .is_some_and(|b| b.has_message(key))
            || self.bundles.read().values().any(|b| b.has_message(key))
    }

    /// The active locale.
    #[must_use]
    pub fn current(&self) -> Locale {
        *self.current.read()
    }

    /// Get the default locale
    #[must_use]
    pub const fn default_locale(&self) -> Locale {
        self.default_locale
    }

    /// Locales that have a loaded resource.
    #[must_use]
    pub fn available_languages(&self) -> Vec<Locale> {
        let bundles = self.bundles.read();
        Locale::all()
            .into_iter()
            .filter(|locale| bundles.contains_key(locale))
            .collect()
    }

    /// Switch the active language and persist the choice.
    ///
    /// # Errors
    ///
    /// [`I18nError::UnsupportedLanguage`] when `code` names no available
    /// locale, or a settings error if the choice cannot be saved; the active
    /// language is unchanged in both cases.
    pub async fn set_language(&self, code: &str) -> I18nResult<Locale> {
        let locale = Locale::from_code(code)
            .filter(|locale| self.available_languages().contains(locale))
            .ok_or_else(|| I18nError::UnsupportedLanguage(code.to_string()))?;

        self.settings
            .save(&LanguageSettings {
                language: locale.code().to_string(),
            })
            .await?;
        *self.current.write() = locale;

        info!(language = %locale, "Language changed");
        Ok(locale)
    }

    /// Re-read all resources and the custom override file.
    pub fn reload(&self) {
        self.load_all_locales();
        self.load_custom();
        info!("Translations reloaded");
    }
}
