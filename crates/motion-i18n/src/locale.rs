//! Supported locales

use crate::error::{I18nError, I18nResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use unic_langid::LanguageIdentifier;

/// Supported locales
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Locale {
    /// English, the fallback for every lookup.
    #[default]
    #[serde(rename = "en")]
    English,
    /// Brazilian Portuguese.
    #[serde(rename = "pt")]
    Portuguese,
}

impl Locale {
    /// Short language code, also the resource directory name.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Portuguese => "pt",
        }
    }

    /// Parse a locale from a language code such as `pt` or `pt-BR`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Self::English),
            "pt" => Some(Self::Portuguese),
            _ => None,
        }
    }

    /// Convert to a Fluent language identifier
    ///
    /// # Errors
    ///
    /// Never fails for the built-in codes; kept fallible for the parser.
    pub fn to_language_identifier(self) -> I18nResult<LanguageIdentifier> {
        self.code()
            .parse()
            .map_err(|_| I18nError::InvalidLanguageId(self.code().to_string()))
    }

    /// Get all supported locales
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::English, Self::Portuguese]
    }

    /// Name of the language in that language.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Portuguese => "Português",
        }
    }

    /// Resource path relative to the locales directory.
    #[must_use]
    pub fn resource_file(self) -> String {
        format!("{}/main.ftl", self.code())
    }

    pub(crate) const fn builtin_resource(self) -> &'static str {
        match self {
            Self::English => include_str!("../locales/en/main.ftl"),
            Self::Portuguese => include_str!("../locales/pt/main.ftl"),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
