//! # Motion I18n
//!
//! Localization for MotionBot built on Project Fluent.
//!
//! Each supported locale has a `main.ftl` resource, read from the configured
//! locales directory or, when absent there, from the copy built into the
//! binary. An optional custom Fluent file overrides individual messages in
//! every language.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bundle;
pub mod error;
pub mod locale;
pub mod manager;
pub mod resource;

pub use bundle::LocaleBundle;
pub use error::{I18nError, I18nResult};
pub use fluent_bundle::{FluentArgs, FluentValue};
pub use locale::Locale;
pub use manager::{I18nManager, LanguageSettings};
pub use resource::ResourceManager;
