//! FluentBundle wrapper and message formatting

use crate::error::I18nResult;
use crate::Locale;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use tracing::warn;

/// A thread-safe bundle holding one resource.
pub struct LocaleBundle {
    locale: Locale,
    bundle: FluentBundle<FluentResource>,
}

impl std::fmt::Debug for LocaleBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleBundle")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl LocaleBundle {
    /// Build a bundle for `locale` from `resource`.
    ///
    /// # Errors
    ///
    /// Fails only if the locale code does not parse.
    pub fn new(locale: Locale, resource: FluentResource) -> I18nResult<Self> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.to_language_identifier()?]);
        // Discord renders the Unicode isolation marks literally.
        bundle.set_use_isolating(false);
        if let Err(errors) = bundle.add_resource(resource) {
            warn!(locale = %locale, ?errors, "Duplicate messages in resource, keeping the first");
        }
        Ok(Self { locale, bundle })
    }

    /// Locale the bundle was built for.
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Whether the bundle has a message with a value for `key`.
    #[must_use]
    pub fn has_message(&self, key: &str) -> bool {
        self.bundle
            .get_message(key)
            .is_some_and(|message| message.value().is_some())
    }

    /// Format `key`, or `None` if the bundle lacks it.
    ///
    /// Formatting problems such as a missing argument are logged and the
    /// partially formatted text is still returned.
    #[must_use]
    pub fn format(&self, key: &str, args: Option<&FluentArgs<'_>>) -> Option<String> {
        let pattern = self.bundle.get_message(key)?.value()?;
        let mut errors = Vec::new();
        let text = self.bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            warn!(key, locale = %self.locale, ?errors, "Formatting errors");
        }
        Some(text.into_owned())
    }
}

/// Macro to create `FluentArgs` from `key => value` pairs
#[macro_export]
macro_rules! fluent_args {
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut args = $crate::FluentArgs::new();
        $(
            args.set($key, $value);
        )+
        args
    }};
}
