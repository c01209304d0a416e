//! Thread-safe configuration caching with arc-swap for lock-free reads.

use crate::schema::Config;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Thread-safe configuration cache using arc-swap for lock-free reads.
///
/// The dashboard changes keep-alive settings at runtime through
/// [`ConfigCache::modify`]; every other reader sees the new value on its next
/// [`ConfigCache::get`].
#[derive(Debug)]
pub struct ConfigCache {
    config: ArcSwap<Config>,
}

impl ConfigCache {
    /// Creates a new configuration cache with the given initial configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Gets the current configuration.
    #[must_use]
    pub fn get(&self) -> Arc<Config> {
        self.config.load_full()
    }

    /// Updates the configuration atomically.
    pub fn update(&self, config: Config) {
        self.config.store(Arc::new(config));
    }

    /// Applies `change` to a copy of the current configuration and publishes
    /// it. Returns the configuration now in effect.
    pub fn modify<F>(&self, mut change: F) -> Arc<Config>
    where
        F: FnMut(&mut Config),
    {
        self.config.rcu(|current| {
            let mut next = Config::clone(current);
            change(&mut next);
            next
        });
        self.get()
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
