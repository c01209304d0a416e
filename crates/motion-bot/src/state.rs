//! Long-lived services shared by the Discord side and the dashboard.

use crate::error::BotResult;
use crate::keep_alive::KeepAlive;
use motion_commands::{catalog, BotPresence, CommandInfo, CommandStats, Data};
use motion_config::{CommandToggleStore, Config, ConfigCache, EnvFile, ThemeStore};
use motion_i18n::I18nManager;
use motion_sticky::{ChannelLockTable, MessageGateway, StickyEngine, StickyStore};
use std::sync::Arc;
use tracing::info;

/// Everything loaded at start-up, cheap to clone.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Live configuration; the dashboard swaps in edits.
    pub config: Arc<ConfigCache>,
    /// Sticky records.
    pub store: Arc<StickyStore>,
    /// Embed colors.
    pub theme: Arc<ThemeStore>,
    /// Command switches.
    pub toggles: Arc<CommandToggleStore>,
    /// Localized strings.
    pub i18n: Arc<I18nManager>,
    /// Command counter and uptime.
    pub stats: Arc<CommandStats>,
    /// Bot identity and guilds.
    pub presence: Arc<BotPresence>,
    /// External API pinger.
    pub keep_alive: Arc<KeepAlive>,
    /// The `.env` file edited by the dashboard.
    pub env_file: Arc<EnvFile>,
    /// Registered commands, for the dashboard listing.
    pub commands: Arc<Vec<CommandInfo>>,
}

impl AppState {
    /// Loads the documents named by `config`. Nothing here touches Discord.
    ///
    /// # Errors
    ///
    /// Fails only if the keep-alive HTTP client cannot be built; unreadable
    /// documents fall back to defaults with a warning.
    pub async fn load(config: Config) -> BotResult<Self> {
        let storage = config.storage.clone();

        let theme = ThemeStore::load(storage.theme_file()).await;
        let i18n = I18nManager::load(
            &storage.locales_dir,
            Some(storage.custom_strings.clone()),
            storage.language_file(),
        )
        .await;

        info!(data_dir = %storage.data_dir.display(), "Application state loaded");

        Ok(Self {
            store: Arc::new(StickyStore::new(storage.stickies_file())),
            theme: Arc::new(theme),
            toggles: Arc::new(CommandToggleStore::new(storage.commands_file())),
            i18n: Arc::new(i18n),
            stats: Arc::new(CommandStats::new()),
            presence: Arc::new(BotPresence::new()),
            keep_alive: Arc::new(KeepAlive::new()?),
            env_file: Arc::new(EnvFile::new(storage.env_file)),
            commands: Arc::new(catalog()),
            config: Arc::new(ConfigCache::new(config)),
        })
    }

    /// Builds a sticky engine posting through `gateway`.
    #[must_use]
    pub fn engine(&self, gateway: Arc<dyn MessageGateway>) -> StickyEngine {
        StickyEngine::new(
            self.store.clone(),
            ChannelLockTable::new(),
            gateway,
            self.theme.clone(),
            self.config.get().sticky.call_timeout(),
        )
    }

    /// Command data sharing this state's services.
    #[must_use]
    pub fn command_data(&self, engine: Arc<StickyEngine>) -> Data {
        Data {
            engine,
            theme: self.theme.clone(),
            toggles: self.toggles.clone(),
            i18n: self.i18n.clone(),
            stats: self.stats.clone(),
            presence: self.presence.clone(),
            error_log_dir: self.config.get().storage.error_log_dir.clone(),
        }
    }
}
