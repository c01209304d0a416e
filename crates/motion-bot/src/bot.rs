//! Core bot logic using the Poise framework.

use crate::dashboard::start_dashboard_server;
use crate::error::BotResult;
use crate::events::event_handler;
use crate::gateway::SerenityGateway;
use crate::state::AppState;
use motion_commands::{framework_options, Data, Error};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Main bot structure.
#[derive(Debug)]
pub struct MotionBot {
    state: AppState,
}

impl MotionBot {
    /// Creates a new bot instance over loaded state.
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Shared services.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Runs the Discord client, the dashboard and the keep-alive pinger until
    /// Ctrl-C or a fatal client error.
    ///
    /// # Errors
    ///
    /// Returns the Discord client error that ended the run.
    pub async fn run(self) -> BotResult<()> {
        let config = self.state.config.get();
        let shutdown = CancellationToken::new();

        self.state.keep_alive.start(&config.keep_alive).await;

        let dashboard = if config.dashboard.enabled {
            let state = self.state.clone();
            let token = shutdown.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = start_dashboard_server(state, token).await {
                    error!(error = %e, "Dashboard server failed");
                }
            }))
        } else {
            info!("Dashboard disabled");
            None
        };

        // Configure Discord intents
        let intents = serenity::GatewayIntents::GUILD_MESSAGES
            | serenity::GatewayIntents::MESSAGE_CONTENT
            | serenity::GatewayIntents::GUILDS;

        let mut client = serenity::ClientBuilder::new(&config.discord.token, intents)
            .framework(self.framework())
            .await?;

        info!("Discord client created");

        // Set up graceful shutdown handling
        let shard_manager = client.shard_manager.clone();
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!("Failed to listen for shutdown signal: {:?}", e);
                        return;
                    }
                    info!("Received shutdown signal, starting graceful shutdown");
                }
                () = signal_token.cancelled() => {}
            }
            shard_manager.shutdown_all().await;
        });

        info!("MotionBot is starting up...");
        let result = client.start().await;

        shutdown.cancel();
        self.state.keep_alive.stop().await;
        if let Some(handle) = dashboard {
            if let Err(e) = handle.await {
                error!(error = %e, "Dashboard task panicked");
            }
        }

        info!("MotionBot has shut down");
        result.map_err(Into::into)
    }

    fn framework(&self) -> poise::Framework<Data, Error> {
        let mut options = framework_options();
        options.event_handler =
            |ctx, event, framework, data| Box::pin(event_handler(ctx, event, framework, data));

        let state = self.state.clone();
        poise::Framework::builder()
            .options(options)
            .setup(move |ctx, ready, framework| Box::pin(setup(ctx, ready, framework, state)))
            .build()
    }
}

/// Registers the slash commands and builds the command data once the gateway
/// is ready.
async fn setup(
    ctx: &serenity::Context,
    ready: &serenity::Ready,
    framework: &poise::Framework<Data, Error>,
    state: AppState,
) -> Result<Data, Error> {
    info!("Bot connected as: {}", ready.user.name);
    info!("Bot ID: {}", ready.user.id);
    info!("Connected to {} guilds", ready.guilds.len());

    let commands = &framework.options().commands;
    let dev_guild = state
        .config
        .get()
        .discord
        .dev_guild_id
        .filter(|id| id.get() != 0);
    if let Some(guild) = dev_guild {
        let guild_id = serenity::GuildId::new(guild.get());
        poise::builtins::register_in_guild(ctx, commands, guild_id).await?;
        info!(guild_id = %guild, "Slash commands registered in development guild");
    } else {
        poise::builtins::register_globally(ctx, commands).await?;
        info!("Slash commands registered globally");
    }

    state
        .presence
        .set_ready(ready.user.name.clone(), ready.user.tag());

    let gateway = Arc::new(SerenityGateway::new(ctx.http.clone()));
    let engine = Arc::new(state.engine(gateway));
    Ok(state.command_data(engine))
}
