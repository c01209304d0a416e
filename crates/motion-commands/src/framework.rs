//! Poise framework options, shared command data and the command hooks.

use crate::status::{BotPresence, CommandStats};
use motion_common::{write_error_log, GuildId};
use motion_config::{CommandToggleStore, ThemeStore};
use motion_i18n::{fluent_args, I18nManager};
use motion_sticky::StickyEngine;
use poise::CreateReply;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Application data accessible in all commands and event handlers.
pub struct Data {
    /// Sticky message engine.
    pub engine: Arc<StickyEngine>,
    /// Embed colors.
    pub theme: Arc<ThemeStore>,
    /// Per-guild command switches.
    pub toggles: Arc<CommandToggleStore>,
    /// Localized strings.
    pub i18n: Arc<I18nManager>,
    /// Command counter and uptime.
    pub stats: Arc<CommandStats>,
    /// Bot identity and connected guilds.
    pub presence: Arc<BotPresence>,
    /// Root directory of the per-hour command error logs.
    pub error_log_dir: PathBuf,
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("engine", &"<StickyEngine>")
            .field("theme", &"<ThemeStore>")
            .field("toggles", &self.toggles.path())
            .field("i18n", &self.i18n.current())
            .field("stats", &self.stats)
            .field("error_log_dir", &self.error_log_dir)
            .finish_non_exhaustive()
    }
}

/// Application error type for commands.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Command context type.
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Every slash command the bot registers.
#[must_use]
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        crate::ping::ping(),
        crate::help::help(),
        crate::sticky::sticky(),
        crate::wipe::wipe(),
    ]
}

/// Framework options with the toggle check, command counter and error hook
/// installed. The caller adds its event handler.
#[must_use]
pub fn framework_options() -> poise::FrameworkOptions<Data, Error> {
    poise::FrameworkOptions {
        commands: commands(),
        on_error: |error| Box::pin(on_error(error)),
        command_check: Some(|ctx| Box::pin(command_enabled(ctx))),
        pre_command: |ctx| Box::pin(count_command(ctx)),
        ..Default::default()
    }
}

/// A registered command as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandInfo {
    /// Top-level command name, also the toggle key.
    pub name: String,
    /// Slash command description.
    pub description: String,
    /// Grouping shown in the dashboard.
    pub category: String,
}

impl CommandInfo {
    fn from_command<U, E>(command: &poise::Command<U, E>) -> Self {
        Self {
            name: command.name.clone(),
            description: command.description.clone().unwrap_or_default(),
            category: command
                .category
                .clone()
                .unwrap_or_else(|| "General".to_string()),
        }
    }
}

/// Name, description and category of every top-level command.
#[must_use]
pub fn catalog() -> Vec<CommandInfo> {
    commands().iter().map(CommandInfo::from_command).collect()
}

/// Toggle key of an invocation: the top-level command, so `/sticky create`
/// is switched by `sticky`.
#[must_use]
pub fn toggle_key<'a, U, E>(
    parents: &[&'a poise::Command<U, E>],
    command: &'a poise::Command<U, E>,
) -> &'a str {
    parents
        .first()
        .copied()
        .map_or(command.name.as_str(), |root| root.name.as_str())
}

/// Sends `text` visible to the invoking user only.
pub(crate) async fn reply_ephemeral(ctx: Context<'_>, text: String) -> Result<(), Error> {
    ctx.send(CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}

async fn command_enabled(ctx: Context<'_>) -> Result<bool, Error> {
    let name = toggle_key(ctx.parent_commands(), ctx.command());
    let guild = ctx.guild_id().map(|id| GuildId(id.get()));

    if ctx.data().toggles.is_enabled(name, guild).await {
        return Ok(true);
    }

    info!(command = name, guild_id = ?guild, "Blocked disabled command");
    reply_ephemeral(ctx, ctx.data().i18n.text("command-disabled")).await?;
    Ok(false)
}

async fn count_command(ctx: Context<'_>) {
    ctx.data().stats.record();
    debug!(
        command = %ctx.command().qualified_name,
        user = %ctx.author().name,
        "Executing command"
    );
}

/// Global error handler for the framework.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            report_command_error(ctx, &error).await;
        }
        poise::FrameworkError::CommandCheckFailed {
            error: None, ctx, ..
        } => {
            debug!(command = %ctx.command().qualified_name, "Command check declined");
        }
        poise::FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            warn!(
                command = %ctx.command().qualified_name,
                missing = %missing_permissions,
                "Bot lacks permissions for command"
            );
            let args = fluent_args!["permissions" => missing_permissions.to_string()];
            let text = ctx.data().i18n.t("bot-missing-permissions", Some(&args));
            if let Err(e) = reply_ephemeral(ctx, text).await {
                warn!(error = %e, "Could not report missing permissions");
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!(
                event = event.snake_case_name(),
                error = %error,
                "Error in event handler"
            );
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!(error = %e, "Error while handling framework error");
            }
        }
    }
}

async fn report_command_error(ctx: Context<'_>, error: &Error) {
    let command = ctx.command().qualified_name.clone();
    error!(command = %command, error = %error, "Command failed");

    let data = ctx.data();
    let mut text = data.i18n.text("error-prefix");
    match write_error_log(&data.error_log_dir, &command, &**error).await {
        Ok(path) => {
            let args = fluent_args!["path" => path.display().to_string()];
            text.push('\n');
            text.push_str(&data.i18n.t("error-log-saved", Some(&args)));
        }
        Err(e) => error!(error = %e, "Could not write error log"),
    }

    if let Err(e) = reply_ephemeral(ctx, text).await {
        warn!(command = %command, error = %e, "Could not report error to user");
    }
}
