//! `/sticky create` and `/sticky delete`.

use crate::confirm::{self, Answer, ConfirmPrompt};
use crate::framework::{reply_ephemeral, Context, Error};
use motion_common::{ChannelId, GuildId};
use motion_i18n::fluent_args;
use motion_sticky::StickyError;
use poise::serenity_prelude as serenity;
use std::time::Duration;
use tracing::{info, warn};

/// How long the delete confirmation buttons stay active.
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

/// Manage sticky messages
#[poise::command(
    slash_command,
    subcommands("create", "delete"),
    subcommand_required,
    guild_only,
    default_member_permissions = "MANAGE_MESSAGES",
    category = "Moderation"
)]
pub async fn sticky(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Create a sticky message in a channel
#[poise::command(slash_command, guild_only)]
pub async fn create(
    ctx: Context<'_>,
    #[description = "The unique name for this sticky message"]
    #[max_length = 100]
    name: String,
    #[description = "The channel where the sticky message will appear"]
    #[channel_types("Text", "News")]
    channel: serenity::GuildChannel,
    #[description = "The content of the sticky message"] message: String,
) -> Result<(), Error> {
    let Some(guild) = ctx.guild_id() else {
        return reply_ephemeral(ctx, ctx.data().i18n.text("guild-only")).await;
    };
    ctx.defer_ephemeral().await?;

    let data = ctx.data();
    let result = data
        .engine
        .create(
            GuildId(guild.get()),
            ChannelId(channel.id.get()),
            &name,
            &message,
        )
        .await;

    let text = match result {
        Ok(record) => {
            let args = fluent_args![
                "name" => record.name,
                "channel" => format!("<#{}>", channel.id),
            ];
            data.i18n.t("sticky-created", Some(&args))
        }
        Err(StickyError::Publish(e)) => {
            warn!(channel_id = %channel.id, error = %e, "Could not post sticky message");
            data.i18n.text("sticky-no-permission")
        }
        Err(StickyError::InvalidName) => data.i18n.text("sticky-invalid-name"),
        Err(StickyError::InvalidContent(_)) => data.i18n.text("sticky-invalid-content"),
        Err(e) => return Err(e.into()),
    };

    reply_ephemeral(ctx, text).await
}

/// Delete a sticky message by name
#[poise::command(slash_command, guild_only)]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "The name of the sticky message to delete"] name: String,
) -> Result<(), Error> {
    let Some(guild) = ctx.guild_id() else {
        return reply_ephemeral(ctx, ctx.data().i18n.text("guild-only")).await;
    };
    let guild = GuildId(guild.get());
    let data = ctx.data();
    let i18n = &data.i18n;

    let Some((channel, _)) = data.engine.find(guild, &name).await else {
        let args = fluent_args!["name" => name.as_str()];
        return reply_ephemeral(ctx, i18n.t("sticky-not-found", Some(&args))).await;
    };

    let desc_args = fluent_args![
        "name" => name.as_str(),
        "channel" => format!("<#{channel}>"),
    ];
    let prompt = ConfirmPrompt {
        embed: serenity::CreateEmbed::new()
            .title(i18n.text("sticky-confirm-delete-title"))
            .description(i18n.t("sticky-confirm-delete-desc", Some(&desc_args)))
            .colour(data.theme.current().error_color()),
        confirm_label: i18n.text("button-confirm"),
        cancel_label: i18n.text("button-cancel"),
        timeout: CONFIRM_TIMEOUT,
        timed_out: i18n.text("sticky-timed-out"),
    };

    let (press, text) = match confirm::ask(ctx, prompt).await? {
        Answer::TimedOut => return Ok(()),
        Answer::Cancelled(press) => (press, i18n.text("sticky-cancelled")),
        Answer::Confirmed(press) => {
            let text = match data.engine.delete_in(guild, channel, &name).await {
                Ok(record) => {
                    info!(
                        guild_id = %guild,
                        channel_id = %channel,
                        name = %record.name,
                        "Sticky removed by command"
                    );
                    let args = fluent_args!["name" => record.name];
                    i18n.t("sticky-deleted", Some(&args))
                }
                Err(StickyError::NotFound(_)) => {
                    let args = fluent_args!["name" => name.as_str()];
                    i18n.t("sticky-not-found", Some(&args))
                }
                Err(e) => return Err(e.into()),
            };
            (press, text)
        }
    };

    confirm::settle(ctx, &press, text).await
}
