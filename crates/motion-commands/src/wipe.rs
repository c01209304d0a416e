//! `/wipe`: bulk-deletes the recent messages of a channel.

use crate::confirm::{self, Answer, ConfirmPrompt};
use crate::framework::{reply_ephemeral, Context, Error};
use motion_i18n::fluent_args;
use poise::serenity_prelude as serenity;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long the wipe confirmation buttons stay active.
pub const WIPE_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

/// Most messages removed per wipe, the bulk delete limit.
pub const WIPE_LIMIT: u8 = 100;

/// Discord refuses to bulk delete messages older than this.
const BULK_DELETE_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60;

/// Snowflake epoch, 2015-01-01T00:00:00Z in milliseconds.
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// How long the public "deleted N messages" notice stays up.
const NOTICE_LIFETIME: Duration = Duration::from_secs(5);

/// Unix time in seconds at which the snowflake `id` was created.
#[must_use]
pub fn snowflake_unix_secs(id: u64) -> i64 {
    let millis = (id >> 22) + DISCORD_EPOCH_MS;
    i64::try_from(millis / 1000).unwrap_or(i64::MAX)
}

/// Whether the message `id` is young enough to bulk delete at `now`.
#[must_use]
pub fn is_bulk_deletable(id: u64, now: i64) -> bool {
    now - snowflake_unix_secs(id) < BULK_DELETE_MAX_AGE_SECS
}

/// Deletes all messages from this channel (up to 14 days old)
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "ADMINISTRATOR",
    required_bot_permissions = "MANAGE_MESSAGES",
    category = "Moderation"
)]
pub async fn wipe(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let i18n = &data.i18n;

    let prompt = ConfirmPrompt {
        embed: serenity::CreateEmbed::new()
            .title(i18n.text("wipe-confirm-title"))
            .description(i18n.text("wipe-confirm-desc"))
            .colour(data.theme.current().error_color()),
        confirm_label: i18n.text("wipe-confirm-label"),
        cancel_label: i18n.text("button-cancel"),
        timeout: WIPE_CONFIRM_TIMEOUT,
        timed_out: i18n.text("wipe-timed-out"),
    };

    let press = match confirm::ask(ctx, prompt).await? {
        Answer::TimedOut => return Ok(()),
        Answer::Cancelled(press) => {
            return confirm::settle(ctx, &press, i18n.text("wipe-cancelled")).await;
        }
        Answer::Confirmed(press) => press,
    };
    confirm::settle(ctx, &press, i18n.text("wipe-in-progress")).await?;

    let channel = ctx.channel_id();
    let deleted = match purge(ctx, channel).await {
        Ok(deleted) => deleted,
        Err(e) => {
            warn!(channel_id = %channel, error = %e, "Wipe failed");
            return reply_ephemeral(ctx, i18n.text("wipe-error")).await;
        }
    };
    info!(channel_id = %channel, deleted, user = %ctx.author().name, "Channel wiped");

    let args = fluent_args!["count" => deleted];
    let notice = channel
        .send_message(
            ctx,
            serenity::CreateMessage::new().embed(
                serenity::CreateEmbed::new()
                    .description(i18n.t("wipe-success", Some(&args)))
                    .colour(data.theme.current().primary_color()),
            ),
        )
        .await?;

    let http = ctx.serenity_context().http.clone();
    tokio::spawn(async move {
        tokio::time::sleep(NOTICE_LIFETIME).await;
        if let Err(e) = http.delete_message(notice.channel_id, notice.id, None).await {
            debug!(message_id = %notice.id, error = %e, "Wipe notice already gone");
        }
    });
    Ok(())
}

/// Deletes the last [`WIPE_LIMIT`] messages of `channel` that are young
/// enough for bulk deletion and returns how many were removed.
async fn purge(ctx: Context<'_>, channel: serenity::ChannelId) -> Result<usize, serenity::Error> {
    let now = serenity::Timestamp::now().unix_timestamp();
    let messages: Vec<serenity::Message> = channel
        .messages(ctx, serenity::GetMessages::new().limit(WIPE_LIMIT))
        .await?
        .into_iter()
        .filter(|message| is_bulk_deletable(message.id.get(), now))
        .collect();

    if !messages.is_empty() {
        channel.delete_messages(ctx, &messages).await?;
    }
    Ok(messages.len())
}
