//! Central event handler for Discord events.

use motion_commands::{Data, Error, GuildSummary};
use motion_common::{ChannelId, GuildId};
use motion_sticky::ActivityOutcome;
use poise::serenity_prelude as serenity;
use tracing::{debug, info, warn};

/// Routes gateway events to the sticky engine and the presence snapshot.
pub async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            on_message(new_message, data).await;
        }
        serenity::FullEvent::Ready { data_about_bot } => {
            let user = &data_about_bot.user;
            data.presence.set_ready(user.name.clone(), user.tag());
            info!(user = %user.name, guilds = data_about_bot.guilds.len(), "Bot ready");
        }
        serenity::FullEvent::GuildCreate { guild, .. } => {
            data.presence.upsert_guild(summarize(guild));
            info!(guild_id = %guild.id, name = %guild.name, "Guild available");
        }
        serenity::FullEvent::GuildDelete { incomplete, .. } => {
            if incomplete.unavailable {
                warn!(guild_id = %incomplete.id, "Guild became unavailable");
            } else {
                data.presence.remove_guild(GuildId(incomplete.id.get()));
                info!(guild_id = %incomplete.id, "Removed from guild");
            }
        }
        _ => {}
    }
    Ok(())
}

/// Re-posts the channel's sticky after a human message. Bot messages,
/// including the sticky itself, and direct messages are ignored.
async fn on_message(message: &serenity::Message, data: &Data) {
    if message.author.bot {
        return;
    }
    let Some(guild) = message.guild_id else {
        return;
    };

    let guild = GuildId(guild.get());
    let channel = ChannelId(message.channel_id.get());
    match data.engine.on_activity(guild, channel).await {
        ActivityOutcome::NoSticky => {}
        outcome => debug!(guild_id = %guild, channel_id = %channel, ?outcome, "Sticky activity handled"),
    }
}

fn summarize(guild: &serenity::Guild) -> GuildSummary {
    GuildSummary {
        id: GuildId(guild.id.get()),
        name: guild.name.clone(),
        icon: guild.icon_url(),
    }
}
