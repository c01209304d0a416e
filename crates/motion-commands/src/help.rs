//! `/help`.

use crate::framework::{catalog, CommandInfo, Context, Error};
use motion_common::format_duration;
use motion_i18n::fluent_args;
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use std::collections::BTreeMap;

/// Groups commands by category, categories and commands sorted by name.
#[must_use]
pub fn by_category(commands: &[CommandInfo]) -> BTreeMap<&str, Vec<&CommandInfo>> {
    let mut groups: BTreeMap<&str, Vec<&CommandInfo>> = BTreeMap::new();
    for command in commands {
        groups
            .entry(command.category.as_str())
            .or_default()
            .push(command);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| a.name.cmp(&b.name));
    }
    groups
}

/// One `**/name**` line followed by its description per command.
#[must_use]
pub fn category_listing(commands: &[&CommandInfo]) -> String {
    commands
        .iter()
        .map(|command| format!("**/{}**\n{}", command.name, command.description))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Displays information about the bot and its commands
#[poise::command(slash_command, category = "Utility")]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let i18n = &data.i18n;

    let (bot_name, avatar) = {
        let me = ctx.serenity_context().cache.current_user();
        (me.name.clone(), me.face())
    };
    let commands = catalog();
    let guilds = data.presence.guilds().len();

    let title_args = fluent_args!["name" => bot_name.as_str()];
    let mut embed = serenity::CreateEmbed::new()
        .title(i18n.t("help-title", Some(&title_args)))
        .description(i18n.text("help-description"))
        .thumbnail(avatar)
        .colour(data.theme.current().primary_color())
        .field(i18n.text("help-bot-name"), bot_name.as_str(), true)
        .field(i18n.text("help-version"), env!("CARGO_PKG_VERSION"), true)
        .field(i18n.text("help-library"), "poise / serenity", true)
        .field(i18n.text("help-commands"), commands.len().to_string(), true)
        .field(i18n.text("help-servers"), guilds.to_string(), true)
        .field(
            i18n.text("help-uptime"),
            format_duration(data.stats.uptime()),
            true,
        );

    for (category, group) in by_category(&commands) {
        embed = embed.field(category, category_listing(&group), false);
    }

    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
