//! Integration tests for motion-commands crate.
//!
//! These check the command tree the framework registers and the metadata the
//! dashboard lists, without connecting to Discord.

use motion_commands::{catalog, commands, framework_options, toggle_key, BotPresence, GuildSummary};
use motion_common::GuildId;
use poise::serenity_prelude as serenity;

#[test]
fn test_registered_command_names() {
    let names: Vec<String> = commands().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["ping", "help", "sticky", "wipe"]);
    assert_eq!(framework_options().commands.len(), 4);
}

#[test]
fn test_sticky_is_a_guarded_group() {
    let all = commands();
    let sticky = all.iter().find(|c| c.name == "sticky").unwrap();

    let subcommands: Vec<&str> = sticky.subcommands.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(subcommands, vec!["create", "delete"]);
    assert!(sticky.guild_only);
    assert!(sticky.subcommand_required);
    assert_eq!(
        sticky.default_member_permissions,
        serenity::Permissions::MANAGE_MESSAGES
    );

    let create = &sticky.subcommands[0];
    let params: Vec<&str> = create.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["name", "channel", "message"]);
    assert!(create.parameters.iter().all(|p| p.required));
}

#[test]
fn test_wipe_requires_admin_and_manage_messages() {
    let all = commands();
    let wipe = all.iter().find(|c| c.name == "wipe").unwrap();

    assert!(wipe.guild_only);
    assert!(wipe.slash_action.is_some());
    assert_eq!(
        wipe.default_member_permissions,
        serenity::Permissions::ADMINISTRATOR
    );
    assert_eq!(
        wipe.required_bot_permissions,
        serenity::Permissions::MANAGE_MESSAGES
    );
    assert_eq!(wipe.category.as_deref(), Some("Moderation"));
    assert!(wipe.parameters.is_empty());
}

#[test]
fn test_catalog_groups_commands_for_help() {
    let entries = catalog();
    let groups = motion_commands::help::by_category(&entries);

    let moderation: Vec<&str> = groups["Moderation"].iter().map(|c| c.name.as_str()).collect();
    let utility: Vec<&str> = groups["Utility"].iter().map(|c| c.name.as_str()).collect();
    assert_eq!(moderation, vec!["sticky", "wipe"]);
    assert_eq!(utility, vec!["help", "ping"]);
}

#[test]
fn test_subcommands_toggle_with_their_group() {
    let all = commands();
    let sticky = all.iter().find(|c| c.name == "sticky").unwrap();
    let ping = all.iter().find(|c| c.name == "ping").unwrap();

    assert_eq!(toggle_key(&[sticky], &sticky.subcommands[1]), "sticky");
    assert_eq!(toggle_key(&[], ping), "ping");
}

#[test]
fn test_catalog_lists_top_level_commands() {
    let entries = catalog();
    assert_eq!(entries.len(), 4);

    let ping = &entries[0];
    assert_eq!(ping.name, "ping");
    assert_eq!(ping.category, "Utility");
    assert!(!ping.description.is_empty());

    let help = &entries[1];
    assert_eq!(help.name, "help");
    assert_eq!(help.category, "Utility");

    let sticky = &entries[2];
    assert_eq!(sticky.category, "Moderation");
    assert_eq!(sticky.description, "Manage sticky messages");

    let json = serde_json::to_value(sticky).unwrap();
    assert_eq!(json["name"], "sticky");
}

#[tokio::test]
async fn test_presence_is_shared_across_tasks() {
    motion_common::test_utils::init_test_logging();

    let presence = std::sync::Arc::new(BotPresence::new());
    let handles: Vec<_> = (1..=4)
        .map(|id| {
            let presence = presence.clone();
            tokio::spawn(async move {
                presence.upsert_guild(GuildSummary {
                    id: GuildId(id),
                    name: format!("Guild {id}"),
                    icon: None,
                });
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(presence.guilds().len(), 4);
}
