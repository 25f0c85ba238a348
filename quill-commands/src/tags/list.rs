use std::fmt::Write as _;

use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use crate::tags::embeds::{guild_only_message, usage_message};
use quill_core::Context;
use quill_utils::embed::{DEFAULT_EMBED_COLOR, result_embed};
use quill_utils::parse::parse_target_user_id;

pub const META: CommandMeta = CommandMeta {
    name: "tag list",
    desc: "List tags owned by you or another user.",
    category: "tags",
    usage: "!tag list [user]",
};

/// List the tags owned by a user in this guild.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, rest: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(guild_only_message())
            .await?;
        return Ok(());
    };

    let owner = match rest {
        Some(raw_target) => match parse_target_user_id(raw_target) {
            Some(user_id) => user_id.get(),
            None => {
                http.create_message(msg.channel_id)
                    .content(&usage_message(META.usage))
                    .await?;
                return Ok(());
            }
        },
        None => msg.author.id.get(),
    };

    let tags = ctx.store.get_tags_by_owner(guild_id.get(), owner).await?;
    if tags.is_empty() {
        let reply = format!("No tags owned by <@{owner}>.");
        http.create_message(msg.channel_id).content(&reply).await?;
        return Ok(());
    }

    let mut description = String::new();
    for tag in &tags {
        let _ = writeln!(description, "`{}` ({} uses)", tag.tag, tag.uses.len());
    }

    let title = format!("Tags owned ({})", tags.len());
    let embed = result_embed(&title, description, DEFAULT_EMBED_COLOR)?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}
