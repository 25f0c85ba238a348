use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use crate::tags::embeds::{guild_only_message, usage_message};
use crate::tags::split_trigger_and_tail;
use quill_core::Context;
use quill_utils::time::now_unix_secs;

pub const META: CommandMeta = CommandMeta {
    name: "tag create",
    desc: "Create a new tag owned by you.",
    category: "tags",
    usage: "!tag create <trigger> <content>",
};

/// Create and persist a new tag.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, rest: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(guild_only_message())
            .await?;
        return Ok(());
    };

    let Some((trigger, content)) = split_trigger_and_tail(rest) else {
        http.create_message(msg.channel_id)
            .content(&usage_message(META.usage))
            .await?;
        return Ok(());
    };
    if content.is_empty() {
        http.create_message(msg.channel_id)
            .content(&usage_message(META.usage))
            .await?;
        return Ok(());
    }

    // Tag and alias keys share one namespace per guild.
    if !ctx
        .store
        .get_tag_or_alias(guild_id.get(), &trigger)
        .await?
        .is_miss()
    {
        let reply = format!("`{trigger}` is already in use as a tag or alias.");
        http.create_message(msg.channel_id).content(&reply).await?;
        return Ok(());
    }

    let tag = ctx
        .store
        .create_tag(
            guild_id.get(),
            &trigger,
            msg.author.id.get(),
            now_unix_secs(),
            content,
        )
        .await?;

    let reply = format!("Tag `{}` created.", tag.tag);
    http.create_message(msg.channel_id).content(&reply).await?;

    Ok(())
}
