use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use crate::tags::embeds::{guild_only_message, usage_message};
use crate::tags::split_trigger_and_tail;
use quill_core::Context;
use quill_utils::time::now_unix_secs;

pub const META: CommandMeta = CommandMeta {
    name: "tag alias",
    desc: "Create an alias for an existing tag.",
    category: "tags",
    usage: "!tag alias <alias> <trigger>",
};

/// Create and persist a secondary trigger for an existing tag.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, rest: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(guild_only_message())
            .await?;
        return Ok(());
    };

    let Some((alias, tail)) = split_trigger_and_tail(rest) else {
        http.create_message(msg.channel_id)
            .content(&usage_message(META.usage))
            .await?;
        return Ok(());
    };
    let trigger = tail.to_ascii_lowercase();
    if trigger.is_empty() || trigger.split_whitespace().count() != 1 {
        http.create_message(msg.channel_id)
            .content(&usage_message(META.usage))
            .await?;
        return Ok(());
    }

    let guild = guild_id.get();

    if !ctx.store.get_tag_or_alias(guild, &alias).await?.is_miss() {
        let reply = format!("`{alias}` is already in use as a tag or alias.");
        http.create_message(msg.channel_id).content(&reply).await?;
        return Ok(());
    }

    if ctx.store.get_tag(guild, &trigger).await?.is_none() {
        let reply = format!("No tag named `{trigger}` to alias.");
        http.create_message(msg.channel_id).content(&reply).await?;
        return Ok(());
    }

    let record = ctx
        .store
        .create_alias(guild, &alias, &trigger, msg.author.id.get(), now_unix_secs())
        .await?;

    let reply = format!("Alias `{}` now points to `{}`.", record.alias, record.tag);
    http.create_message(msg.channel_id).content(&reply).await?;

    Ok(())
}
