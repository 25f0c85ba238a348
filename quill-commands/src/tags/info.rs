use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use crate::tags::embeds::{
    guild_only_message, tag_info_embed, unknown_trigger_message, usage_message,
};
use crate::tags::single_trigger;
use quill_core::Context;
use quill_database::TriggerLookup;

pub const META: CommandMeta = CommandMeta {
    name: "tag info",
    desc: "Show ownership, history, and aliases for a tag.",
    category: "tags",
    usage: "!tag info <trigger>",
};

/// Show the detail embed for a tag resolved by tag or alias trigger.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, rest: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(guild_only_message())
            .await?;
        return Ok(());
    };

    let Some(trigger) = single_trigger(rest) else {
        http.create_message(msg.channel_id)
            .content(&usage_message(META.usage))
            .await?;
        return Ok(());
    };

    let guild = guild_id.get();
    let tag = match ctx.store.get_tag_or_alias(guild, &trigger).await? {
        TriggerLookup::Tag(tag) => tag,
        TriggerLookup::Alias { tag, .. } => tag,
        TriggerLookup::Miss => {
            http.create_message(msg.channel_id)
                .content(&unknown_trigger_message(&trigger))
                .await?;
            return Ok(());
        }
    };

    let aliases = ctx.store.get_aliases_by_tag(guild, &tag).await?;
    let show_transfers = ctx.store.log_transfers(guild).await?;

    let embed = tag_info_embed(&tag, &aliases, show_transfers)?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}
