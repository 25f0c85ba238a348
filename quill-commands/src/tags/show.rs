use tracing::error;
use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use crate::tags::embeds::{guild_only_message, unknown_trigger_message, usage_message};
use crate::tags::single_trigger;
use quill_core::Context;
use quill_database::TriggerLookup;
use quill_database::model::Use;
use quill_utils::embed::sanitize_mentions;
use quill_utils::time::now_unix_secs;

pub const META: CommandMeta = CommandMeta {
    name: "tag show",
    desc: "Send the content of a tag, by tag or alias trigger.",
    category: "tags",
    usage: "!tag show <trigger>",
};

/// Resolve a trigger and send the tag content, logging the use when the
/// guild has use-logging enabled.
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
    let lookup = ctx.store.get_tag_or_alias(guild, &trigger).await?;

    let content = match &lookup {
        TriggerLookup::Tag(tag) | TriggerLookup::Alias { tag, .. } => {
            sanitize_mentions(&tag.content)
        }
        TriggerLookup::Miss => {
            http.create_message(msg.channel_id)
                .content(&unknown_trigger_message(&trigger))
                .await?;
            return Ok(());
        }
    };

    http.create_message(msg.channel_id).content(&content).await?;

    if !ctx.store.log_uses(guild).await? {
        return Ok(());
    }

    // The reply has already gone out; a failed audit append is logged, not
    // surfaced to the channel.
    let usage = Use::new(msg.author.id.get(), now_unix_secs());
    let logged = match &lookup {
        TriggerLookup::Tag(tag) => ctx.store.add_tag_use(guild, tag, usage).await,
        TriggerLookup::Alias { alias, .. } => ctx.store.add_alias_use(guild, alias, usage).await,
        TriggerLookup::Miss => Ok(()),
    };
    if let Err(source) = logged {
        error!(?source, %trigger, "failed to record tag use");
    }

    Ok(())
}
