use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use crate::tags::embeds::{guild_only_message, unknown_trigger_message, usage_message};
use quill_core::Context;
use quill_database::TriggerLookup;
use quill_utils::parse::parse_target_user_id;
use quill_utils::time::now_unix_secs;

pub const META: CommandMeta = CommandMeta {
    name: "tag transfer",
    desc: "Transfer ownership of a tag you own.",
    category: "tags",
    usage: "!tag transfer <trigger> <user> [reason]",
};

/// Move a tag to a new owner, appending to its transfer history.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, rest: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(guild_only_message())
            .await?;
        return Ok(());
    };

    let mut parts = rest.unwrap_or("").splitn(3, char::is_whitespace);
    let trigger = parts
        .next()
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase);
    let raw_target = parts.next();
    let reason = parts
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("No reason provided");

    let (Some(trigger), Some(raw_target)) = (trigger, raw_target) else {
        http.create_message(msg.channel_id)
            .content(&usage_message(META.usage))
            .await?;
        return Ok(());
    };

    let Some(target_user_id) = parse_target_user_id(raw_target) else {
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

    let owner = tag.effective_owner();
    if owner != msg.author.id.get() {
        let reply = format!("Only the owner of `{}` can transfer it.", tag.tag);
        http.create_message(msg.channel_id).content(&reply).await?;
        return Ok(());
    }

    let to = target_user_id.get();
    if to == owner {
        let reply = format!("You already own `{}`.", tag.tag);
        http.create_message(msg.channel_id).content(&reply).await?;
        return Ok(());
    }

    let updated = ctx
        .store
        .transfer_tag(guild, &tag, owner, to, reason, now_unix_secs())
        .await?;

    let reply = format!("Tag `{}` transferred to <@{to}>.", updated.tag);
    http.create_message(msg.channel_id).content(&reply).await?;

    Ok(())
}
