use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use crate::tags::embeds::{guild_only_message, usage_message};
use quill_core::Context;
use quill_utils::parse::parse_toggle;

pub const META: CommandMeta = CommandMeta {
    name: "tagset",
    desc: "Configure tag use logging and transfer history.",
    category: "tags",
    usage: "!tagset <loguses|logtransfers> [on|off]",
};

/// Show or change the guild's two tag-logging settings.
pub async fn run(
    ctx: Context,
    msg: Box<MessageCreate>,
    arg1: Option<&str>,
    arg_tail: Option<&str>,
) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(guild_only_message())
            .await?;
        return Ok(());
    };
    let guild = guild_id.get();

    let Some(setting) = arg1 else {
        http.create_message(msg.channel_id)
            .content(&usage_message(META.usage))
            .await?;
        return Ok(());
    };

    let reply = match setting.to_ascii_lowercase().as_str() {
        "loguses" => match arg_tail {
            None => {
                let enabled = ctx.store.log_uses(guild).await?;
                format!("Tag use logging is {}.", enabled_label(enabled))
            }
            Some(raw) => match parse_toggle(raw) {
                Some(log) => {
                    ctx.store.set_log_uses(guild, log).await?;
                    format!("Tag use logging is now {}.", enabled_label(log))
                }
                None => usage_message(META.usage),
            },
        },
        "logtransfers" => match arg_tail {
            None => {
                let enabled = ctx.store.log_transfers(guild).await?;
                format!("Transfer history is {}.", enabled_label(enabled))
            }
            Some(raw) => match parse_toggle(raw) {
                Some(log) => {
                    ctx.store.set_log_transfers(guild, log).await?;
                    format!("Transfer history is now {}.", enabled_label(log))
                }
                None => usage_message(META.usage),
            },
        },
        _ => usage_message(META.usage),
    };

    http.create_message(msg.channel_id).content(&reply).await?;

    Ok(())
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}
