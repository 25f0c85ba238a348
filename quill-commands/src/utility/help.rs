use std::fmt::Write as _;

use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::{COMMANDS, CommandMeta};
use quill_core::Context;
use quill_utils::embed::{DEFAULT_EMBED_COLOR, result_embed};

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "List all commands, or show usage for one.",
    category: "utility",
    usage: "!help [command]",
};

/// Show the command index, or usage for a single command family.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, arg1: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;

    let Some(raw_name) = arg1 else {
        let embed = result_embed("Commands", command_index(), DEFAULT_EMBED_COLOR)?;
        http.create_message(msg.channel_id).embeds(&[embed]).await?;
        return Ok(());
    };

    let lookup = raw_name.trim().trim_start_matches('!').to_ascii_lowercase();
    let matches: Vec<&CommandMeta> = COMMANDS
        .iter()
        .filter(|command| {
            command.name == lookup || command.name.starts_with(&format!("{lookup} "))
        })
        .collect();

    if matches.is_empty() {
        let out = format!("Unknown command: `{}`", lookup);
        http.create_message(msg.channel_id).content(&out).await?;
        return Ok(());
    }

    let mut out = String::new();
    for command in matches {
        let _ = writeln!(out, "`{}`: {}", command.usage, command.desc);
    }
    http.create_message(msg.channel_id).content(out.trim_end()).await?;

    Ok(())
}

fn command_index() -> String {
    let mut description = String::new();
    let mut current_category = "";

    for command in COMMANDS {
        if command.category != current_category {
            if !description.is_empty() {
                description.push('\n');
            }
            let _ = writeln!(description, "**{}**", command.category);
            current_category = command.category;
        }
        let _ = writeln!(description, "`{}`: {}", command.usage, command.desc);
    }

    description
}
