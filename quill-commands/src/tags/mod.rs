pub mod alias;
pub mod aliases;
pub mod create;
pub mod embeds;
pub mod info;
pub mod list;
pub mod settings;
pub mod show;
pub mod transfer;

use twilight_model::gateway::payload::incoming::MessageCreate;

use quill_core::Context;

/// Route a `!tag <subcommand>` invocation.
pub async fn run(
    ctx: Context,
    msg: Box<MessageCreate>,
    arg1: Option<&str>,
    arg_tail: Option<&str>,
) -> anyhow::Result<()> {
    let Some(sub) = arg1 else {
        ctx.http
            .create_message(msg.channel_id)
            .content("Usage: `!tag <create|show|info|alias|transfer|list|aliases> ...`")
            .await?;
        return Ok(());
    };

    match sub.to_ascii_lowercase().as_str() {
        "create" => create::run(ctx, msg, arg_tail).await,
        "show" => show::run(ctx, msg, arg_tail).await,
        "info" => info::run(ctx, msg, arg_tail).await,
        "alias" => alias::run(ctx, msg, arg_tail).await,
        "transfer" => transfer::run(ctx, msg, arg_tail).await,
        "list" => list::run(ctx, msg, arg_tail).await,
        "aliases" => aliases::run(ctx, msg, arg_tail).await,
        other => {
            let reply = format!("Unknown tag subcommand: `{other}`. Try `!help tag`.");
            ctx.http.create_message(msg.channel_id).content(&reply).await?;
            Ok(())
        }
    }
}

/// Split a subcommand tail into a trigger and the remaining text.
///
/// Triggers are case-insensitive; they are folded to lowercase here and at
/// creation time.
pub(crate) fn split_trigger_and_tail(rest: Option<&str>) -> Option<(String, &str)> {
    let rest = rest?.trim();
    let mut parts = rest.splitn(2, char::is_whitespace);

    let trigger = parts.next().filter(|t| !t.is_empty())?.to_ascii_lowercase();
    let tail = parts.next().map(str::trim).unwrap_or("");

    Some((trigger, tail))
}

/// Extract a single lowercase trigger from a subcommand tail.
pub(crate) fn single_trigger(rest: Option<&str>) -> Option<String> {
    let (trigger, tail) = split_trigger_and_tail(rest)?;

    tail.is_empty().then_some(trigger)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_fold_to_lowercase() {
        assert_eq!(
            split_trigger_and_tail(Some("Rules read them")),
            Some(("rules".to_owned(), "read them"))
        );
        assert_eq!(single_trigger(Some("RULES")), Some("rules".to_owned()));
    }

    #[test]
    fn single_trigger_rejects_trailing_text() {
        assert_eq!(single_trigger(Some("rules extra")), None);
        assert_eq!(single_trigger(None), None);
    }
}
