use std::fmt::Write as _;

use twilight_model::channel::message::embed::Embed;
use twilight_util::builder::embed::EmbedBuilder;

use quill_database::model::{Alias, Tag};
use quill_utils::embed::{DEFAULT_EMBED_COLOR, sanitize_mentions};

const CONTENT_PREVIEW_LIMIT: usize = 256;
const TRANSFER_HISTORY_TAIL: usize = 5;

pub fn usage_message(usage: &str) -> String {
    format!("Usage: `{usage}`")
}

pub fn guild_only_message() -> &'static str {
    "This command only works in servers."
}

pub fn unknown_trigger_message(trigger: &str) -> String {
    format!("No tag or alias named `{trigger}`.")
}

/// Build the detail embed for a tag.
///
/// This is a pure view/template helper and does not perform HTTP requests.
pub fn tag_info_embed(tag: &Tag, aliases: &[Alias], show_transfers: bool) -> anyhow::Result<Embed> {
    let mut description = format!(
        "Owner: <@{owner}>\nCreator: <@{creator}>\nCreated: <t:{created}:F>\nUses: **{uses}**\n",
        owner = tag.owner,
        creator = tag.creator,
        created = tag.created,
        uses = tag.uses.len(),
    );

    let _ = writeln!(description, "\n{}", content_preview(&tag.content));

    if aliases.is_empty() {
        description.push_str("\nAliases: none\n");
    } else {
        let keys: Vec<String> = aliases
            .iter()
            .map(|alias| format!("`{}`", alias.alias))
            .collect();
        let _ = writeln!(description, "\nAliases: {}", keys.join(", "));
    }

    if show_transfers && !tag.transfers.is_empty() {
        let _ = writeln!(description, "\nTransfer history:");
        let start = tag.transfers.len().saturating_sub(TRANSFER_HISTORY_TAIL);
        for (index, transfer) in tag.transfers.iter().enumerate().skip(start) {
            let _ = writeln!(
                description,
                "#{idx} <t:{time}:F> from <@{prior}> to <@{to}>: {reason}",
                idx = index + 1,
                time = transfer.time,
                prior = transfer.prior,
                to = transfer.to,
                reason = sanitize_mentions(&transfer.reason),
            );
        }
    }

    let embed = EmbedBuilder::new()
        .title(format!("Tag `{}`", tag.tag))
        .color(DEFAULT_EMBED_COLOR)
        .description(description)
        .validate()?
        .build();

    Ok(embed)
}

fn content_preview(content: &str) -> String {
    let sanitized = sanitize_mentions(content);
    if sanitized.chars().count() <= CONTENT_PREVIEW_LIMIT {
        return sanitized;
    }

    let truncated: String = sanitized.chars().take(CONTENT_PREVIEW_LIMIT).collect();
    format!("{truncated}…")
}

#[cfg(test)]
mod tests {
    use quill_database::model::Transfer;

    use super::*;

    #[test]
    fn info_embed_hides_transfers_when_disabled() {
        let mut tag = Tag::new("rules", 100, 1_700_000_000, "Read the rules.");
        tag.record_transfer(Transfer::new(100, "handover", 200, 1_700_000_100));

        let shown = tag_info_embed(&tag, &[], true).unwrap();
        assert!(shown.description.unwrap().contains("Transfer history"));

        let hidden = tag_info_embed(&tag, &[], false).unwrap();
        assert!(!hidden.description.unwrap().contains("Transfer history"));
    }

    #[test]
    fn content_previews_are_bounded() {
        let long = "x".repeat(1000);
        assert!(content_preview(&long).chars().count() <= CONTENT_PREVIEW_LIMIT + 1);
        assert_eq!(content_preview("short"), "short");
    }
}
