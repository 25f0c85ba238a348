use anyhow::Context as _;
use tokio::process::Command;
use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use quill_core::Context;
use quill_utils::embed::{ERROR_EMBED_COLOR, SUCCESS_EMBED_COLOR, result_embed};
use quill_utils::parse::{extract_quantity, split_conversion};

pub const META: CommandMeta = CommandMeta {
    name: "convert",
    desc: "Convert between units via the units(1) utility.",
    category: "utility",
    usage: "!convert <from> to <to>",
};

const UNITS_BIN: &str = "units";

/// Convert a quantity between units by delegating to the external tool.
///
/// One invocation, no retries: a tool failure is rendered as an error card
/// and the command is done.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, rest: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(request) = rest else {
        let usage = format!("Usage: `{}`", META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    let Some((source, target)) = split_conversion(request) else {
        let reply = format!(
            "`{request}` is not a valid conversion. Please make sure it is in the format `{}`",
            META.usage
        );
        http.create_message(msg.channel_id).content(&reply).await?;
        return Ok(());
    };

    let (amount, unit) =
        extract_quantity(source).with_context(|| format!("no numeric quantity in `{source}`"))?;
    let source_expression = format!("{amount} {unit}");

    // tokio's process support keeps the event loop responsive while the
    // tool runs. A hung tool hangs this invocation only.
    let output = Command::new(UNITS_BIN)
        .arg(&source_expression)
        .arg(target)
        .output()
        .await?;

    let embed = if output.status.success() {
        let result = clean_result_line(&first_line(&output.stdout));
        result_embed(
            "Convert",
            format!("`{request}`\n`{result}{target}`"),
            SUCCESS_EMBED_COLOR,
        )?
    } else {
        let diagnostic = first_diagnostic_line(&output.stderr, &output.stdout);
        result_embed(
            "Error",
            format!("Error when converting `{request}`\n{diagnostic}"),
            ERROR_EMBED_COLOR,
        )?
    };

    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}

/// First line of a tool output stream, lossily decoded and trimmed.
fn first_line(stream: &[u8]) -> String {
    String::from_utf8_lossy(stream)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_owned()
}

/// Strip the `*` or `/` operation marker the tool prepends to results.
fn clean_result_line(line: &str) -> String {
    let line = line.trim();
    let cleaned = line
        .strip_prefix('*')
        .or_else(|| line.strip_prefix('/'))
        .unwrap_or(line);

    cleaned.trim().to_owned()
}

/// First diagnostic line of a failed invocation: stderr, then stdout.
fn first_diagnostic_line(stderr: &[u8], stdout: &[u8]) -> String {
    let from_stderr = first_line(stderr);
    if !from_stderr.is_empty() {
        return from_stderr;
    }

    first_line(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_lines_lose_their_operation_marker() {
        assert_eq!(clean_result_line("\t* 2.54"), "2.54");
        assert_eq!(clean_result_line("/ 0.39370079"), "0.39370079");
        assert_eq!(clean_result_line("1.09361"), "1.09361");
    }

    #[test]
    fn only_the_first_output_line_is_read() {
        let stdout = b"\t* 2.54\n\t/ 0.39370079\n";
        assert_eq!(first_line(stdout), "* 2.54");
    }

    #[test]
    fn diagnostics_prefer_stderr_over_stdout() {
        let stderr = b"conformability error\n\t23 cm = 0.23 m\n";
        assert_eq!(
            first_diagnostic_line(stderr, b"ignored"),
            "conformability error"
        );
        assert_eq!(first_diagnostic_line(b"", b"Unknown unit 'xyz'\n"), "Unknown unit 'xyz'");
    }
}
