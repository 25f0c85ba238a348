use twilight_model::channel::message::embed::Embed;
use twilight_util::builder::embed::EmbedBuilder;

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x58_65_F2;
/// Embed color for successful operation results.
pub const SUCCESS_EMBED_COLOR: u32 = 0x00_FF_00;
/// Embed color for failed operation results.
pub const ERROR_EMBED_COLOR: u32 = 0xFF_00_00;

/// Build a simple titled result embed with the given accent color.
pub fn result_embed(title: &str, description: impl Into<String>, color: u32) -> anyhow::Result<Embed> {
    let embed = EmbedBuilder::new()
        .title(title)
        .color(color)
        .description(description)
        .validate()?
        .build();

    Ok(embed)
}

/// Neutralize mentions in user-supplied text before echoing it back.
pub fn sanitize_mentions(text: &str) -> String {
    text.replace('@', "@\u{200B}")
}
