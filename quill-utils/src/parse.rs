use twilight_model::id::{Id, marker::UserMarker};

/// Split a free-text conversion request on its literal `" to "` separator.
///
/// Returns `None` when the separator is absent; the caller is expected to
/// treat that as a user-input validation failure, not an error.
pub fn split_conversion(raw: &str) -> Option<(&str, &str)> {
    let (source, target) = raw.split_once(" to ")?;

    Some((source.trim(), target.trim()))
}

/// Extract the quantity and unit from a conversion source expression.
///
/// The quantity is the first contiguous run of ASCII digits; the unit is the
/// remainder of the expression with that run removed and trimmed. Returns
/// `None` when the expression contains no digits.
pub fn extract_quantity(source: &str) -> Option<(String, String)> {
    let amount = first_digit_run(source)?;
    let unit = source.replacen(&amount, "", 1).trim().to_owned();

    Some((amount, unit))
}

fn first_digit_run(raw: &str) -> Option<String> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let run: String = raw[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();

    Some(run)
}

/// Parse a target user from a raw argument (`<@id>`, `<@!id>`, or raw ID).
pub fn parse_target_user_id(raw: &str) -> Option<Id<UserMarker>> {
    let trimmed = raw.trim();

    let numeric = if trimmed.starts_with("<@") && trimmed.ends_with('>') {
        let without_wrappers = trimmed.strip_prefix("<@")?.strip_suffix('>')?;
        without_wrappers
            .strip_prefix('!')
            .unwrap_or(without_wrappers)
    } else {
        trimmed
    };

    let id = numeric.parse::<u64>().ok()?;

    Some(Id::new(id))
}

/// Parse an on/off style toggle argument.
pub fn parse_toggle(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "enable" | "enabled" => Some(true),
        "off" | "false" | "no" | "disable" | "disabled" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_requires_literal_separator() {
        assert_eq!(split_conversion("23cm to in"), Some(("23cm", "in")));
        assert_eq!(split_conversion("23cm in"), None);
        assert_eq!(split_conversion("23cm to_in"), None);
    }

    #[test]
    fn split_keeps_everything_left_of_first_separator() {
        assert_eq!(
            split_conversion("5in + 5ft to cm"),
            Some(("5in + 5ft", "cm"))
        );
    }

    #[test]
    fn quantity_is_first_digit_run() {
        assert_eq!(
            extract_quantity("23cm"),
            Some(("23".to_owned(), "cm".to_owned()))
        );
        assert_eq!(
            extract_quantity("5in + 5ft"),
            Some(("5".to_owned(), "in + 5ft".to_owned()))
        );
        assert_eq!(
            extract_quantity("  120  km/h"),
            Some(("120".to_owned(), "km/h".to_owned()))
        );
    }

    #[test]
    fn quantity_requires_digits() {
        assert_eq!(extract_quantity("feet"), None);
        assert_eq!(extract_quantity(""), None);
    }

    #[test]
    fn target_user_id_accepts_mentions_and_raw_ids() {
        let expected = Id::new(80_351_110_224_678_912);
        assert_eq!(parse_target_user_id("80351110224678912"), Some(expected));
        assert_eq!(parse_target_user_id("<@80351110224678912>"), Some(expected));
        assert_eq!(
            parse_target_user_id("<@!80351110224678912>"),
            Some(expected)
        );
        assert_eq!(parse_target_user_id("not-a-user"), None);
    }

    #[test]
    fn toggle_accepts_common_spellings() {
        assert_eq!(parse_toggle("on"), Some(true));
        assert_eq!(parse_toggle("Off"), Some(false));
        assert_eq!(parse_toggle("maybe"), None);
    }
}
