//! Small formatting helpers shared by the command and config layers.

use std::time::Duration;

/// Formats an uptime as `1d 2h 3m 4s`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!(
        "{}d {}h {}m {}s",
        secs / 86_400,
        (secs % 86_400) / 3_600,
        (secs % 3_600) / 60,
        secs % 60
    )
}

/// Whether `value` is a `#RRGGBB` color.
#[must_use]
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parses a `#RRGGBB` color into its 24-bit value.
#[must_use]
pub fn parse_hex_color(value: &str) -> Option<u32> {
    if is_hex_color(value) {
        u32::from_str_radix(&value[1..], 16).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(5)), "0d 0h 0m 5s");
        assert_eq!(format_duration(Duration::from_secs(3_725)), "0d 1h 2m 5s");
        assert_eq!(format_duration(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_hex_color("#5865F2"), Some(0x58_65_F2));
        assert_eq!(parse_hex_color("#ed4245"), Some(0xED_42_45));
        assert!(parse_hex_color("5865F2").is_none());
        assert!(parse_hex_color("#5865F").is_none());
        assert!(parse_hex_color("#GGGGGG").is_none());
    }
}
