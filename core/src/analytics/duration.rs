use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("duration pattern is valid")
});

/// Parses a "PT#H#M#S" duration into seconds. Missing parts default to 0;
/// anything that does not match the pattern, or overflows `u64`, parses to 0.
pub fn parse_duration(value: &str) -> u64 {
    let Some(caps) = ISO_DURATION.captures(value.trim()) else {
        return 0;
    };
    let part = |idx: usize| -> Option<u64> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse::<u64>().ok(),
            None => Some(0),
        }
    };
    let total = || -> Option<u64> {
        part(1)?
            .checked_mul(3600)?
            .checked_add(part(2)?.checked_mul(60)?)?
            .checked_add(part(3)?)
    };
    total().unwrap_or(0)
}

/// Inverse of [`parse_duration`] for whole seconds.
pub fn format_duration_iso(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}M", minutes));
    }
    if secs > 0 || (hours == 0 && minutes == 0) {
        out.push_str(&format!("{}S", secs));
    }
    out
}

/// Display form: "M:SS" under an hour, otherwise "H:MM:SS".
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(u64),
    Iso(String),
}

/// Accepts either integer seconds or an ISO-8601 "PT..." string.
pub(crate) fn deserialize_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawDuration::deserialize(deserializer)? {
        RawDuration::Seconds(seconds) => seconds,
        RawDuration::Iso(text) => parse_duration(&text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_full_and_partial_durations() {
        assert_eq!(parse_duration("PT1H2M3S"), 3723);
        assert_eq!(parse_duration("PT10M30S"), 630);
        assert_eq!(parse_duration("PT45S"), 45);
        assert_eq!(parse_duration("PT2H"), 7200);
    }

    #[test]
    fn malformed_durations_parse_to_zero() {
        assert_eq!(parse_duration("10:30"), 0);
        assert_eq!(parse_duration(""), 0);
        assert_eq!(parse_duration("P1DT2H"), 0);
    }

    #[test]
    fn overflowing_durations_parse_to_zero() {
        assert_eq!(parse_duration("PT9999999999999999H"), 0);
        assert_eq!(parse_duration("PT99999999999999999999S"), 0);
        assert_eq!(parse_duration("PT1H18446744073709551615S"), 0);
    }

    #[test]
    fn overflowing_duration_field_deserializes_to_zero() {
        let video: crate::analytics::ChannelVideo = serde_json::from_str(
            r#"{"id": "x", "title": "t", "publishedAt": "2024-01-02T00:00:00Z", "duration": "PT9999999999999999H"}"#,
        )
        .unwrap();
        assert_eq!(video.duration_seconds, 0);
    }

    #[test]
    fn display_format_uses_clock_notation() {
        assert_eq!(format_duration(630), "10:30");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(3723), "1:02:03");
    }

    #[test]
    fn iso_format_of_zero_is_explicit() {
        assert_eq!(format_duration_iso(0), "PT0S");
        assert_eq!(format_duration_iso(3723), "PT1H2M3S");
    }

    proptest! {
        #[test]
        fn parse_inverts_iso_format(seconds in 0u64..1_000_000) {
            prop_assert_eq!(parse_duration(&format_duration_iso(seconds)), seconds);
        }
    }
}
