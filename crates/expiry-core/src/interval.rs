//! Scan interval presets and parsing.

use crate::error::{Error, Result};
use crate::settings::MAX_SCAN_INTERVAL_SECS;

/// The intervals offered by the settings prompt, in seconds.
pub const INTERVAL_PRESETS: &[(u64, &str)] = &[
    (15 * 60, "15 minutes"),
    (30 * 60, "30 minutes"),
    (60 * 60, "1 hour"),
    (2 * 60 * 60, "2 hours"),
    (3 * 60 * 60, "3 hours"),
    (4 * 60 * 60, "4 hours"),
    (24 * 60 * 60, "24 hours"),
];

/// Human label for an interval: the preset name when there is one.
pub fn interval_label(secs: u64) -> String {
    if let Some((_, label)) = INTERVAL_PRESETS.iter().find(|(s, _)| *s == secs) {
        return (*label).to_string();
    }
    match secs {
        s if s % 3600 == 0 => plural(s / 3600, "hour"),
        s if s % 60 == 0 => plural(s / 60, "minute"),
        s => plural(s, "second"),
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Parse an interval given as seconds (`10800`), a suffixed value
/// (`90s`, `15m`, `3h`, `1d`), or a preset label (`"3 hours"`).
pub fn parse_interval(s: &str) -> Result<u64> {
    let input = s.trim().to_ascii_lowercase();
    let invalid = |reason: &str| Error::InvalidSetting {
        key: "scan_interval",
        reason: format!("'{}' {}", s.trim(), reason),
    };

    if let Some((secs, _)) = INTERVAL_PRESETS
        .iter()
        .find(|(_, label)| label.eq_ignore_ascii_case(&input))
    {
        return Ok(*secs);
    }

    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);
    let value: u64 = digits
        .parse()
        .map_err(|_| invalid("is not a number of seconds or a duration like 15m, 3h"))?;

    let multiplier = match unit.trim() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600,
        "d" | "day" | "days" => 86_400,
        _ => return Err(invalid("has an unknown unit")),
    };

    let secs = value
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("is too large"))?;
    if secs == 0 {
        return Err(invalid("must be greater than zero"));
    }
    if secs > MAX_SCAN_INTERVAL_SECS {
        return Err(invalid("is longer than 30 days"));
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_for_presets() {
        assert_eq!(interval_label(900), "15 minutes");
        assert_eq!(interval_label(10_800), "3 hours");
        assert_eq!(interval_label(86_400), "24 hours");
    }

    #[test]
    fn test_labels_for_other_values() {
        assert_eq!(interval_label(5 * 3600), "5 hours");
        assert_eq!(interval_label(60), "1 minute");
        assert_eq!(interval_label(45), "45 seconds");
    }

    #[test]
    fn test_parse_plain_seconds() {
        assert_eq!(parse_interval("10800").unwrap(), 10_800);
        assert_eq!(parse_interval(" 60 ").unwrap(), 60);
    }

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(parse_interval("15m").unwrap(), 900);
        assert_eq!(parse_interval("3h").unwrap(), 10_800);
        assert_eq!(parse_interval("1d").unwrap(), 86_400);
        assert_eq!(parse_interval("90 s").unwrap(), 90);
    }

    #[test]
    fn test_parse_preset_labels() {
        assert_eq!(parse_interval("30 minutes").unwrap(), 1800);
        assert_eq!(parse_interval("24 Hours").unwrap(), 86_400);
    }

    #[test]
    fn test_parse_rejects_zero_and_garbage() {
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("0h").is_err());
        assert!(parse_interval("soon").is_err());
        assert!(parse_interval("5 fortnights").is_err());
        assert!(parse_interval("").is_err());
    }

    #[test]
    fn test_parse_rejects_overlong_intervals() {
        assert_eq!(parse_interval("30d").unwrap(), MAX_SCAN_INTERVAL_SECS);
        assert!(parse_interval("31d").is_err());
        assert!(parse_interval(&u64::MAX.to_string()).is_err());
        assert!(parse_interval("18446744073709551615h").is_err());
    }
}
