//! Duration formatting and parsing for display and authoring.

use crate::error::ValidationError;

/// Format milliseconds as `MM:SS`.
///
/// Sub-second remainders are truncated, and minutes are not capped at 59,
/// so two hours renders as `120:00`.
pub fn format_duration(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Parse a user-entered duration into milliseconds.
///
/// Accepts `MM:SS`, a bare number of seconds (`45`), or unit suffixes
/// (`30s`, `2m`, `1m30s`, `1h`).
///
/// # Errors
/// Returns [`ValidationError::InvalidDuration`] for malformed input or a
/// zero-length duration.
pub fn parse_duration(input: &str) -> Result<u64, ValidationError> {
    let s = input.trim().to_ascii_lowercase();
    let invalid = || ValidationError::InvalidDuration(input.trim().to_string());

    let secs = if let Some((min, sec)) = s.split_once(':') {
        let min: u64 = min.parse().map_err(|_| invalid())?;
        let sec: u64 = sec.parse().map_err(|_| invalid())?;
        if sec >= 60 {
            return Err(invalid());
        }
        min.saturating_mul(60).saturating_add(sec)
    } else if s.chars().all(|c| c.is_ascii_digit()) && !s.is_empty() {
        s.parse().map_err(|_| invalid())?
    } else {
        parse_suffixed(&s).ok_or_else(invalid)?
    };

    if secs == 0 {
        return Err(invalid());
    }
    Ok(secs.saturating_mul(1000))
}

fn parse_suffixed(s: &str) -> Option<u64> {
    let mut total = 0u64;
    let mut digits = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        let n: u64 = digits.parse().ok()?;
        total = total.saturating_add(n.saturating_mul(unit));
        digits.clear();
    }
    if !digits.is_empty() || s.is_empty() {
        return None;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero() {
        assert_eq!(format_duration(0), "00:00");
    }

    #[test]
    fn truncates_sub_second() {
        assert_eq!(format_duration(999), "00:00");
        assert_eq!(format_duration(59_999), "00:59");
        assert_eq!(format_duration(61_500), "01:01");
    }

    #[test]
    fn minutes_not_capped() {
        assert_eq!(format_duration(2 * 60 * 60 * 1000), "120:00");
        assert_eq!(format_duration(3_725_000), "62:05");
    }

    #[test]
    fn parses_clock_form() {
        assert_eq!(parse_duration("1:30").unwrap(), 90_000);
        assert_eq!(parse_duration("00:05").unwrap(), 5_000);
        assert!(parse_duration("1:75").is_err());
    }

    #[test]
    fn parses_plain_seconds_and_suffixes() {
        assert_eq!(parse_duration("45").unwrap(), 45_000);
        assert_eq!(parse_duration("30s").unwrap(), 30_000);
        assert_eq!(parse_duration("2m").unwrap(), 120_000);
        assert_eq!(parse_duration("1m30s").unwrap(), 90_000);
        assert_eq!(parse_duration("1h").unwrap(), 3_600_000);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("0:00").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("5m3").is_err());
    }
}
