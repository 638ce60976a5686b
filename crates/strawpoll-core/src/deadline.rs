use chrono::{DateTime, TimeDelta, Utc};

use crate::error::CoreError;

/// Resolve a `--deadline` value to Unix seconds.
///
/// Accepts an RFC 3339 timestamp or a duration relative to `now` made of
/// `<n>d`, `<n>h`, `<n>m` and `<n>s` parts, e.g. `24h` or `1h30m`.
pub fn parse_deadline(input: &str, now: DateTime<Utc>) -> Result<i64, CoreError> {
    let input = input.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(at.timestamp());
    }

    parse_duration(input)
        .and_then(|secs| TimeDelta::try_seconds(i64::try_from(secs).ok()?))
        .and_then(|delta| now.checked_add_signed(delta))
        .map(|at| at.timestamp())
        .ok_or_else(|| CoreError::InvalidDeadline(input.to_string()))
}

/// Total seconds in a compact duration such as `2d`, `90m` or `1h30m`.
pub fn parse_duration(input: &str) -> Option<u64> {
    if input.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for ch in input.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let unit: u64 = match ch {
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        if digits.is_empty() {
            return None;
        }
        let amount: u64 = digits.parse().ok()?;
        total = total.checked_add(amount.checked_mul(unit)?)?;
        digits.clear();
    }

    // A trailing bare number has no unit.
    if !digits.is_empty() {
        return None;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("24h"), Some(86_400));
        assert_eq!(parse_duration("90m"), Some(5_400));
        assert_eq!(parse_duration("1h30m"), Some(5_400));
        assert_eq!(parse_duration("45s"), Some(45));
        assert_eq!(parse_duration("2d"), Some(172_800));
    }

    #[test]
    fn malformed_durations() {
        for bad in ["", "h", "10", "1x", "1.5h", "-2h", "1h 30m"] {
            assert_eq!(parse_duration(bad), None, "{bad}");
        }
    }

    #[test]
    fn deadline_from_duration_is_relative_to_now() {
        assert_eq!(parse_deadline("24h", now()), Ok(1_700_086_400));
        assert_eq!(parse_deadline(" 30m ", now()), Ok(1_700_001_800));
    }

    #[test]
    fn deadline_from_rfc3339() {
        assert_eq!(
            parse_deadline("2024-08-13T10:00:00Z", now()),
            Ok(1_723_543_200)
        );
        assert_eq!(
            parse_deadline("2024-08-13T12:00:00+02:00", now()),
            Ok(1_723_543_200)
        );
    }

    #[test]
    fn anything_else_is_rejected() {
        assert_eq!(
            parse_deadline("next friday", now()),
            Err(CoreError::InvalidDeadline("next friday".into()))
        );
    }
}
