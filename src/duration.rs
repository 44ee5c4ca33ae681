use std::time::Duration;

use anyhow::{Result, anyhow, bail};

const NANOS_PER_SECOND: u128 = 1_000_000_000;

const UNITS: [(&str, u128); 8] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", NANOS_PER_SECOND),
    ("m", 60 * NANOS_PER_SECOND),
    ("h", 60 * 60 * NANOS_PER_SECOND),
];

// Digits past this are below nanosecond precision for every unit.
const MAX_FRACTION_DIGITS: usize = 18;

/// Parses a duration written as a sequence of decimal numbers with unit suffixes, such as `30s`,
/// `1m30s`, `1.5h` or `300ms`.
///
/// Only positive durations are accepted.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let mut rest = s;
    if let Some(unsigned) = rest.strip_prefix('+') {
        rest = unsigned;
    } else if rest.starts_with('-') {
        bail!("duration must be positive: {s:?}");
    }

    if rest.is_empty() {
        bail!("invalid duration: {s:?}");
    }

    let mut total_nanos: u128 = 0;
    while !rest.is_empty() {
        let (integral, after) = split_digits(rest);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(after) => split_digits(after),
            None => ("", after),
        };
        if integral.is_empty() && fraction.is_empty() {
            bail!("invalid duration: {s:?}");
        }

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        if unit.is_empty() {
            bail!("missing unit in duration: {s:?}");
        }
        let Some(&(_, unit_nanos)) = UNITS.iter().find(|(name, _)| *name == unit) else {
            bail!("unknown unit {unit:?} in duration: {s:?}");
        };

        let overflow = || anyhow!("duration out of range: {s:?}");

        let integral_nanos = if integral.is_empty() {
            0
        } else {
            integral
                .parse::<u128>()
                .ok()
                .and_then(|v| v.checked_mul(unit_nanos))
                .ok_or_else(overflow)?
        };

        let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
        let fraction_nanos = if fraction.is_empty() {
            0
        } else {
            let numerator: u128 = fraction.parse().map_err(|_| overflow())?;
            numerator * unit_nanos / 10u128.pow(fraction.len() as u32)
        };

        total_nanos = integral_nanos
            .checked_add(fraction_nanos)
            .and_then(|nanos| total_nanos.checked_add(nanos))
            .ok_or_else(overflow)?;

        rest = after;
    }

    let total_nanos =
        u64::try_from(total_nanos).map_err(|_| anyhow!("duration out of range: {s:?}"))?;
    if total_nanos == 0 {
        bail!("duration must be positive: {s:?}");
    }

    Ok(Duration::from_nanos(total_nanos))
}

fn split_digits(s: &str) -> (&str, &str) {
    let len = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_units() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("300ms").unwrap(), Duration::from_millis(300));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("750us").unwrap(), Duration::from_micros(750));
        assert_eq!(parse_duration("750µs").unwrap(), Duration::from_micros(750));
        assert_eq!(parse_duration("10ns").unwrap(), Duration::from_nanos(10));
    }

    #[test]
    fn parses_compound_and_fractional() {
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("2h45m").unwrap(), Duration::from_secs(9900));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("5.s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("+10s").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn rejects_malformed() {
        for input in ["", "+", "30", "s", "abc", "30x", "1..5s", ".s", "30 s", "1m30"] {
            assert!(parse_duration(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn rejects_non_positive() {
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("0h0m").is_err());
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_duration("9999999999999h").is_err());
        assert!(parse_duration("94522879700260684295381835.9h").is_err());
        assert!(parse_duration("94522879700260684295381835h1h").is_err());
    }
}
