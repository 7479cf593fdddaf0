//! Order tracking numbers.
//!
//! Format: `TRK` followed by the creation time in unix milliseconds and a
//! random `u32`, both in uppercase base 36. The result always matches
//! `^TRK[0-9A-Z]+$`.

use chrono::{DateTime, Utc};
use rand::Rng;

const PREFIX: &str = "TRK";
const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Encode a number in uppercase base 36.
fn base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        let digit = usize::try_from(value % 36).unwrap_or_default();
        out.push(DIGITS.get(digit).copied().unwrap_or(b'0'));
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Build a tracking number for `now` with random suffix `salt`.
#[must_use]
pub fn tracking_number(now: DateTime<Utc>, salt: u32) -> String {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    format!("{PREFIX}{}{}", base36(millis), base36(u64::from(salt)))
}

/// Generate tracking numbers until one is not `taken`.
pub fn unique_tracking_number<F>(now: DateTime<Utc>, mut taken: F) -> String
where
    F: FnMut(&str) -> bool,
{
    let mut rng = rand::rng();
    loop {
        let candidate = tracking_number(now, rng.random());
        if !taken(&candidate) {
            return candidate;
        }
        tracing::debug!(candidate = %candidate, "tracking number collision, retrying");
    }
}

/// Normalize user input for lookup: trimmed and uppercased.
#[must_use]
pub fn normalize(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn is_well_formed(s: &str) -> bool {
        s.strip_prefix(PREFIX).is_some_and(|rest| {
            !rest.is_empty()
                && rest
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        })
    }

    #[test]
    fn test_base36() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "Z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(u64::from(u32::MAX)), "1Z141Z3");
    }

    #[test]
    fn test_tracking_number_format() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let number = tracking_number(now, 12345);
        assert_eq!(number, format!("TRK{}9IX", base36(1_700_000_000_000)));
        assert!(is_well_formed(&number));
    }

    #[test]
    fn test_unique_skips_taken() {
        let now = Utc::now();
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let number = unique_tracking_number(now, |c| seen.contains(c));
            assert!(is_well_formed(&number));
            assert!(seen.insert(number));
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  trkabc12 "), "TRKABC12");
    }
}
