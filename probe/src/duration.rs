//! Duration strings in the `1h15m30.5s` style: an optional sign followed by
//! one or more decimal numbers, each with an optional fraction and a unit
//! suffix. Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`.
use std::time::Duration;

use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("time: invalid duration {0:?}")]
    Invalid(String),
    #[error("time: missing unit in duration {0:?}")]
    MissingUnit(String),
    #[error("time: unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },
    #[error("time: negative duration {0:?}")]
    Negative(String),
}

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Magnitude limit; only reachable by negative durations.
const LIMIT: u64 = 1 << 63;

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        // U+00B5 micro sign and U+03BC greek small mu.
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Parses a duration into nanoseconds.
pub fn parse(input: &str) -> Result<i64, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());

    let mut s = input.as_bytes();
    let mut neg = false;
    if let Some(&c) = s.first() {
        if c == b'-' || c == b'+' {
            neg = c == b'-';
            s = &s[1..];
        }
    }
    if s == b"0" {
        return Ok(0);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        if !(s[0] == b'.' || s[0].is_ascii_digit()) {
            return Err(invalid());
        }

        let before = s.len();
        let (mut v, rest) = leading_int(s).ok_or_else(invalid)?;
        s = rest;
        let pre = before != s.len();

        let mut frac = 0u64;
        let mut scale = 1.0f64;
        let mut post = false;
        if s.first() == Some(&b'.') {
            s = &s[1..];
            let before = s.len();
            let (f, sc, rest) = leading_fraction(s);
            frac = f;
            scale = sc;
            s = rest;
            post = before != s.len();
        }
        if !pre && !post {
            // "." or "-.s" has no digits at all.
            return Err(invalid());
        }

        let end = s
            .iter()
            .position(|c| *c == b'.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        if end == 0 {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        // The unit ends before an ASCII byte, so this is a char boundary.
        let unit = String::from_utf8_lossy(&s[..end]).into_owned();
        s = &s[end..];
        let unit_ns = unit_nanos(&unit).ok_or_else(|| DurationError::UnknownUnit {
            unit,
            input: input.to_string(),
        })?;

        if v > LIMIT / unit_ns {
            return Err(invalid());
        }
        v *= unit_ns;
        if frac > 0 {
            // Float keeps precision for fractions like 0.1h.
            v += (frac as f64 * (unit_ns as f64 / scale)) as u64;
            if v > LIMIT {
                return Err(invalid());
            }
        }
        total = total
            .checked_add(v)
            .filter(|t| *t <= LIMIT)
            .ok_or_else(invalid)?;
    }

    if neg {
        // total <= 2^63, so this wraps exactly onto i64::MIN at the limit.
        return Ok((total as i64).wrapping_neg());
    }
    if total > LIMIT - 1 {
        return Err(invalid());
    }
    Ok(total as i64)
}

/// Like [`parse`], for places that need a non-negative std duration.
pub fn parse_std(input: &str) -> Result<Duration, DurationError> {
    let nanos = parse(input)?;
    if nanos < 0 {
        return Err(DurationError::Negative(input.to_string()));
    }
    Ok(Duration::from_nanos(nanos as u64))
}

/// The nanosecond count of a parseable line, anything else unchanged.
pub fn render_line(line: &str) -> String {
    match parse(line) {
        Ok(nanos) => nanos.to_string(),
        Err(e) => {
            trace!(error = %e, "passing line through");
            line.to_string()
        }
    }
}

fn leading_int(s: &[u8]) -> Option<(u64, &[u8])> {
    let mut x: u64 = 0;
    let mut i = 0;
    while i < s.len() && s[i].is_ascii_digit() {
        if x > LIMIT / 10 {
            return None;
        }
        x = x * 10 + u64::from(s[i] - b'0');
        if x > LIMIT {
            return None;
        }
        i += 1;
    }
    Some((x, &s[i..]))
}

/// Digits past the precision limit are consumed but ignored.
fn leading_fraction(s: &[u8]) -> (u64, f64, &[u8]) {
    let mut x: u64 = 0;
    let mut scale = 1.0;
    let mut overflow = false;
    let mut i = 0;
    while i < s.len() && s[i].is_ascii_digit() {
        let digit = u64::from(s[i] - b'0');
        i += 1;
        if overflow {
            continue;
        }
        if x > (LIMIT - 1) / 10 {
            overflow = true;
            continue;
        }
        let y = x * 10 + digit;
        if y > LIMIT {
            overflow = true;
            continue;
        }
        x = y;
        scale *= 10.0;
    }
    (x, scale, &s[i..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_durations() {
        let cases: &[(&str, i64)] = &[
            ("0", 0),
            ("-0", 0),
            ("+0", 0),
            ("5s", 5 * SECOND as i64),
            ("30s", 30 * SECOND as i64),
            ("1478s", 1478 * SECOND as i64),
            ("-5s", -5 * SECOND as i64),
            ("+5s", 5 * SECOND as i64),
            ("-0.5s", -(500 * MILLISECOND as i64)),
            ("1.5h", 90 * MINUTE as i64),
            ("1h", 3_600_000_000_000),
            ("100ms", 100 * MILLISECOND as i64),
            ("10ns", 10),
            ("11us", 11_000),
            ("12µs", 12_000),
            ("12μs", 12_000),
            ("3h30m", (3 * HOUR + 30 * MINUTE) as i64),
            ("10.5s4m", (4 * MINUTE + 10 * SECOND + 500 * MILLISECOND) as i64),
            ("-2m3.4s", -((2 * MINUTE + 3 * SECOND + 400 * MILLISECOND) as i64)),
            ("1h2m3s4ms5us6ns", (HOUR + 2 * MINUTE + 3 * SECOND + 4 * MILLISECOND + 5 * MICROSECOND + 6) as i64),
            ("5.s", 5 * SECOND as i64),
            (".5s", 500 * MILLISECOND as i64),
            ("0.100000000000000000000h", 6 * MINUTE as i64),
            ("9223372036854775807ns", i64::MAX),
            ("-9223372036854775808ns", i64::MIN),
        ];
        for (input, want) in cases {
            assert_eq!(parse(input), Ok(*want), "input {:?}", input);
        }
    }

    #[test]
    fn rejects_invalid_durations() {
        for input in [
            "", "3", "-", "s", ".", "-.", ".s", "+.s", "1d", "\u{85}\u{85}",
            "9223372036854775808ns", "9223372036854775.808us", "3000000h",
            "9223372036854775808ns9223372036854775808ns",
            "-9223372036854775808ns1ns",
        ] {
            assert!(parse(input).is_err(), "input {:?}", input);
            assert_eq!(render_line(input), input);
        }
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            parse("3").unwrap_err().to_string(),
            "time: missing unit in duration \"3\""
        );
        assert_eq!(
            parse("1d").unwrap_err(),
            DurationError::UnknownUnit {
                unit: "d".into(),
                input: "1d".into()
            }
        );
        assert_eq!(
            parse("x").unwrap_err().to_string(),
            "time: invalid duration \"x\""
        );
    }

    #[test]
    fn std_durations_are_non_negative() {
        assert_eq!(parse_std("100ms"), Ok(Duration::from_millis(100)));
        assert_eq!(parse_std("4s"), Ok(Duration::from_secs(4)));
        assert!(matches!(parse_std("-1s"), Err(DurationError::Negative(_))));
    }

    #[test]
    fn renders_lines() {
        assert_eq!(render_line("1h"), "3600000000000");
        assert_eq!(render_line("not-a-duration"), "not-a-duration");
        assert_eq!(render_line(""), "");
    }

    #[test]
    fn rendering_is_idempotent() {
        for line in ["1h", "0", "-1.5s", "250ms", "garbage", "3600000000000", "", "12µs"] {
            let once = render_line(line);
            assert_eq!(render_line(&once), once, "line {:?}", line);
        }
    }
}
