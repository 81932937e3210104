use std::fmt::Write;
use std::time::Duration;

use crate::utils::{ExportError, Result};

/// Longest message time-to-live the emulator accepts.
pub const MAX_TIME_TO_LIVE: Duration = Duration::from_secs(60 * 60);

/// Longest duplicate detection history window the emulator accepts.
pub const MAX_DUPLICATE_DETECTION: Duration = Duration::from_secs(5 * 60);

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Date designators in the order they may appear, with their length in
/// seconds. Years and months use fixed 365 and 30 day lengths.
const DATE_UNITS: [(char, u64); 4] = [('Y', 365 * DAY), ('M', 30 * DAY), ('W', 7 * DAY), ('D', DAY)];
const TIME_UNITS: [(char, u64); 3] = [('H', HOUR), ('M', MINUTE), ('S', 1)];

/// Caps an optional ISO-8601 duration to `max`.
///
/// Absent stays absent. Values at or below `max` come back as the exact input
/// string; longer values are replaced by `max` in canonical form.
pub fn cap_duration(value: Option<String>, max: Duration) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    if parse_iso8601(&value)? > max {
        return Ok(Some(format_iso8601(max)));
    }

    Ok(Some(value))
}

/// Parses durations of the form `PnYnMnWnDTnHnMn.nS`.
///
/// Only the seconds component may carry a fraction (`.` or `,`), up to
/// nanosecond precision; extra digits are truncated.
pub fn parse_iso8601(value: &str) -> Result<Duration> {
    let invalid = || ExportError::Duration(value.to_string());

    let body = value.strip_prefix('P').ok_or_else(invalid)?;
    let (date, time) = match body.split_once('T') {
        Some((_, "")) => return Err(invalid()),
        Some((date, time)) => (date, Some(time)),
        None => (body, None),
    };
    if date.is_empty() && time.is_none() {
        return Err(invalid());
    }

    let mut total = Duration::ZERO;
    for component in components(date, &DATE_UNITS).ok_or_else(invalid)? {
        if component.fraction.is_some() {
            return Err(invalid());
        }
        total = component
            .to_duration()
            .and_then(|d| total.checked_add(d))
            .ok_or_else(invalid)?;
    }

    for component in components(time.unwrap_or(""), &TIME_UNITS).ok_or_else(invalid)? {
        if component.fraction.is_some() && component.unit_secs != 1 {
            return Err(invalid());
        }
        total = component
            .to_duration()
            .and_then(|d| total.checked_add(d))
            .ok_or_else(invalid)?;
    }

    Ok(total)
}

/// Formats a duration as `P[nD][T[nH][nM][n[.f]S]]`, or `PT0S` when zero.
pub fn format_iso8601(duration: Duration) -> String {
    let secs = duration.as_secs();
    let nanos = duration.subsec_nanos();

    let days = secs / DAY;
    let hours = secs % DAY / HOUR;
    let minutes = secs % HOUR / MINUTE;
    let seconds = secs % MINUTE;

    let mut out = String::from("P");
    if days > 0 {
        let _ = write!(out, "{days}D");
    }

    if hours > 0 || minutes > 0 || seconds > 0 || nanos > 0 {
        out.push('T');
        if hours > 0 {
            let _ = write!(out, "{hours}H");
        }
        if minutes > 0 {
            let _ = write!(out, "{minutes}M");
        }
        if seconds > 0 || nanos > 0 {
            let _ = write!(out, "{seconds}");
            if nanos > 0 {
                let fraction = format!("{nanos:09}");
                let _ = write!(out, ".{}", fraction.trim_end_matches('0'));
            }
            out.push('S');
        }
    }

    if out == "P" {
        out.push_str("T0S");
    }
    out
}

struct Component<'a> {
    whole: &'a str,
    fraction: Option<&'a str>,
    unit_secs: u64,
}

impl Component<'_> {
    fn to_duration(&self) -> Option<Duration> {
        let whole: u64 = self.whole.parse().ok()?;
        let secs = whole.checked_mul(self.unit_secs)?;

        let nanos = match self.fraction {
            Some(fraction) => {
                let digits: String = fraction.chars().chain(std::iter::repeat('0')).take(9).collect();
                digits.parse::<u32>().ok()?
            }
            None => 0,
        };

        Some(Duration::new(secs, nanos))
    }
}

/// Splits `part` into `<number><designator>` pairs. Designators must come
/// from `units`, in order, each at most once.
fn components<'a>(part: &'a str, units: &[(char, u64)]) -> Option<Vec<Component<'a>>> {
    let mut out = Vec::new();
    let mut next_unit = 0;
    let mut rest = part;

    while !rest.is_empty() {
        let end = rest.find(|c: char| c.is_ascii_alphabetic())?;
        let designator = rest[end..].chars().next()?;
        let number = &rest[..end];
        rest = &rest[end + designator.len_utf8()..];

        let offset = units[next_unit..].iter().position(|(d, _)| *d == designator)?;
        let unit_secs = units[next_unit + offset].1;
        next_unit += offset + 1;

        let (whole, fraction) = match number.split_once(['.', ',']) {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (number, None),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if let Some(fraction) = fraction {
            if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
        }

        out.push(Component {
            whole,
            fraction,
            unit_secs,
        });
    }

    Some(out)
}
