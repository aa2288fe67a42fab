//! Time utilities for turning range presets into epoch-second bounds.

use crate::error::{MacroError, Result};
use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};

/// Query window in Unix epoch seconds. `from` is inclusive, `to` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

impl TimeRange {
    pub const fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    pub fn from_datetimes(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(start.timestamp(), end.timestamp())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeRangeSpec {
    RelativeMinutes(i64),
    RelativeHours(i64),
    RelativeDays(i64),
    Today,
    Yesterday,
    Absolute {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    AbsoluteOpenEnd {
        from: DateTime<Utc>,
    },
}

impl TimeRangeSpec {
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<TimeRange> {
        let (start, end) = match self {
            TimeRangeSpec::RelativeMinutes(minutes) => {
                (rewind(now, Duration::try_minutes(*minutes))?, now)
            }
            TimeRangeSpec::RelativeHours(hours) => (rewind(now, Duration::try_hours(*hours))?, now),
            TimeRangeSpec::RelativeDays(days) => (rewind(now, Duration::try_days(*days))?, now),
            TimeRangeSpec::Today => (start_of_day(now), now),
            TimeRangeSpec::Yesterday => {
                let today = start_of_day(now);
                (rewind(today, Duration::try_days(1))?, today)
            }
            TimeRangeSpec::Absolute { from, to } => (*from, *to),
            TimeRangeSpec::AbsoluteOpenEnd { from } => (*from, now),
        };

        if start > end {
            return Err(MacroError::InvalidTimeRange(
                "range start must not be after its end".to_string(),
            ));
        }
        Ok(TimeRange::from_datetimes(start, end))
    }
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(now.date_naive().and_time(NaiveTime::MIN), Utc)
}

fn rewind(now: DateTime<Utc>, span: Option<Duration>) -> Result<DateTime<Utc>> {
    span.and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| MacroError::InvalidTimeRange("relative range is out of bounds".into()))
}

/// Parses presets such as `last_15m`, `1h`, `7d`, `today`, `yesterday` and
/// bracketed ranges `[start,end]` whose bounds are epoch seconds, RFC 3339 or
/// `%Y-%m-%d %H:%M:%S` in UTC. An empty end bound means "now".
pub fn parse_time_range(raw: &str) -> Result<TimeRangeSpec> {
    let trimmed = raw.trim().trim_matches('"').trim_matches('\'');

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        return parse_absolute_range(trimmed);
    }

    let value = trimmed.to_lowercase();
    if let Some(spec) = parse_relative_keyword(&value) {
        return Ok(spec);
    }

    if value.contains("min") || value.contains("hour") || value.contains("day") {
        if let Some(spec) = parse_spelled_duration(&value) {
            return Ok(spec);
        }
    }

    Err(MacroError::InvalidTimeRange(format!(
        "unsupported time token '{raw}'"
    )))
}

fn parse_relative_keyword(value: &str) -> Option<TimeRangeSpec> {
    match value {
        "today" => return Some(TimeRangeSpec::Today),
        "yesterday" => return Some(TimeRangeSpec::Yesterday),
        _ => {}
    }

    let normalized = value.replace(['_', '-'], "");
    if let Some(stripped) = normalized.strip_prefix("last") {
        if let Some(spec) = parse_numeric_suffix(stripped) {
            return Some(spec);
        }
    }
    parse_numeric_suffix(&normalized)
}

fn parse_spelled_duration(value: &str) -> Option<TimeRangeSpec> {
    let cleaned = value
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '_' && *ch != '-')
        .collect::<String>();
    let cleaned = cleaned.strip_prefix("last").unwrap_or(&cleaned);
    parse_numeric_suffix(cleaned)
}

fn parse_numeric_suffix(value: &str) -> Option<TimeRangeSpec> {
    let split = value
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, suffix) = value.split_at(split);
    let amount: i64 = digits.parse().ok()?;

    match suffix.trim() {
        "m" | "min" | "mins" | "minute" | "minutes" => Some(TimeRangeSpec::RelativeMinutes(amount)),
        "h" | "hour" | "hours" => Some(TimeRangeSpec::RelativeHours(amount)),
        "d" | "day" | "days" => Some(TimeRangeSpec::RelativeDays(amount)),
        _ => None,
    }
}

fn parse_absolute_range(value: &str) -> Result<TimeRangeSpec> {
    let inner = value.trim_matches(['[', ']']);
    let (start_raw, end_raw) = inner
        .split_once(',')
        .ok_or_else(|| MacroError::InvalidTimeRange("expected [start,end]".into()))?;
    let start_raw = start_raw.trim();
    let end_raw = end_raw.trim();

    if start_raw.is_empty() {
        return Err(MacroError::InvalidTimeRange(
            "range requires a start bound".into(),
        ));
    }

    let from = parse_bound(start_raw)?;
    if end_raw.is_empty() {
        return Ok(TimeRangeSpec::AbsoluteOpenEnd { from });
    }
    let to = parse_bound(end_raw)?;
    Ok(TimeRangeSpec::Absolute { from, to })
}

/// Accepts epoch seconds, RFC 3339, or a naive UTC timestamp.
fn parse_bound(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(seconds) = value.parse::<i64>() {
        return DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
            MacroError::InvalidTimeRange(format!("epoch value '{value}' is out of range"))
        });
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
    }
    Err(MacroError::InvalidTimeRange(format!(
        "invalid time literal '{value}'"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn parses_relative_presets() {
        let now = at("2025-01-02T12:00:00Z");

        let range = parse_time_range("last_15m").unwrap().resolve(now).unwrap();
        assert_eq!(range.to - range.from, 15 * 60);

        let range = parse_time_range("1h").unwrap().resolve(now).unwrap();
        assert_eq!(range, TimeRange::new(now.timestamp() - 3600, now.timestamp()));

        let range = parse_time_range("last 7 days").unwrap().resolve(now).unwrap();
        assert_eq!(range.to - range.from, 7 * 86_400);
    }

    #[test]
    fn resolves_calendar_keywords() {
        let now = at("2025-01-02T12:30:00Z");

        let today = parse_time_range("today").unwrap().resolve(now).unwrap();
        assert_eq!(today.from, at("2025-01-02T00:00:00Z").timestamp());
        assert_eq!(today.to, now.timestamp());

        let yesterday = parse_time_range("Yesterday").unwrap().resolve(now).unwrap();
        assert_eq!(
            yesterday,
            TimeRange::new(
                at("2025-01-01T00:00:00Z").timestamp(),
                at("2025-01-02T00:00:00Z").timestamp()
            )
        );
    }

    #[test]
    fn parses_absolute_range_with_mixed_bounds() {
        let spec = parse_time_range("[1600000000,2020-09-13T12:26:40Z]").unwrap();
        let range = spec.resolve(Utc::now()).unwrap();
        assert_eq!(range, TimeRange::new(1_600_000_000, 1_600_000_000));

        let spec = parse_time_range("[2025-01-01 00:00:00, 2025-01-01 01:00:00]").unwrap();
        let range = spec.resolve(Utc::now()).unwrap();
        assert_eq!(range.to - range.from, 3600);
    }

    #[test]
    fn open_end_resolves_to_now() {
        let now = at("2025-11-17T00:00:00Z");
        let range = parse_time_range("[2025-11-16T09:06:34Z,]")
            .unwrap()
            .resolve(now)
            .unwrap();
        assert_eq!(range.from, at("2025-11-16T09:06:34Z").timestamp());
        assert_eq!(range.to, now.timestamp());
    }

    #[test]
    fn rejects_inverted_and_unknown_ranges() {
        let inverted = parse_time_range("[200,100]").unwrap().resolve(Utc::now());
        assert!(matches!(inverted, Err(MacroError::InvalidTimeRange(_))));

        assert!(parse_time_range("fortnight").is_err());
        assert!(parse_time_range("[,100]").is_err());
        assert!(parse_time_range("[abc,100]").is_err());
    }

    #[test]
    fn rejects_relative_ranges_that_overflow() {
        let spec = parse_time_range("last_9999999999999d").unwrap();
        assert!(spec.resolve(Utc::now()).is_err());
    }
}
