//! Permissive timestamp parsing for `Last-Modified` and similar headers.
//!
//! Servers in the wild send far more than the three date formats HTTP
//! allows. [`HTTP_DATE_LAYOUTS`] lists the accepted layouts in the order
//! they are tried; the first one that matches wins.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// One accepted timestamp shape.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Layout {
    /// RFC 2822 / RFC 1123 as understood by chrono, including obsolete zone names.
    Rfc2822,
    /// RFC 3339 with or without fractional seconds.
    Rfc3339,
    /// `strftime` pattern carrying a numeric offset (`%z`).
    Offset(&'static str),
    /// `strftime` pattern where one whitespace-separated `%Z` token holds a
    /// zone abbreviation such as `GMT` or `PST`.
    Abbreviated(&'static str),
    /// `strftime` pattern without any zone, read as UTC.
    Utc(&'static str),
    /// Date-only pattern, read as midnight UTC.
    Date(&'static str),
    /// Zoneless pattern without a year; the current UTC year is assumed,
    /// or the latest leap year for `Feb 29`.
    Yearless(&'static str),
}

/// Layouts tried by [`parse_timestamp`], in order.
pub const HTTP_DATE_LAYOUTS: &[Layout] = &[
    Layout::Rfc2822,
    // RFC 1123 / RFC 1123Z
    Layout::Abbreviated("%a, %d %b %Y %H:%M:%S %Z"),
    Layout::Offset("%a, %d %b %Y %H:%M:%S %z"),
    // RFC 850
    Layout::Abbreviated("%A, %d-%b-%y %H:%M:%S %Z"),
    // RFC 822 / RFC 822Z
    Layout::Abbreviated("%d %b %y %H:%M %Z"),
    Layout::Offset("%d %b %y %H:%M %z"),
    Layout::Rfc3339,
    // ANSI C
    Layout::Utc("%a %b %e %H:%M:%S %Y"),
    // Unix date
    Layout::Abbreviated("%a %b %e %H:%M:%S %Z %Y"),
    // Ruby date
    Layout::Offset("%a %b %d %H:%M:%S %z %Y"),
    // Stamp, StampMilli, StampMicro, StampNano
    Layout::Yearless("%b %e %H:%M:%S"),
    Layout::Yearless("%b %e %H:%M:%S%.3f"),
    Layout::Yearless("%b %e %H:%M:%S%.6f"),
    Layout::Yearless("%b %e %H:%M:%S%.9f"),
    Layout::Utc("%Y-%m-%d %H:%M:%S"),
    Layout::Date("%Y-%m-%d"),
];

/// Parses `input` against [`HTTP_DATE_LAYOUTS`].
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    parse_timestamp_with(input, HTTP_DATE_LAYOUTS)
}

/// Parses `input` against an explicit list of layouts, first match wins.
pub fn parse_timestamp_with(input: &str, layouts: &[Layout]) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    layouts
        .iter()
        .find_map(|layout| parse_layout(input, *layout))
}

fn parse_layout(input: &str, layout: Layout) -> Option<DateTime<Utc>> {
    match layout {
        Layout::Rfc2822 => DateTime::parse_from_rfc2822(input).ok().map(to_utc),
        Layout::Rfc3339 => DateTime::parse_from_rfc3339(input).ok().map(to_utc),
        Layout::Offset(pattern) => DateTime::parse_from_str(input, pattern).ok().map(to_utc),
        Layout::Abbreviated(pattern) => parse_abbreviated(input, pattern),
        Layout::Utc(pattern) => NaiveDateTime::parse_from_str(input, pattern)
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive)),
        Layout::Date(pattern) => NaiveDate::parse_from_str(input, pattern)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive)),
        Layout::Yearless(pattern) => {
            let current = Utc::now().year();
            let pattern = format!("%Y {pattern}");
            // leap years are at most eight apart
            (0..8)
                .map(|back| current - back)
                .find_map(|year| {
                    NaiveDateTime::parse_from_str(&format!("{year} {input}"), &pattern).ok()
                })
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
    }
}

/// chrono cannot parse zone names, so the `%Z` token is cut out of both
/// the input and the pattern and resolved through [`zone_offset_secs`].
fn parse_abbreviated(input: &str, pattern: &str) -> Option<DateTime<Utc>> {
    let pattern_tokens: Vec<&str> = pattern.split_whitespace().collect();
    let input_tokens: Vec<&str> = input.split_whitespace().collect();
    if pattern_tokens.len() != input_tokens.len() {
        return None;
    }
    let zone_index = pattern_tokens.iter().position(|token| *token == "%Z")?;
    let offset = zone_offset_secs(input_tokens[zone_index])?;

    let strip = |tokens: &[&str]| {
        tokens
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != zone_index)
            .map(|(_, token)| *token)
            .collect::<Vec<_>>()
            .join(" ")
    };
    let naive =
        NaiveDateTime::parse_from_str(&strip(&input_tokens), &strip(&pattern_tokens)).ok()?;
    FixedOffset::east_opt(offset)?
        .from_local_datetime(&naive)
        .single()
        .map(to_utc)
}

/// Offset east of UTC for a zone abbreviation.
///
/// The North American zones of RFC 822 are known; any other alphabetic
/// abbreviation is read as UTC. Non-alphabetic tokens are rejected.
fn zone_offset_secs(zone: &str) -> Option<i32> {
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let hours = match zone.to_ascii_uppercase().as_str() {
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        _ => 0,
    };
    Some(hours * 3600)
}

fn to_utc(value: DateTime<FixedOffset>) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}
