//! Date normalization.
//!
//! Recognizes four date conventions, tried in this priority order:
//!
//! | Style | Example |
//! |-------|---------|
//! | [`DateStyle::Us`] | `1/15/25, 9:05` |
//! | [`DateStyle::EuBracket`] | `[15.01.2025, 09:05:00]` |
//! | [`DateStyle::EuPlain`] | `15.01.2025, 09:05:00` |
//! | [`DateStyle::Record`] | `2025-01-15 09:05:00` |
//!
//! Every result is tagged with the style it came from so the transcript can
//! be written back in the same convention.
//!
//! Two-digit years are pivoted at [`YEAR_PIVOT`]: `00`-`49` become 20xx and
//! `50`-`99` become 19xx. The pivot is a fixed policy, so a US-style
//! transcript cannot represent dates outside 1950-2049.
//!
//! Normalization never fails. A string that matches no convention, or
//! matches one but names an impossible date, is logged as a warning and
//! mapped to the Unix epoch so that repeated runs stay deterministic.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::{Captures, Regex};

use crate::message::DateStyle;

/// Two-digit years below this value belong to the 21st century.
pub const YEAR_PIVOT: i32 = 50;

// M/D/YY, H:MM  (seconds and a 12-hour suffix are tolerated)
static US_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2}),\s(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s?([AaPp][Mm]))?",
    )
    .expect("valid US date regex")
});

// [DD.MM.YYYY, HH:MM:SS]
static EU_BRACKET_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(\d{1,2})\.(\d{1,2})\.(\d{4}|\d{2}),\s(\d{1,2}):(\d{2})(?::(\d{2}))?\]")
        .expect("valid bracketed EU date regex")
});

// DD.MM.YYYY, HH:MM:SS
static EU_PLAIN_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4}|\d{2}),\s(\d{1,2}):(\d{2})(?::(\d{2}))?")
        .expect("valid EU date regex")
});

// YYYY-MM-DD HH:MM:SS
static RECORD_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})[ T](\d{1,2}):(\d{2})(?::(\d{2}))?")
        .expect("valid record date regex")
});

/// A timestamp together with the convention it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedDate {
    pub instant: DateTime<Utc>,
    pub style: DateStyle,
    /// `true` when the input could not be read and the epoch placeholder
    /// was substituted.
    pub fallback: bool,
}

impl NormalizedDate {
    fn placeholder(style: DateStyle) -> Self {
        Self {
            instant: DateTime::<Utc>::UNIX_EPOCH,
            style,
            fallback: true,
        }
    }
}

/// Patterns in priority order.
fn patterns() -> [(&'static Regex, DateStyle); 4] {
    [
        (&*US_DATE, DateStyle::Us),
        (&*EU_BRACKET_DATE, DateStyle::EuBracket),
        (&*EU_PLAIN_DATE, DateStyle::EuPlain),
        (&*RECORD_DATE, DateStyle::Record),
    ]
}

fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    if raw.len() > 2 {
        Some(year)
    } else if year < YEAR_PIVOT {
        Some(2000 + year)
    } else {
        Some(1900 + year)
    }
}

fn number(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx).map_or(Some(0), |m| m.as_str().parse().ok())
}

/// Builds the instant from captured components; `None` for impossible dates.
fn instant_from(caps: &Captures<'_>, style: DateStyle) -> Option<DateTime<Utc>> {
    let (year, month, day) = match style {
        DateStyle::Us => (expand_year(&caps[3])?, number(caps, 1)?, number(caps, 2)?),
        DateStyle::EuBracket | DateStyle::EuPlain => {
            (expand_year(&caps[3])?, number(caps, 2)?, number(caps, 1)?)
        }
        DateStyle::Record => (caps[1].parse().ok()?, number(caps, 2)?, number(caps, 3)?),
    };

    let mut hour = number(caps, 4)?;
    let minute = number(caps, 5)?;
    let second = number(caps, 6)?;

    if let Some(meridiem) = caps.get(7) {
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("pm");
        hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    }

    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, minute, second)
        .map(|naive| naive.and_utc())
}

/// Strictly parses a complete date string.
///
/// Returns `None` if the whole (trimmed) string is not one of the supported
/// conventions or names an impossible date.
///
/// ```
/// use chatsync::message::DateStyle;
/// use chatsync::parsing::parse_date;
///
/// let (ts, style) = parse_date("1/1/25, 12:00").unwrap();
/// assert_eq!(style, DateStyle::Us);
/// assert_eq!(ts.to_rfc3339(), "2025-01-01T12:00:00+00:00");
/// ```
pub fn parse_date(input: &str) -> Option<(DateTime<Utc>, DateStyle)> {
    let input = input.trim();
    patterns().into_iter().find_map(|(regex, style)| {
        let caps = regex.captures(input)?;
        if caps[0].len() != input.len() {
            return None;
        }
        instant_from(&caps, style).map(|ts| (ts, style))
    })
}

/// Normalizes a date string, falling back to the epoch placeholder.
///
/// ```
/// use chatsync::message::DateStyle;
/// use chatsync::parsing::normalize;
///
/// let date = normalize("[15.01.2025, 09:05:00]");
/// assert_eq!(date.style, DateStyle::EuBracket);
/// assert!(!date.fallback);
///
/// let bad = normalize("yesterday");
/// assert!(bad.fallback);
/// ```
pub fn normalize(input: &str) -> NormalizedDate {
    match parse_date(input) {
        Some((instant, style)) => NormalizedDate {
            instant,
            style,
            fallback: false,
        },
        None => {
            tracing::warn!(input = %input, "Unrecognized date, using epoch placeholder");
            NormalizedDate::placeholder(DateStyle::Record)
        }
    }
}

/// Splits a leading transcript date (US, bracketed EU or plain EU) off a line.
///
/// Returns the normalized date and the remainder of the line. A prefix that
/// has the shape of a date but names an impossible one still counts as a
/// date; it is normalized to the placeholder with a warning.
pub fn split_leading_date(line: &str) -> Option<(NormalizedDate, &str)> {
    patterns()
        .into_iter()
        .filter(|(_, style)| style.is_transcript())
        .find_map(|(regex, style)| {
            let caps = regex.captures(line)?;
            let rest = &line[caps[0].len()..];
            let date = match instant_from(&caps, style) {
                Some(instant) => NormalizedDate {
                    instant,
                    style,
                    fallback: false,
                },
                None => {
                    let raw = &caps[0];
                    tracing::warn!(input = %raw, "Impossible transcript date, using epoch placeholder");
                    NormalizedDate::placeholder(style)
                }
            };
            Some((date, rest))
        })
}

/// Formats a timestamp in the given convention.
///
/// ```
/// use chatsync::message::DateStyle;
/// use chatsync::parsing::format_date;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2025, 1, 5, 9, 7, 3).unwrap();
/// assert_eq!(format_date(ts, DateStyle::Us), "1/5/25, 9:07");
/// assert_eq!(format_date(ts, DateStyle::EuBracket), "[05.01.2025, 09:07:03]");
/// assert_eq!(format_date(ts, DateStyle::EuPlain), "05.01.2025, 09:07:03");
/// assert_eq!(format_date(ts, DateStyle::Record), "2025-01-05 09:07:03");
/// ```
pub fn format_date(ts: DateTime<Utc>, style: DateStyle) -> String {
    let pattern = match style {
        DateStyle::Us => "%-m/%-d/%y, %-H:%M",
        DateStyle::EuBracket => "[%d.%m.%Y, %H:%M:%S]",
        DateStyle::EuPlain => "%d.%m.%Y, %H:%M:%S",
        DateStyle::Record => "%Y-%m-%d %H:%M:%S",
    };
    ts.format(pattern).to_string()
}
