//! Lenient start-date parsing.
//!
//! Strict machine formats (RFC 3339, RFC 2822, ISO-like naive forms) are
//! tried first. Anything else goes through a token scanner that understands
//! numeric dates, English and Italian month/weekday names, 12/24-hour clocks
//! and trailing zone designators. Zone names it does not know (`CEST`) are
//! skipped once a clock has been read, leaving the time naive.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ISO_T_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)t(\d)").unwrap());
static NUMERIC_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,4})([/.-])(\d{1,2})([/.-])(\d{1,4})$").unwrap());
static SHORT_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})$").unwrap());
static CLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{1,2})[:.](\d{2})(?:[:.](\d{2})(?:[.,](\d{1,9}))?)?(am|pm|a\.m\.|p\.m\.)?(z|[+-]\d{2}(?::?\d{2})?)?$",
    )
    .unwrap()
});
static HOUR_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(?:h(\d{2})?|(am|pm|a\.m\.|p\.m\.))$").unwrap());
static OFFSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-])(\d{2})(?::?(\d{2}))?$").unwrap());
static ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(?:st|nd|rd|th|°|º)$").unwrap());
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static BASIC_ISO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)(\d{4})(\d{2})(\d{2})(?:t(\d{2})(\d{2})(\d{2})?)?$").unwrap()
});
static ZONE_ABBREVIATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{2,5}$").unwrap());

#[rustfmt::skip]
const MONTHS: &[(&str, u32)] = &[
    ("january", 1), ("jan", 1), ("gennaio", 1), ("gen", 1),
    ("february", 2), ("feb", 2), ("febbraio", 2),
    ("march", 3), ("mar", 3), ("marzo", 3),
    ("april", 4), ("apr", 4), ("aprile", 4),
    ("may", 5), ("maggio", 5), ("mag", 5),
    ("june", 6), ("jun", 6), ("giugno", 6), ("giu", 6),
    ("july", 7), ("jul", 7), ("luglio", 7), ("lug", 7),
    ("august", 8), ("aug", 8), ("agosto", 8), ("ago", 8),
    ("september", 9), ("sep", 9), ("sept", 9), ("settembre", 9), ("set", 9),
    ("october", 10), ("oct", 10), ("ottobre", 10), ("ott", 10),
    ("november", 11), ("nov", 11), ("novembre", 11),
    ("december", 12), ("dec", 12), ("dicembre", 12), ("dic", 12),
];

// "mar" is absent: it reads as the month.
#[rustfmt::skip]
const WEEKDAYS: &[&str] = &[
    "monday", "mon", "tuesday", "tue", "tues", "wednesday", "wed", "thursday", "thu", "thur",
    "thurs", "friday", "fri", "saturday", "sat", "sunday", "sun", "lunedì", "lunedi", "lun",
    "martedì", "martedi", "mercoledì", "mercoledi", "mer", "giovedì", "giovedi", "gio",
    "venerdì", "venerdi", "ven", "sabato", "sab", "domenica", "dom",
];

/// Words that announce a clock time ("ore 21", "at 8").
const TIME_MARKERS: &[&str] = &["ore", "alle", "at", "h"];
const FILLERS: &[&str] = &["il", "on", "the", "of", "del", "di", "-", "–", "|", "@"];
const MERIDIEMS: &[&str] = &["am", "pm", "a.m.", "p.m.", "a.m", "p.m"];

/// A successfully parsed start date. `offset` is only set when the input named one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    pub local: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

impl ParsedTimestamp {
    /// `YYYY-MM-DDTHH:MM:SS[.ffffff][±HH:MM]`
    pub fn to_iso8601(&self) -> String {
        let mut text = self.local.format("%Y-%m-%dT%H:%M:%S").to_string();

        let micros = (self.local.nanosecond() % 1_000_000_000) / 1_000;
        if micros != 0 {
            text.push_str(&format!(".{:06}", micros));
        }

        if let Some(offset) = self.offset {
            let seconds = offset.local_minus_utc();
            let sign = if seconds < 0 { '-' } else { '+' };
            let seconds = seconds.abs();
            text.push_str(&format!("{}{:02}:{:02}", sign, seconds / 3600, (seconds % 3600) / 60));
        }

        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy, Default)]
struct Clock {
    hour: u32,
    minute: u32,
    second: u32,
    nano: u32,
}

#[derive(Debug, Default)]
struct Components {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    clock: Option<Clock>,
    meridiem: Option<Meridiem>,
    offset: Option<FixedOffset>,
}

/// Fills an empty slot. A second value for the same slot makes the input ambiguous.
fn set<T>(slot: &mut Option<T>, value: T) -> Option<()> {
    if slot.is_some() {
        return None;
    }
    *slot = Some(value);
    Some(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParser {
    day_first: bool,
    reference_year: i32,
}

impl DateParser {
    pub fn new(day_first: bool, reference_year: i32) -> Self {
        Self {
            day_first,
            reference_year,
        }
    }

    pub fn parse(&self, input: &str) -> Option<ParsedTimestamp> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        parse_strict(trimmed).or_else(|| self.parse_free_form(trimmed))
    }

    fn parse_free_form(&self, input: &str) -> Option<ParsedTimestamp> {
        let lowered = input.to_lowercase().replace(',', " ");
        let normalized = ISO_T_SEPARATOR.replace_all(&lowered, "$1 $2");
        let tokens: Vec<&str> = normalized
            .split_whitespace()
            .flat_map(split_hyphenated)
            .map(clean_token)
            .filter(|token| !token.is_empty())
            .collect();

        let mut parts = Components::default();
        for (i, token) in tokens.iter().copied().enumerate() {
            if FILLERS.contains(&token)
                || TIME_MARKERS.contains(&token)
                || WEEKDAYS.contains(&token)
            {
                continue;
            }

            if let Some(meridiem) = meridiem(token) {
                set(&mut parts.meridiem, meridiem)?;
            } else if let Some(month) = month_number(token) {
                set(&mut parts.month, month)?;
            } else if let Some(offset) = zone_offset(token) {
                set(&mut parts.offset, offset)?;
            } else if let Some(caps) = NUMERIC_DATE.captures(token) {
                self.apply_numeric_date(&caps, &mut parts)?;
            } else if let Some(caps) = SHORT_DATE.captures(token) {
                let (month, day) = self.order_month_day(number(&caps, 1)?, number(&caps, 2)?);
                set(&mut parts.month, month)?;
                set(&mut parts.day, day)?;
            } else if let Some(caps) = CLOCK.captures(token) {
                apply_clock(&caps, &mut parts)?;
            } else if let Some(caps) = HOUR_SUFFIX.captures(token) {
                let clock = Clock {
                    hour: number(&caps, 1)?,
                    minute: optional_number(&caps, 2)?.unwrap_or(0),
                    ..Clock::default()
                };
                set(&mut parts.clock, clock)?;
                if let Some(m) = caps.get(3) {
                    set(&mut parts.meridiem, meridiem(m.as_str())?)?;
                }
            } else if let Some(caps) = ORDINAL.captures(token) {
                set(&mut parts.day, number(&caps, 1)?)?;
            } else if NUMBER.is_match(token) {
                let previous = i.checked_sub(1).map(|p| tokens[p]);
                let next = tokens.get(i + 1).copied();
                apply_bare_number(token, previous, next, &mut parts)?;
            } else if parts.clock.is_some() && ZONE_ABBREVIATION.is_match(token) {
                // Unknown zone name ("CEST"): keep the clock naive.
            } else {
                return None;
            }
        }

        self.assemble(parts)
    }

    fn apply_numeric_date(&self, caps: &Captures<'_>, parts: &mut Components) -> Option<()> {
        if caps[2] != caps[4] {
            return None;
        }
        let (first, second, third) = (&caps[1], &caps[3], &caps[5]);

        let (year, month, day) = if first.len() == 4 {
            if third.len() > 2 {
                return None;
            }
            (first.parse().ok()?, second.parse().ok()?, third.parse().ok()?)
        } else if first.len() <= 2 && (third.len() == 4 || third.len() <= 2) {
            let (month, day) = self.order_month_day(first.parse().ok()?, second.parse().ok()?);
            (expand_year(third)?, month, day)
        } else {
            return None;
        };

        set(&mut parts.year, year)?;
        set(&mut parts.month, month)?;
        set(&mut parts.day, day)
    }

    /// Month-first unless configured otherwise; swapped when the month slot cannot be a month.
    fn order_month_day(&self, first: u32, second: u32) -> (u32, u32) {
        let (month, day) = if self.day_first {
            (second, first)
        } else {
            (first, second)
        };
        if month > 12 && day <= 12 {
            (day, month)
        } else {
            (month, day)
        }
    }

    fn assemble(&self, parts: Components) -> Option<ParsedTimestamp> {
        let year = parts.year.unwrap_or(self.reference_year);
        let date = NaiveDate::from_ymd_opt(year, parts.month?, parts.day?)?;

        if parts.meridiem.is_some() && parts.clock.is_none() {
            return None;
        }
        let clock = parts.clock.unwrap_or_default();
        let hour = match parts.meridiem {
            None => clock.hour,
            Some(_) if !(1..=12).contains(&clock.hour) => return None,
            Some(Meridiem::Am) => clock.hour % 12,
            Some(Meridiem::Pm) => clock.hour % 12 + 12,
        };
        let time = NaiveTime::from_hms_nano_opt(hour, clock.minute, clock.second, clock.nano)?;

        Some(ParsedTimestamp {
            local: date.and_time(time),
            offset: parts.offset,
        })
    }
}

fn parse_strict(input: &str) -> Option<ParsedTimestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(with_offset(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(with_offset(dt));
    }

    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .or_else(|| parse_basic_iso(input))
        .map(|local| ParsedTimestamp {
            local,
            offset: None,
        })
}

/// ISO-8601 basic format: `20240905`, `20240905T2000`, `20240905T200000`.
fn parse_basic_iso(input: &str) -> Option<NaiveDateTime> {
    let caps = BASIC_ISO.captures(input)?;
    let year = caps[1].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(&caps, 2)?, number(&caps, 3)?)?;
    let hour = optional_number(&caps, 4)?.unwrap_or(0);
    let minute = optional_number(&caps, 5)?.unwrap_or(0);
    let second = optional_number(&caps, 6)?.unwrap_or(0);
    date.and_hms_opt(hour, minute, second)
}

fn with_offset(dt: DateTime<FixedOffset>) -> ParsedTimestamp {
    ParsedTimestamp {
        local: dt.naive_local(),
        offset: Some(*dt.offset()),
    }
}

/// `5-sep-2024` becomes `5`, `sep`, `2024`. All-numeric dates and offsets keep their hyphens.
fn split_hyphenated(token: &str) -> Vec<&str> {
    if token.contains('-') && token.chars().any(char::is_alphabetic) {
        token.split('-').collect()
    } else {
        vec![token]
    }
}

fn clean_token(token: &str) -> &str {
    let token = token.trim_matches(&['(', ')'][..]);
    if MERIDIEMS.contains(&token) {
        token
    } else {
        token.trim_end_matches('.')
    }
}

fn meridiem(token: &str) -> Option<Meridiem> {
    match token {
        "am" | "a.m." | "a.m" => Some(Meridiem::Am),
        "pm" | "p.m." | "p.m" => Some(Meridiem::Pm),
        _ => None,
    }
}

fn month_number(token: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, month)| *month)
}

fn zone_offset(token: &str) -> Option<FixedOffset> {
    match token {
        "z" | "utc" | "gmt" => FixedOffset::east_opt(0),
        _ => {
            let caps = OFFSET.captures(token)?;
            let hours: i32 = caps[2].parse().ok()?;
            let minutes: i32 = match caps.get(3) {
                Some(m) => m.as_str().parse().ok()?,
                None => 0,
            };
            if hours > 23 || minutes > 59 {
                return None;
            }
            let seconds = hours * 3600 + minutes * 60;
            if &caps[1] == "-" {
                FixedOffset::west_opt(seconds)
            } else {
                FixedOffset::east_opt(seconds)
            }
        }
    }
}

fn apply_clock(caps: &Captures<'_>, parts: &mut Components) -> Option<()> {
    let nano = match caps.get(4) {
        Some(fraction) => format!("{:0<9}", fraction.as_str()).parse().ok()?,
        None => 0,
    };
    let clock = Clock {
        hour: number(caps, 1)?,
        minute: number(caps, 2)?,
        second: optional_number(caps, 3)?.unwrap_or(0),
        nano,
    };
    set(&mut parts.clock, clock)?;

    if let Some(m) = caps.get(5) {
        set(&mut parts.meridiem, meridiem(m.as_str())?)?;
    }
    if let Some(zone) = caps.get(6) {
        set(&mut parts.offset, zone_offset(zone.as_str())?)?;
    }
    Some(())
}

fn apply_bare_number(
    token: &str,
    previous: Option<&str>,
    next: Option<&str>,
    parts: &mut Components,
) -> Option<()> {
    let value: u32 = token.parse().ok()?;

    let announces_time = previous.is_some_and(|p| TIME_MARKERS.contains(&p));
    let followed_by_meridiem = next.is_some_and(|n| meridiem(n).is_some());
    if parts.clock.is_none() && value <= 23 && (announces_time || followed_by_meridiem) {
        let clock = Clock {
            hour: value,
            ..Clock::default()
        };
        return set(&mut parts.clock, clock);
    }

    if token.len() == 4 {
        return set(&mut parts.year, value as i32);
    }
    if parts.day.is_none() && (1..=31).contains(&value) {
        return set(&mut parts.day, value);
    }
    if parts.year.is_none() && parts.month.is_some() && token.len() == 2 {
        return set(&mut parts.year, expand_year(token)?);
    }
    None
}

/// Two-digit years pivot at 70: `24` is 2024, `85` is 1985.
fn expand_year(text: &str) -> Option<i32> {
    let value: i32 = text.parse().ok()?;
    match text.len() {
        4 => Some(value),
        1 | 2 if value < 70 => Some(2000 + value),
        1 | 2 => Some(1900 + value),
        _ => None,
    }
}

fn number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

/// `Some(None)` when the group did not participate, `None` when it did but is not a number.
fn optional_number(caps: &Captures<'_>, group: usize) -> Option<Option<u32>> {
    match caps.get(group) {
        Some(m) => m.as_str().parse().ok().map(Some),
        None => Some(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> DateParser {
        DateParser::new(false, 2025)
    }

    fn iso(input: &str) -> Option<String> {
        parser().parse(input).map(|ts| ts.to_iso8601())
    }

    #[test]
    fn test_naive_iso_keeps_no_offset() {
        assert_eq!(iso("2024-09-05T20:00:00").as_deref(), Some("2024-09-05T20:00:00"));
        assert_eq!(iso("2024-09-05 20:00").as_deref(), Some("2024-09-05T20:00:00"));
        assert_eq!(iso("2024-09-05").as_deref(), Some("2024-09-05T00:00:00"));
    }

    #[test]
    fn test_offsets_are_preserved() {
        assert_eq!(
            iso("2024-09-05T20:00:00+02:00").as_deref(),
            Some("2024-09-05T20:00:00+02:00")
        );
        assert_eq!(iso("2024-09-05T18:00:00Z").as_deref(), Some("2024-09-05T18:00:00+00:00"));
        assert_eq!(
            iso("2024-09-05T20:00-05:00").as_deref(),
            Some("2024-09-05T20:00:00-05:00")
        );
        assert_eq!(
            iso("Thu, 05 Sep 2024 20:00:00 +0200").as_deref(),
            Some("2024-09-05T20:00:00+02:00")
        );
        assert_eq!(iso("5 Sep 2024 20:00 UTC").as_deref(), Some("2024-09-05T20:00:00+00:00"));
    }

    #[test]
    fn test_fractional_seconds() {
        assert_eq!(
            iso("2024-09-05T20:00:00.5").as_deref(),
            Some("2024-09-05T20:00:00.500000")
        );
        assert_eq!(
            iso("2024-09-05T20:00:00.123456+01:00").as_deref(),
            Some("2024-09-05T20:00:00.123456+01:00")
        );
    }

    #[test]
    fn test_english_month_names() {
        assert_eq!(
            iso("September 5, 2024 8:00 PM").as_deref(),
            Some("2024-09-05T20:00:00")
        );
        assert_eq!(iso("Sep 5 2024 8 PM").as_deref(), Some("2024-09-05T20:00:00"));
        assert_eq!(
            iso("Saturday, 5th October 2024 at 9:30pm").as_deref(),
            Some("2024-10-05T21:30:00")
        );
        assert_eq!(iso("12 AM Jan 1 2025").as_deref(), Some("2025-01-01T00:00:00"));
    }

    #[test]
    fn test_basic_iso_forms() {
        assert_eq!(iso("20240905").as_deref(), Some("2024-09-05T00:00:00"));
        assert_eq!(iso("20240905T200000").as_deref(), Some("2024-09-05T20:00:00"));
        assert_eq!(iso("20240905T2000").as_deref(), Some("2024-09-05T20:00:00"));
        assert_eq!(iso("20240231"), None);
    }

    #[test]
    fn test_hyphenated_month_names() {
        assert_eq!(iso("5-Sep-2024").as_deref(), Some("2024-09-05T00:00:00"));
        assert_eq!(iso("05-set-2024 21:00").as_deref(), Some("2024-09-05T21:00:00"));
    }

    #[test]
    fn test_unknown_zone_name_after_clock_is_ignored() {
        assert_eq!(
            iso("5 Sep 2024 20:00 CEST").as_deref(),
            Some("2024-09-05T20:00:00")
        );
        assert_eq!(iso("5 Sep 2024 20:00 CET").as_deref(), Some("2024-09-05T20:00:00"));
        assert_eq!(iso("5 Sep 2024 CEST"), None);
    }

    #[test]
    fn test_italian_month_names() {
        assert_eq!(
            iso("sabato 5 ottobre 2024, ore 21.00").as_deref(),
            Some("2024-10-05T21:00:00")
        );
        assert_eq!(iso("5 ott. 2024").as_deref(), Some("2024-10-05T00:00:00"));
        assert_eq!(iso("1° novembre 2024 alle 20h30").as_deref(), Some("2024-11-01T20:30:00"));
        assert_eq!(iso("Venerdì 13 Dicembre 2024 ore 21").as_deref(), Some("2024-12-13T21:00:00"));
    }

    #[test]
    fn test_numeric_dates_month_first_by_default() {
        assert_eq!(iso("05/09/2024").as_deref(), Some("2024-05-09T00:00:00"));
        assert_eq!(iso("25/12/2024 21:00").as_deref(), Some("2024-12-25T21:00:00"));
        assert_eq!(iso("2024/09/05").as_deref(), Some("2024-09-05T00:00:00"));
        assert_eq!(iso("05/09/24").as_deref(), Some("2024-05-09T00:00:00"));
    }

    #[test]
    fn test_numeric_dates_day_first_when_configured() {
        let parser = DateParser::new(true, 2025);
        let parsed = parser.parse("05/09/2024 21:00").unwrap();
        assert_eq!(parsed.to_iso8601(), "2024-09-05T21:00:00");

        let parsed = parser.parse("05.09.2024").unwrap();
        assert_eq!(parsed.to_iso8601(), "2024-09-05T00:00:00");
    }

    #[test]
    fn test_missing_year_uses_reference_year() {
        assert_eq!(iso("5 settembre").as_deref(), Some("2025-09-05T00:00:00"));
        assert_eq!(iso("09/05 21:00").as_deref(), Some("2025-09-05T21:00:00"));
    }

    #[test]
    fn test_unparsable_inputs() {
        assert_eq!(iso("not-a-date"), None);
        assert_eq!(iso(""), None);
        assert_eq!(iso("   "), None);
        assert_eq!(iso("20:00"), None);
        assert_eq!(iso("2024-02-30"), None);
        assert_eq!(iso("TBA"), None);
        assert_eq!(iso("5 settembre 2024 2025"), None);
        assert_eq!(iso("13 PM 5 Sep 2024"), None);
    }

    #[test]
    fn test_serialized_output_parses_back_to_itself() {
        for input in [
            "2024-09-05T20:00:00",
            "2024-09-05T20:00:00+02:00",
            "2024-09-05T20:00:00.250000-03:30",
        ] {
            assert_eq!(iso(input).as_deref(), Some(input));
        }
    }
}
