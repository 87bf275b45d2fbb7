use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::{Captures, Regex};

/// Years a classified calendar value must fall strictly between.
pub const CLASSIFY_YEAR_BOUNDS: (i32, i32) = (1900, 2100);

const DATE_ONLY_PATTERNS: &[&str] = &[
    r"^\d{4}-\d{1,2}-\d{1,2}$",
    r"^\d{1,2}/\d{1,2}/\d{4}$",
    r"^\d{1,2}-\d{1,2}-\d{4}$",
    r"^\d{4}/\d{1,2}/\d{1,2}$",
    r"^\d{1,2}\.\d{1,2}\.\d{4}$",
    r"^\d{4}\.\d{1,2}\.\d{1,2}$",
];

const DATETIME_PATTERNS: &[&str] = &[
    r"^\d{4}-\d{1,2}-\d{1,2}\s\d{1,2}:\d{1,2}",
    r"^\d{1,2}/\d{1,2}/\d{4}\s\d{1,2}:\d{1,2}",
    r"^\d{4}-\d{1,2}-\d{1,2}T\d{1,2}:\d{1,2}",
];

const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%m.%d.%Y",
    "%d.%m.%Y",
    "%Y.%m.%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%b %d %Y %H:%M:%S",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarValue {
    pub datetime: NaiveDateTime,
    pub has_time: bool,
}

impl CalendarValue {
    fn date(date: NaiveDate) -> Self {
        Self {
            datetime: date.and_time(NaiveTime::MIN),
            has_time: false,
        }
    }

    fn timed(datetime: NaiveDateTime) -> Self {
        Self {
            datetime,
            has_time: true,
        }
    }

    pub fn year(&self) -> i32 {
        self.datetime.year()
    }

    pub fn year_strictly_within(&self, (low, high): (i32, i32)) -> bool {
        let year = self.year();
        year > low && year < high
    }

    pub fn year_within(&self, (low, high): (i32, i32)) -> bool {
        (low..=high).contains(&self.year())
    }

    pub fn format_date(&self) -> String {
        self.datetime.format("%Y-%m-%d").to_string()
    }

    pub fn format_timestamp(&self) -> String {
        self.datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid calendar pattern"))
        .collect()
}

fn date_only_shapes() -> &'static [Regex] {
    static SHAPES: OnceLock<Vec<Regex>> = OnceLock::new();
    SHAPES.get_or_init(|| compile(DATE_ONLY_PATTERNS))
}

fn datetime_shapes() -> &'static [Regex] {
    static SHAPES: OnceLock<Vec<Regex>> = OnceLock::new();
    SHAPES.get_or_init(|| compile(DATETIME_PATTERNS))
}

struct Parsers {
    slash_time: Regex,
    slash_date: Regex,
    iso_time: Regex,
    iso_date: Regex,
}

fn parsers() -> &'static Parsers {
    static PARSERS: OnceLock<Parsers> = OnceLock::new();
    PARSERS.get_or_init(|| Parsers {
        slash_time: Regex::new(
            r"^(\d{1,2})/(\d{1,2})/(\d{4})\s+(\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:\.\d+)?)?\s*([AaPp][Mm])?$",
        )
        .expect("valid slash datetime pattern"),
        slash_date: Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$")
            .expect("valid slash date pattern"),
        iso_time: Regex::new(
            r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:T|\s+)(\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:\.\d+)?)?\s*(?:Z|[+-]\d{2}:?\d{2})?$",
        )
        .expect("valid iso datetime pattern"),
        iso_date: Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid iso date pattern"),
    })
}

pub fn matches_date_shape(value: &str) -> bool {
    date_only_shapes().iter().any(|shape| shape.is_match(value))
}

pub fn matches_datetime_shape(value: &str) -> bool {
    datetime_shapes().iter().any(|shape| shape.is_match(value))
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

fn time_from(caps: &Captures<'_>, first: usize) -> Option<NaiveTime> {
    let hour = number(caps, first)?;
    let minute = number(caps, first + 1)?;
    let second = caps
        .get(first + 2)
        .map_or(Some(0), |m| m.as_str().parse().ok())?;
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Converts a 12-hour clock reading; hours outside 1..=12 are rejected.
fn with_meridiem(time: NaiveTime, marker: &str) -> Option<NaiveTime> {
    let hour = time.hour();
    if !(1..=12).contains(&hour) {
        return None;
    }
    let pm = marker.eq_ignore_ascii_case("pm");
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (hour, true) => hour + 12,
        (hour, false) => hour,
    };
    time.with_hour(hour)
}

/// Month-first, falling back to day-first when the month slot cannot be a month.
fn slash_date(first: u32, second: u32, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, first, second)
        .or_else(|| NaiveDate::from_ymd_opt(year, second, first))
}

/// Parses a calendar value by trying slash and ISO shapes before the generic formats.
pub fn parse_calendar(value: &str) -> Option<CalendarValue> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let parsers = parsers();

    if let Some(caps) = parsers.slash_time.captures(value) {
        let date = slash_date(number(&caps, 1)?, number(&caps, 2)?, number(&caps, 3)?)?;
        let time = match caps.get(7) {
            Some(marker) => with_meridiem(time_from(&caps, 4)?, marker.as_str())?,
            None => time_from(&caps, 4)?,
        };
        return Some(CalendarValue::timed(date.and_time(time)));
    }
    if let Some(caps) = parsers.slash_date.captures(value) {
        let date = slash_date(number(&caps, 1)?, number(&caps, 2)?, number(&caps, 3)?)?;
        return Some(CalendarValue::date(date));
    }
    if let Some(caps) = parsers.iso_time.captures(value) {
        let date = NaiveDate::from_ymd_opt(number(&caps, 1)?, number(&caps, 2)?, number(&caps, 3)?)?;
        let time = time_from(&caps, 4)?;
        return Some(CalendarValue::timed(date.and_time(time)));
    }
    if let Some(caps) = parsers.iso_date.captures(value) {
        let date = NaiveDate::from_ymd_opt(number(&caps, 1)?, number(&caps, 2)?, number(&caps, 3)?)?;
        return Some(CalendarValue::date(date));
    }
    parse_generic(value)
}

fn parse_generic(value: &str) -> Option<CalendarValue> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(CalendarValue::timed(parsed.naive_local()));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(CalendarValue::timed(parsed.naive_local()));
    }
    for fmt in FALLBACK_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(CalendarValue::timed(parsed));
        }
    }
    for fmt in FALLBACK_DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Some(CalendarValue::date(parsed));
        }
    }
    None
}
