use std::sync::OnceLock;

use regex::Regex;
use url::Url;
use uuid::{Uuid, Variant};

use crate::data::{self, CLASSIFY_YEAR_BOUNDS};

pub const MAX_EMAIL_LENGTH: usize = 320;
pub const LONG_TEXT_LENGTH: usize = 500;

const BOOLEAN_TOKENS: &[&str] = &["true", "false", "yes", "no", "1", "0", "y", "n", "t", "f"];
const URL_SCHEMES: &[&str] = &["http", "https", "ftp"];
const DATE_COLUMN_KEYWORDS: &[&str] = &[
    "date", "time", "created", "updated", "modified", "birth", "start", "end", "pickup", "return",
    "due", "expire", "login",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueCategory {
    Json,
    Uuid,
    Email,
    Url,
    Boolean,
    Date,
    DateTime,
    Integer,
    Decimal,
    Text,
}

pub struct Rule {
    pub name: &'static str,
    pub classify: fn(value: &str, column: &str) -> Option<ValueCategory>,
}

/// Classification rules in priority order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "json",
        classify: json_rule,
    },
    Rule {
        name: "uuid",
        classify: uuid_rule,
    },
    Rule {
        name: "email",
        classify: email_rule,
    },
    Rule {
        name: "url",
        classify: url_rule,
    },
    Rule {
        name: "boolean",
        classify: boolean_rule,
    },
    Rule {
        name: "calendar",
        classify: calendar_rule,
    },
    Rule {
        name: "numeric",
        classify: numeric_rule,
    },
];

pub fn is_null_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null")
}

/// Returns `None` for blank and `null` values, [`ValueCategory::Text`] when no rule matches.
pub fn classify(value: &str, column: &str) -> Option<ValueCategory> {
    if is_null_token(value) {
        return None;
    }
    let value = value.trim();
    let category = RULES
        .iter()
        .find_map(|rule| (rule.classify)(value, column))
        .unwrap_or(ValueCategory::Text);
    Some(category)
}

pub fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}

pub fn is_boolean_token(value: &str) -> bool {
    let lowered = value.to_ascii_lowercase();
    BOOLEAN_TOKENS.contains(&lowered.as_str())
}

pub fn column_suggests_date(column: &str) -> bool {
    let lowered = column.to_ascii_lowercase();
    DATE_COLUMN_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

fn json_rule(value: &str, _column: &str) -> Option<ValueCategory> {
    if !(value.starts_with('{') || value.starts_with('[')) {
        return None;
    }
    serde_json::from_str::<serde_json::Value>(value)
        .ok()
        .map(|_| ValueCategory::Json)
}

fn uuid_rule(value: &str, _column: &str) -> Option<ValueCategory> {
    if value.len() != 36 {
        return None;
    }
    let parsed = Uuid::parse_str(value).ok()?;
    let canonical =
        (1..=5).contains(&parsed.get_version_num()) && parsed.get_variant() == Variant::RFC4122;
    canonical.then_some(ValueCategory::Uuid)
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

fn email_rule(value: &str, _column: &str) -> Option<ValueCategory> {
    (value.chars().count() <= MAX_EMAIL_LENGTH && email_pattern().is_match(value))
        .then_some(ValueCategory::Email)
}

fn url_rule(value: &str, _column: &str) -> Option<ValueCategory> {
    let parsed = Url::parse(value).ok()?;
    URL_SCHEMES
        .contains(&parsed.scheme())
        .then_some(ValueCategory::Url)
}

fn boolean_rule(value: &str, _column: &str) -> Option<ValueCategory> {
    is_boolean_token(value).then_some(ValueCategory::Boolean)
}

fn calendar_rule(value: &str, column: &str) -> Option<ValueCategory> {
    let shaped = data::matches_date_shape(value) || data::matches_datetime_shape(value);
    if !shaped && !column_suggests_date(column) {
        return None;
    }
    let parsed = data::parse_calendar(value)?;
    if !parsed.year_strictly_within(CLASSIFY_YEAR_BOUNDS) {
        return None;
    }
    Some(if parsed.has_time {
        ValueCategory::DateTime
    } else {
        ValueCategory::Date
    })
}

fn numeric_rule(value: &str, _column: &str) -> Option<ValueCategory> {
    parse_finite(value)?;
    if value.contains(['.', 'e', 'E']) {
        Some(ValueCategory::Decimal)
    } else {
        Some(ValueCategory::Integer)
    }
}
