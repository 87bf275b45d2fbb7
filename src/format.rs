use log::debug;

use crate::{classify, data, schema::SqlType};

/// Years a rendered date or timestamp literal must fall within, inclusive.
pub const RENDER_YEAR_BOUNDS: (i32, i32) = (1900, 2100);

pub const NULL: &str = "NULL";

pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Reverses [`quote`]; returns `None` when `literal` is not a quoted string.
pub fn unquote(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("''", "'"))
}

pub fn render(raw: &str, ty: SqlType) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return NULL.to_string();
    }
    match ty {
        SqlType::Date | SqlType::Timestamp => render_calendar(value, ty),
        SqlType::Boolean => render_boolean(value).to_string(),
        SqlType::Json if value.eq_ignore_ascii_case("null") => NULL.to_string(),
        ty if ty.is_numeric() => match classify::parse_finite(value) {
            Some(_) => value.to_string(),
            None => NULL.to_string(),
        },
        _ => quote(value),
    }
}

fn render_calendar(value: &str, ty: SqlType) -> String {
    match data::parse_calendar(value) {
        Some(parsed) if parsed.year_within(RENDER_YEAR_BOUNDS) => {
            if ty == SqlType::Timestamp {
                quote(&parsed.format_timestamp())
            } else {
                quote(&parsed.format_date())
            }
        }
        _ => {
            debug!("Unparseable {ty} literal '{value}' rendered as NULL");
            NULL.to_string()
        }
    }
}

fn render_boolean(value: &str) -> &'static str {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "y" | "t" => "TRUE",
        "false" | "no" | "0" | "n" | "f" => "FALSE",
        _ => NULL,
    }
}
