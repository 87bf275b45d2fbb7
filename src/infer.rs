use log::debug;

use crate::{
    classify::{self, LONG_TEXT_LENGTH, ValueCategory},
    parser::ParsedTable,
    schema::{ColumnTypeMap, SqlType},
};

const MAJORITY_PERCENT: usize = 80;
const JSON_MAJORITY_PERCENT: usize = 60;
const HIGH_PRECISION_PERCENT: usize = 30;
const LONG_TEXT_PERCENT: usize = 30;
const HIGH_PRECISION_SCALE: usize = 2;

const INTEGER_MAX: u64 = 2_147_483_647;
const INTEGER_UNSIGNED_MAX: u64 = 4_294_967_295;
const VARCHAR_BREAKPOINTS: &[usize] = &[50, 100, 255, 500];
const VARCHAR_LIMIT: usize = 65_535;
const MEDIUM_TEXT_THRESHOLD: usize = 1_000;

pub const EMAIL_TYPE: SqlType = SqlType::Varchar(320);
pub const EMPTY_COLUMN_TYPE: SqlType = SqlType::Varchar(255);
pub const HIGH_PRECISION_TYPE: SqlType = SqlType::Decimal {
    precision: 15,
    scale: 4,
};

/// Aggregated classification counts for one column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTally {
    pub non_empty: usize,
    pub json: usize,
    pub uuid: usize,
    pub email: usize,
    pub url: usize,
    pub boolean: usize,
    /// Boolean tokens `0` and `1`, which also read as integers.
    pub numeric_booleans: usize,
    pub date: usize,
    pub datetime: usize,
    pub integer: usize,
    pub decimal: usize,
    pub high_precision: usize,
    pub long_text: usize,
    pub max_length: usize,
    pub max_integer_magnitude: u64,
    pub has_negative: bool,
}

impl ColumnTally {
    pub fn from_values<'a, I>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tally = Self::default();
        for value in values {
            tally.record(value, column);
        }
        tally
    }

    pub fn record(&mut self, value: &str, column: &str) {
        let Some(category) = classify::classify(value, column) else {
            return;
        };
        let value = value.trim();
        self.non_empty += 1;
        let length = value.chars().count();
        self.max_length = self.max_length.max(length);
        if length > LONG_TEXT_LENGTH {
            self.long_text += 1;
        }

        match category {
            ValueCategory::Json => self.json += 1,
            ValueCategory::Uuid => self.uuid += 1,
            ValueCategory::Email => self.email += 1,
            ValueCategory::Url => self.url += 1,
            ValueCategory::Boolean => {
                self.boolean += 1;
                if matches!(value, "0" | "1") {
                    self.numeric_booleans += 1;
                    self.observe_integer(value);
                }
            }
            ValueCategory::Date => self.date += 1,
            ValueCategory::DateTime => self.datetime += 1,
            ValueCategory::Integer => {
                self.integer += 1;
                self.observe_integer(value);
            }
            ValueCategory::Decimal => {
                self.decimal += 1;
                if value.starts_with('-') {
                    self.has_negative = true;
                }
                if fractional_digits(value) > HIGH_PRECISION_SCALE {
                    self.high_precision += 1;
                }
            }
            ValueCategory::Text => {}
        }
    }

    fn observe_integer(&mut self, value: &str) {
        let Some(number) = classify::parse_finite(value) else {
            return;
        };
        if number < 0.0 {
            self.has_negative = true;
        }
        let magnitude = number.abs();
        let magnitude = if magnitude >= u64::MAX as f64 {
            u64::MAX
        } else {
            magnitude as u64
        };
        self.max_integer_magnitude = self.max_integer_magnitude.max(magnitude);
    }

    pub fn numeric(&self) -> usize {
        self.integer + self.decimal + self.numeric_booleans
    }

    /// True when `count` exceeds `percent` of the non-empty values.
    fn exceeds(&self, count: usize, percent: usize) -> bool {
        count * 100 > self.non_empty * percent
    }

    pub fn decide(&self, varchar_cap: u32) -> SqlType {
        if self.non_empty == 0 {
            return EMPTY_COLUMN_TYPE;
        }
        if self.exceeds(self.json, JSON_MAJORITY_PERCENT) {
            return SqlType::Json;
        }
        if self.exceeds(self.uuid, MAJORITY_PERCENT) {
            return SqlType::Uuid;
        }
        if self.exceeds(self.boolean, MAJORITY_PERCENT) {
            return SqlType::Boolean;
        }
        if self.exceeds(self.email, MAJORITY_PERCENT) {
            return EMAIL_TYPE;
        }
        if self.exceeds(self.url, MAJORITY_PERCENT) {
            return SqlType::Text;
        }
        if self.exceeds(self.date + self.datetime, MAJORITY_PERCENT) {
            return if self.datetime > 0 && self.datetime >= self.date {
                SqlType::Timestamp
            } else {
                SqlType::Date
            };
        }
        if self.exceeds(self.numeric(), MAJORITY_PERCENT) {
            return self.numeric_type();
        }
        self.text_type(varchar_cap)
    }

    fn numeric_type(&self) -> SqlType {
        if self.decimal > 0 {
            if self.high_precision * 100 >= self.numeric() * HIGH_PRECISION_PERCENT {
                HIGH_PRECISION_TYPE
            } else {
                SqlType::Double
            }
        } else if self.max_integer_magnitude <= INTEGER_MAX {
            SqlType::Integer
        } else if self.max_integer_magnitude <= INTEGER_UNSIGNED_MAX && !self.has_negative {
            SqlType::IntegerUnsigned
        } else {
            SqlType::BigInt
        }
    }

    fn text_type(&self, varchar_cap: u32) -> SqlType {
        let max_length = self.max_length;
        if max_length > MEDIUM_TEXT_THRESHOLD {
            return if max_length > VARCHAR_LIMIT {
                SqlType::LongText
            } else {
                SqlType::Text
            };
        }
        if self.exceeds(self.long_text, LONG_TEXT_PERCENT) {
            return SqlType::Text;
        }
        if let Some(breakpoint) = VARCHAR_BREAKPOINTS
            .iter()
            .copied()
            .find(|breakpoint| max_length <= *breakpoint)
        {
            return SqlType::Varchar(breakpoint as u32);
        }
        if max_length <= MEDIUM_TEXT_THRESHOLD {
            return SqlType::Text;
        }
        let scaled = (max_length * 6).div_ceil(5).min(varchar_cap as usize);
        if scaled > VARCHAR_LIMIT {
            SqlType::Text
        } else {
            SqlType::Varchar(scaled as u32)
        }
    }
}

fn fractional_digits(value: &str) -> usize {
    let mantissa = value.split(['e', 'E']).next().unwrap_or(value);
    mantissa
        .split_once('.')
        .map(|(_, fraction)| fraction.len())
        .unwrap_or(0)
}

pub fn infer_column_type(column: &str, values: &[&str], varchar_cap: u32) -> SqlType {
    ColumnTally::from_values(column, values.iter().copied()).decide(varchar_cap)
}

/// Infers one type per header, in header order.
pub fn infer_column_types(table: &ParsedTable, varchar_cap: u32) -> ColumnTypeMap {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let tally = ColumnTally::from_values(header, table.column_values(index));
            let ty = tally.decide(varchar_cap);
            debug!(
                "Column '{header}' -> {ty} ({} non-empty value(s))",
                tally.non_empty
            );
            (header.clone(), ty)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(values: &[&str]) -> SqlType {
        infer_column_type("value", values, 255)
    }

    #[test]
    fn empty_column_defaults_to_varchar_255() {
        assert_eq!(infer(&[]), SqlType::Varchar(255));
        assert_eq!(infer(&["", "null", "NULL"]), SqlType::Varchar(255));
    }

    #[test]
    fn json_wins_at_sixty_percent() {
        let values = [r#"{"a":1}"#, "[1]", r#"{"b":2}"#, "plain", "text"];
        assert_eq!(infer(&values[..4]), SqlType::Json);
        // exactly 60% is not enough
        assert_eq!(infer(&values), SqlType::Varchar(50));
    }

    #[test]
    fn uuid_column_ignores_blanks() {
        let values = [
            "550e8400-e29b-41d4-a716-446655440000",
            "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
            "",
            "f47ac10b-58cc-4372-a567-0e02b2c3d479",
            "123e4567-e89b-12d3-a456-426614174000",
        ];
        assert_eq!(infer(&values), SqlType::Uuid);
    }

    #[test]
    fn boolean_email_and_url_columns() {
        assert_eq!(infer(&["true", "false", "yes"]), SqlType::Boolean);
        assert_eq!(infer(&["0", "1", "1", "0"]), SqlType::Boolean);
        assert_eq!(
            infer(&["a@example.com", "b@example.org"]),
            SqlType::Varchar(320)
        );
        assert_eq!(
            infer(&["https://a.example", "http://b.example"]),
            SqlType::Text
        );
    }

    #[test]
    fn date_versus_timestamp() {
        assert_eq!(infer(&["2023-01-05", "2023-02-06"]), SqlType::Date);
        assert_eq!(
            infer(&["2023-01-05", "01/06/2023 14:30"]),
            SqlType::Timestamp
        );
        assert_eq!(
            infer(&["2023-01-05", "2023-01-06", "2023-01-07 10:00"]),
            SqlType::Date
        );
    }

    #[test]
    fn integer_sizes_follow_magnitude_and_sign() {
        assert_eq!(infer(&["1", "2", "3"]), SqlType::Integer);
        assert_eq!(infer(&["-5", "2147483647"]), SqlType::Integer);
        assert_eq!(infer(&["2147483648", "7"]), SqlType::IntegerUnsigned);
        assert_eq!(infer(&["-2147483648", "4294967295"]), SqlType::BigInt);
        assert_eq!(infer(&["4294967296", "2"]), SqlType::BigInt);
    }

    #[test]
    fn boolean_like_integers_still_vote_numeric() {
        assert_eq!(infer(&["1", "2"]), SqlType::Integer);
        assert_eq!(infer(&["0", "1", "2", "3", "4"]), SqlType::Integer);
    }

    #[test]
    fn decimal_precision_picks_decimal_or_double() {
        assert_eq!(infer(&["1.5", "2.25", "3"]), SqlType::Double);
        assert_eq!(
            infer(&["1.12345", "2.5", "3.25"]),
            HIGH_PRECISION_TYPE
        );
        assert_eq!(infer(&["1e5", "2.5"]), SqlType::Double);
    }

    #[test]
    fn text_lengths_choose_varchar_breakpoints() {
        assert_eq!(infer(&["Alice", "Bob"]), SqlType::Varchar(50));
        let sixty = "x".repeat(60);
        assert_eq!(infer(&[&sixty]), SqlType::Varchar(100));
        let three_hundred = "x".repeat(300);
        assert_eq!(infer(&[&three_hundred]), SqlType::Varchar(500));
    }

    #[test]
    fn long_text_tiers() {
        let medium = "x".repeat(800);
        assert_eq!(infer(&[&medium]), SqlType::Text);
        let long = "x".repeat(2_000);
        assert_eq!(infer(&[&long, "short"]), SqlType::Text);
        let huge = "x".repeat(70_000);
        assert_eq!(infer(&[&huge]), SqlType::LongText);
    }

    #[test]
    fn mixed_column_falls_back_to_text() {
        assert_eq!(
            infer(&["1", "2", "three", "four", "five"]),
            SqlType::Varchar(50)
        );
    }

    #[test]
    fn tally_tracks_statistics() {
        let tally = ColumnTally::from_values("value", ["-3", "", "10", "hello", "null"]);
        assert_eq!(tally.non_empty, 3);
        assert_eq!(tally.integer, 2);
        assert!(tally.has_negative);
        assert_eq!(tally.max_integer_magnitude, 10);
        assert_eq!(tally.max_length, 5);
    }

    #[test]
    fn infer_column_types_keeps_header_order() {
        let table = crate::parser::parse_table("id,name\n1,Alice\n2,Bob\n").unwrap();
        let types = infer_column_types(&table, 255);
        let entries = types.iter().collect::<Vec<_>>();
        assert_eq!(
            entries,
            vec![("id", SqlType::Integer), ("name", SqlType::Varchar(50))]
        );
    }
}
