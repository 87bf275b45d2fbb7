//! Schema model produced by inference and consumed by SQL emission.
//!
//! [`SqlType`] is the closed set of column types the inferrer can choose,
//! [`ColumnTypeMap`] binds one of them to every header in header order, and
//! [`TableSpec`] pairs a sanitized table name with its parsed rows and types.

use std::fmt;

use crate::parser::ParsedTable;

pub const DEFAULT_TABLE_NAME: &str = "imported_table";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Varchar(u32),
    Text,
    MediumText,
    LongText,
    Integer,
    IntegerUnsigned,
    BigInt,
    Double,
    Decimal { precision: u32, scale: u32 },
    Date,
    Timestamp,
    Boolean,
    Json,
    Uuid,
}

impl SqlType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SqlType::Integer
                | SqlType::IntegerUnsigned
                | SqlType::BigInt
                | SqlType::Double
                | SqlType::Decimal { .. }
        )
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            SqlType::Integer | SqlType::IntegerUnsigned | SqlType::BigInt
        )
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Varchar(length) => write!(f, "VARCHAR({length})"),
            SqlType::Text => f.write_str("TEXT"),
            SqlType::MediumText => f.write_str("MEDIUMTEXT"),
            SqlType::LongText => f.write_str("LONGTEXT"),
            SqlType::Integer => f.write_str("INTEGER"),
            SqlType::IntegerUnsigned => f.write_str("INTEGER UNSIGNED"),
            SqlType::BigInt => f.write_str("BIGINT"),
            SqlType::Double => f.write_str("DOUBLE"),
            SqlType::Decimal { precision, scale } => write!(f, "DECIMAL({precision},{scale})"),
            SqlType::Date => f.write_str("DATE"),
            SqlType::Timestamp => f.write_str("TIMESTAMP"),
            SqlType::Boolean => f.write_str("BOOLEAN"),
            SqlType::Json => f.write_str("JSON"),
            SqlType::Uuid => f.write_str("UUID"),
        }
    }
}

/// Header-ordered mapping from column name to inferred type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypeMap {
    entries: Vec<(String, SqlType)>,
}

impl ColumnTypeMap {
    /// Positional lookup; duplicate header names still resolve per column.
    pub fn at(&self, index: usize) -> Option<SqlType> {
        self.entries.get(index).map(|(_, ty)| *ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SqlType)> {
        self.entries.iter().map(|(name, ty)| (name.as_str(), *ty))
    }
}

impl FromIterator<(String, SqlType)> for ColumnTypeMap {
    fn from_iter<I: IntoIterator<Item = (String, SqlType)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub table: ParsedTable,
    pub types: ColumnTypeMap,
}

impl TableSpec {
    pub fn new(name: &str, table: ParsedTable, types: ColumnTypeMap) -> Self {
        Self {
            name: sanitize_table_name(name),
            table,
            types,
        }
    }

    pub fn column_type(&self, index: usize) -> SqlType {
        self.types.at(index).unwrap_or(SqlType::Varchar(255))
    }
}

/// Lower-cases and replaces every character outside `[a-z0-9_]` with `_`.
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' => c.to_ascii_lowercase(),
            _ => '_',
        })
        .collect()
}

/// Sanitized column name, or `column_<n>` (1-based) when nothing survives sanitizing.
pub fn column_identifier(header: &str, index: usize) -> String {
    let sanitized = sanitize_identifier(header.trim());
    if sanitized.is_empty() {
        format!("column_{}", index + 1)
    } else {
        sanitized
    }
}

pub fn sanitize_table_name(name: &str) -> String {
    let sanitized = sanitize_identifier(name.trim());
    if sanitized.is_empty() {
        DEFAULT_TABLE_NAME.to_string()
    } else {
        sanitized
    }
}
