use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{error::SqlGenError, schema::SqlType};

pub const SIMPLIFIED_DECIMAL: SqlType = SqlType::Decimal {
    precision: 10,
    scale: 2,
};

/// Words that cannot appear as bare identifiers in the common SQL dialects.
const RESERVED_WORDS: &[&str] = &[
    "add", "all", "alter", "and", "any", "as", "asc", "between", "by", "case", "cast", "check",
    "column", "constraint", "create", "cross", "current_date", "current_time",
    "current_timestamp", "current_user", "default", "delete", "desc", "distinct", "drop", "else",
    "end", "except", "exists", "false", "fetch", "for", "foreign", "from", "full", "grant",
    "group", "having", "in", "index", "inner", "insert", "intersect", "into", "is", "join", "key",
    "left", "like", "limit", "natural", "not", "null", "offset", "on", "or", "order", "outer",
    "primary", "references", "right", "select", "set", "some", "table", "then", "to", "true",
    "union", "unique", "update", "user", "using", "values", "when", "where", "with",
];

/// Post-inference naming target; parsed from `--dialect` and the config file via [`FromStr`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    #[default]
    Generic,
    Mysql,
    Postgres,
    Sqlite,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }

    pub fn type_name(&self, ty: SqlType) -> Cow<'static, str> {
        let renamed = match (self, ty) {
            (Dialect::Generic, _) => None,
            (Dialect::Mysql, SqlType::Uuid) => Some("CHAR(36)"),
            (Dialect::Mysql, _) => None,
            (Dialect::Postgres, SqlType::IntegerUnsigned) => Some("BIGINT"),
            (Dialect::Postgres, SqlType::MediumText | SqlType::LongText) => Some("TEXT"),
            (Dialect::Postgres, SqlType::Double) => Some("DOUBLE PRECISION"),
            (Dialect::Postgres, _) => None,
            (Dialect::Sqlite, ty) if ty.is_integer() || ty == SqlType::Boolean => Some("INTEGER"),
            (Dialect::Sqlite, SqlType::Double) => Some("REAL"),
            (Dialect::Sqlite, SqlType::Decimal { .. }) => Some("NUMERIC"),
            (Dialect::Sqlite, _) => Some("TEXT"),
        };
        match renamed {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(ty.to_string()),
        }
    }

    pub fn quote_identifier(&self, identifier: &str) -> String {
        match self {
            Dialect::Generic if needs_quoting(identifier) => format!("\"{identifier}\""),
            Dialect::Generic => identifier.to_string(),
            Dialect::Mysql => format!("`{identifier}`"),
            Dialect::Postgres | Dialect::Sqlite => format!("\"{identifier}\""),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = SqlGenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "generic" | "default" => Ok(Dialect::Generic),
            "mysql" | "mariadb" => Ok(Dialect::Mysql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(SqlGenError::UnknownDialect(value.to_string())),
        }
    }
}

impl Serialize for Dialect {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Dialect {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(de::Error::custom)
    }
}

/// Empty names, names starting with a digit, and reserved words.
pub fn needs_quoting(identifier: &str) -> bool {
    identifier.is_empty()
        || identifier.starts_with(|c: char| c.is_ascii_digit())
        || RESERVED_WORDS.contains(&identifier.to_ascii_lowercase().as_str())
}

/// Collapses width-specific variants to coarse equivalents.
pub fn simplify(ty: SqlType) -> SqlType {
    match ty {
        SqlType::Integer | SqlType::IntegerUnsigned | SqlType::BigInt => SqlType::Integer,
        SqlType::Double | SqlType::Decimal { .. } => SIMPLIFIED_DECIMAL,
        SqlType::Json | SqlType::Text | SqlType::MediumText | SqlType::LongText => SqlType::Text,
        SqlType::Uuid => SqlType::Varchar(36),
        other => other,
    }
}

/// Name emitted in DDL for an inferred type.
pub fn column_type_name(ty: SqlType, dialect: Dialect, optimize_types: bool) -> Cow<'static, str> {
    let ty = if optimize_types { ty } else { simplify(ty) };
    dialect.type_name(ty)
}
