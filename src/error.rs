use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlGenError {
    /// Fewer than a header row plus one data row.
    #[error("CSV input must have a header row and at least one data row")]
    EmptyInput,

    #[error("No CSV files to convert ({ignored} non-CSV file(s) ignored)")]
    NoCsvInputs { ignored: usize },

    #[error("Failed to decode '{name}' as {encoding}")]
    Decode { name: String, encoding: String },

    /// One file of a batch failed; the whole batch is abandoned.
    #[error("Error parsing {name}: {source}")]
    BatchParse {
        name: String,
        #[source]
        source: Box<SqlGenError>,
    },

    #[error("Unknown dialect '{0}'. Supported dialects: generic, mysql, postgres, sqlite")]
    UnknownDialect(String),

    #[error("Unknown encoding '{0}'")]
    UnknownEncoding(String),
}

pub type Result<T> = std::result::Result<T, SqlGenError>;

impl SqlGenError {
    pub fn batch(name: impl Into<String>, source: SqlGenError) -> Self {
        Self::BatchParse {
            name: name.into(),
            source: Box::new(source),
        }
    }
}
