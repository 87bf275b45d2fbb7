//! Line-oriented CSV tokenizer.
//!
//! Only commas delimit fields and doubled quotes are the sole escape. Rows
//! whose field count disagrees with the header are excluded from the parsed
//! table and counted in [`ParsedTable::dropped_rows`].

use crate::error::{Result, SqlGenError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub dropped_rows: usize,
}

impl ParsedTable {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterates the raw values of one column, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }
}

pub fn parse_line(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            other => current.push(other),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

pub fn parse_table(text: &str) -> Result<ParsedTable> {
    let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());
    let header_line = lines.next().ok_or(SqlGenError::EmptyInput)?;
    let headers = parse_line(header_line);

    let mut rows = Vec::new();
    let mut seen = 0usize;
    let mut dropped_rows = 0usize;
    for line in lines {
        seen += 1;
        let row = parse_line(line);
        if row.len() == headers.len() {
            rows.push(row);
        } else {
            dropped_rows += 1;
        }
    }
    if seen == 0 {
        return Err(SqlGenError::EmptyInput);
    }

    Ok(ParsedTable {
        headers,
        rows,
        dropped_rows,
    })
}
