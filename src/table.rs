use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    classify::is_null_token,
    schema::{TableSpec, column_identifier},
};

const REPORT_HEADERS: [&str; 3] = ["column", "sql_type", "non_empty"];

/// One report line per column: identifier, canonical type, populated cell count.
pub fn report_rows(spec: &TableSpec) -> Vec<[String; 3]> {
    spec.types
        .iter()
        .enumerate()
        .map(|(index, (header, ty))| {
            let non_empty = spec
                .table
                .column_values(index)
                .filter(|value| !is_null_token(value))
                .count();
            [
                column_identifier(header, index),
                ty.to_string(),
                non_empty.to_string(),
            ]
        })
        .collect()
}

pub fn render_type_report(spec: &TableSpec) -> String {
    let rows = report_rows(spec);
    let mut widths = REPORT_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "Table: {}", spec.name);
    let _ = writeln!(output, "{}", format_row(&REPORT_HEADERS, &widths));
    let separator = widths.map(|width| "-".repeat(width));
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in &rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row<S: AsRef<str>>(values: &[S], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value.as_ref());
            let padding = width.saturating_sub(cell_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.truncate(line.trim_end().len());
    line
}

fn cell_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
