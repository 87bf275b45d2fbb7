use encoding_rs::Encoding;
use log::{info, warn};
use rayon::prelude::*;

use crate::{
    config::GenerationConfig,
    emit::{build_combined, build_table},
    error::{Result, SqlGenError},
    infer::infer_column_types,
    io_utils::decode_bytes,
    parser::parse_table,
    schema::{TableSpec, sanitize_table_name},
};

const CSV_EXTENSION: &str = ".csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_csv(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(CSV_EXTENSION)
    }
}

/// Derives a table identifier from a file name such as `Monthly Sales.csv`.
pub fn table_name_for(file_name: &str) -> String {
    let stem = if file_name.to_ascii_lowercase().ends_with(CSV_EXTENSION) {
        &file_name[..file_name.len() - CSV_EXTENSION.len()]
    } else {
        file_name
    };
    sanitize_table_name(stem)
}

/// Keeps `.csv` sources in their original order.
pub fn filter_csv_sources(sources: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
    let total = sources.len();
    let csv_sources = sources
        .into_iter()
        .filter(SourceFile::is_csv)
        .collect::<Vec<_>>();
    let ignored = total - csv_sources.len();
    if csv_sources.is_empty() {
        return Err(SqlGenError::NoCsvInputs { ignored });
    }
    if ignored > 0 {
        warn!("{ignored} non-CSV file(s) were ignored. Only CSV files are supported.");
    }
    Ok(csv_sources)
}

/// Decodes, parses, and infers one source into an immutable [`TableSpec`].
pub fn prepare_table(
    source: &SourceFile,
    table_name: &str,
    encoding: &'static Encoding,
    config: &GenerationConfig,
) -> Result<TableSpec> {
    let text = decode_bytes(&source.name, &source.bytes, encoding)?;
    let table = parse_table(&text)?;
    if table.dropped_rows > 0 {
        warn!(
            "{}: dropped {} row(s) whose field count differs from the {} header column(s)",
            source.name,
            table.dropped_rows,
            table.column_count()
        );
    }
    let types = infer_column_types(&table, config.varchar_cap);
    Ok(TableSpec::new(table_name, table, types))
}

/// Generates the script for a single file; `config.table_name` wins over the file name.
pub fn generate_single(
    source: &SourceFile,
    config: &GenerationConfig,
    encoding: &'static Encoding,
) -> Result<String> {
    let table_name = config
        .table_name
        .as_deref()
        .map(sanitize_table_name)
        .unwrap_or_else(|| table_name_for(&source.name));
    let spec = prepare_table(source, &table_name, encoding, config)?;
    info!(
        "Generated table '{}' with {} column(s) and {} row(s) from {}",
        spec.name,
        spec.table.column_count(),
        spec.table.row_count(),
        source.name
    );
    Ok(build_table(&spec, config))
}

/// Prepares every file in parallel and joins the results in input order.
///
/// The first failing file aborts the batch; no partial script is produced.
pub fn prepare_batch(
    sources: &[SourceFile],
    config: &GenerationConfig,
    encoding: &'static Encoding,
) -> Result<Vec<TableSpec>> {
    sources
        .par_iter()
        .map(|source| {
            prepare_table(source, &table_name_for(&source.name), encoding, config)
                .map_err(|err| SqlGenError::batch(source.name.clone(), err))
        })
        .collect()
}

pub fn generate_batch(
    sources: Vec<SourceFile>,
    config: &GenerationConfig,
    encoding: &'static Encoding,
) -> Result<String> {
    let sources = filter_csv_sources(sources)?;
    if config.table_name.is_some() {
        warn!("table_name is ignored when converting multiple files");
    }
    let specs = prepare_batch(&sources, config, encoding)?;
    info!(
        "Generated {} table(s): {}",
        specs.len(),
        specs
            .iter()
            .map(|spec| spec.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(build_combined(&specs, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    #[test]
    fn table_name_for_strips_extension_and_sanitizes() {
        assert_eq!(table_name_for("Monthly Sales.CSV"), "monthly_sales");
        assert_eq!(table_name_for("orders.csv"), "orders");
        assert_eq!(table_name_for(".csv"), "imported_table");
        assert_eq!(table_name_for("data.v2.csv"), "data_v2");
    }

    #[test]
    fn filter_csv_sources_drops_other_extensions() {
        let sources = vec![
            SourceFile::new("a.csv", "x\n1\n"),
            SourceFile::new("notes.txt", "hello"),
            SourceFile::new("B.CSV", "y\n2\n"),
        ];
        let kept = filter_csv_sources(sources).unwrap();
        let names = kept.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a.csv", "B.CSV"]);
    }

    #[test]
    fn filter_csv_sources_fails_when_nothing_remains() {
        let err = filter_csv_sources(vec![SourceFile::new("a.json", "{}")]).unwrap_err();
        assert!(matches!(err, SqlGenError::NoCsvInputs { ignored: 1 }));
    }

    #[test]
    fn generate_single_prefers_configured_table_name() {
        let config = GenerationConfig {
            table_name: Some("People List".to_string()),
            ..GenerationConfig::default()
        };
        let source = SourceFile::new("users.csv", "id,name\n1,Alice\n2,Bob\n");
        let sql = generate_single(&source, &config, UTF_8).unwrap();
        assert!(sql.contains("CREATE TABLE people_list ("));
    }

    #[test]
    fn generate_single_reports_empty_input() {
        let source = SourceFile::new("empty.csv", "id,name\n");
        let err = generate_single(&source, &GenerationConfig::default(), UTF_8).unwrap_err();
        assert!(matches!(err, SqlGenError::EmptyInput));
    }

    #[test]
    fn batch_failure_names_the_file_and_produces_nothing() {
        let sources = vec![
            SourceFile::new("good.csv", "id\n1\n"),
            SourceFile::new("bad.csv", "id\n"),
        ];
        let err = generate_batch(sources, &GenerationConfig::default(), UTF_8).unwrap_err();
        assert!(matches!(err, SqlGenError::BatchParse { ref name, .. } if name == "bad.csv"));
    }

    #[test]
    fn batch_output_follows_input_order() {
        let sources = (0..16)
            .map(|i| SourceFile::new(format!("t{i:02}.csv"), format!("v\n{i}\n")))
            .collect::<Vec<_>>();
        let sql = generate_batch(sources, &GenerationConfig::default(), UTF_8).unwrap();
        let positions = (0..16)
            .map(|i| sql.find(&format!("-- Table: t{i:02}\n")).unwrap())
            .collect::<Vec<_>>();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
