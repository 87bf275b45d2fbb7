use std::fmt::Write as _;

use itertools::Itertools;

use crate::{
    config::GenerationConfig,
    dialect::column_type_name,
    format::render,
    schema::{TableSpec, column_identifier},
};

const BANNER_RULE: &str = "-- ========================================";

/// DROP/CREATE statements, plus one multi-row INSERT when requested.
pub fn build_table(spec: &TableSpec, config: &GenerationConfig) -> String {
    let dialect = config.dialect;
    let table = dialect.quote_identifier(&spec.name);
    let mut sql = String::new();

    if config.include_drop_table {
        let _ = writeln!(sql, "DROP TABLE IF EXISTS {table};");
    }

    let columns = spec
        .table
        .headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let column = dialect.quote_identifier(&column_identifier(header, index));
            let ty = column_type_name(spec.column_type(index), dialect, config.optimize_types);
            format!("    {column} {ty}")
        })
        .join(",\n");
    let _ = writeln!(sql, "CREATE TABLE {table} (\n{columns}\n);");

    if config.include_inserts && !spec.table.rows.is_empty() {
        let tuples = spec
            .table
            .rows
            .iter()
            .map(|row| {
                let values = row
                    .iter()
                    .enumerate()
                    .map(|(index, value)| render(value, spec.column_type(index)))
                    .join(", ");
                format!("({values})")
            })
            .join(",\n");
        let _ = write!(sql, "\nINSERT INTO {table} VALUES\n{tuples};\n");
    }

    sql
}

fn banner(name: &str) -> String {
    format!("{BANNER_RULE}\n-- Table: {name}\n{BANNER_RULE}\n\n")
}

/// Concatenates every table in input order, each preceded by a banner.
pub fn build_combined(specs: &[TableSpec], config: &GenerationConfig) -> String {
    let mut sql = String::new();
    let plural = if specs.len() == 1 { "" } else { "s" };
    let _ = writeln!(sql, "-- Generated SQL for {} CSV file{plural}", specs.len());

    for (index, spec) in specs.iter().enumerate() {
        if index > 0 {
            sql.push('\n');
        }
        sql.push_str(&banner(&spec.name));
        sql.push_str(&build_table(spec, config));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dialect::Dialect,
        infer::infer_column_types,
        parser::parse_table,
        schema::{ColumnTypeMap, SqlType},
    };

    fn spec(name: &str, csv: &str) -> TableSpec {
        let table = parse_table(csv).unwrap();
        let types = infer_column_types(&table, 255);
        TableSpec::new(name, table, types)
    }

    #[test]
    fn build_table_emits_drop_create_and_insert() {
        let sql = build_table(
            &spec("users", "id,name\n1,Alice\n2,Bob"),
            &GenerationConfig::default(),
        );
        assert_eq!(
            sql,
            "DROP TABLE IF EXISTS users;\n\
             CREATE TABLE users (\n    id INTEGER,\n    name VARCHAR(50)\n);\n\
             \nINSERT INTO users VALUES\n(1, 'Alice'),\n(2, 'Bob');\n"
        );
    }

    #[test]
    fn build_table_honours_drop_and_insert_flags() {
        let config = GenerationConfig {
            include_drop_table: false,
            include_inserts: false,
            ..GenerationConfig::default()
        };
        let sql = build_table(&spec("users", "id\n1\n"), &config);
        assert!(!sql.contains("DROP TABLE"));
        assert!(!sql.contains("INSERT"));
        assert!(sql.starts_with("CREATE TABLE users ("));
    }

    #[test]
    fn build_table_skips_insert_without_rows() {
        let sql = build_table(&spec("t", "a,b\n1\n"), &GenerationConfig::default());
        assert!(!sql.contains("INSERT"));
    }

    #[test]
    fn column_identifiers_are_sanitized() {
        let sql = build_table(
            &spec("t", "Order ID,Unit-Price\n7,1.5\n"),
            &GenerationConfig::default(),
        );
        assert!(sql.contains("    order_id INTEGER,\n"));
        assert!(sql.contains("    unit_price DOUBLE\n"));
    }

    #[test]
    fn unsafe_identifiers_are_quoted_in_generic_output() {
        let sql = build_table(
            &spec("order", "order,group,2020 sales,\n1,2,3,4\n"),
            &GenerationConfig::default(),
        );
        assert!(sql.starts_with("DROP TABLE IF EXISTS \"order\";\nCREATE TABLE \"order\" (\n"));
        assert!(sql.contains("    \"order\" BOOLEAN,\n"));
        assert!(sql.contains("    \"group\" INTEGER,\n"));
        assert!(sql.contains("    \"2020_sales\" INTEGER,\n"));
        assert!(sql.contains("    column_4 INTEGER\n);"));
    }

    #[test]
    fn dialect_changes_names_not_literals() {
        let table = parse_table("n\n4294967295\n").unwrap();
        let types = [("n".to_string(), SqlType::IntegerUnsigned)]
            .into_iter()
            .collect::<ColumnTypeMap>();
        let spec = TableSpec::new("big", table, types);
        let config = GenerationConfig {
            dialect: Dialect::Postgres,
            ..GenerationConfig::default()
        };
        let sql = build_table(&spec, &config);
        assert!(sql.contains("CREATE TABLE \"big\" (\n    \"n\" BIGINT\n);"));
        assert!(sql.contains("(4294967295);"));
    }

    #[test]
    fn combined_output_keeps_input_order_with_banners() {
        let specs = vec![spec("orders", "id\n1\n"), spec("customers", "id\n2\n")];
        let sql = build_combined(&specs, &GenerationConfig::default());
        assert!(sql.starts_with("-- Generated SQL for 2 CSV files\n"));
        let orders = sql.find("-- Table: orders").unwrap();
        let customers = sql.find("-- Table: customers").unwrap();
        assert!(orders < customers);
        assert_eq!(sql.matches("DROP TABLE IF EXISTS").count(), 2);
        assert!(sql.contains(";\n\n-- ====="));
    }
}
