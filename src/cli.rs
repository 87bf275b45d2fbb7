use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::{config::GenerationConfig, dialect::Dialect};

#[derive(Debug, Parser)]
#[command(author, version, about = "Generate SQL table definitions and inserts from CSV files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert one or more CSV files into a SQL script
    Convert(ConvertArgs),
    /// Print the inferred column types without emitting SQL
    Infer(InferArgs),
    /// Write a configuration file populated with the default options
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input CSV files (use '-' to read stdin)
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Output SQL file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub options: GenerationArgs,
}

#[derive(Debug, Args)]
pub struct InferArgs {
    /// Input CSV files (use '-' to read stdin)
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// YAML configuration file; only `varchar_cap` affects inference
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Upper bound for scaled VARCHAR lengths
    #[arg(long = "varchar-cap")]
    pub varchar_cap: Option<u32>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct InitConfigArgs {
    /// Destination YAML file
    #[arg(short = 'o', long = "output", default_value = "csv-sqlgen.yml")]
    pub output: PathBuf,
}

/// Options shared by every generating command; flags override `--config` values.
#[derive(Debug, Args)]
pub struct GenerationArgs {
    /// YAML configuration file mirroring the generation options
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Table name for single-file conversions (derived from the file name otherwise)
    #[arg(long = "table-name")]
    pub table_name: Option<String>,
    /// Target SQL dialect: generic, mysql, postgres, or sqlite
    #[arg(long = "dialect")]
    pub dialect: Option<Dialect>,
    /// Upper bound for scaled VARCHAR lengths
    #[arg(long = "varchar-cap")]
    pub varchar_cap: Option<u32>,
    /// Omit DROP TABLE IF EXISTS statements
    #[arg(long = "no-drop-table")]
    pub no_drop_table: bool,
    /// Omit INSERT statements
    #[arg(long = "no-inserts")]
    pub no_inserts: bool,
    /// Emit simplified column types instead of the most specific ones
    #[arg(long = "no-optimize-types")]
    pub no_optimize_types: bool,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

impl GenerationArgs {
    pub fn resolve(&self) -> Result<GenerationConfig> {
        let mut config = load_base_config(self.config.as_ref())?;
        if let Some(name) = &self.table_name {
            config.table_name = Some(name.clone());
        }
        if let Some(dialect) = self.dialect {
            config.dialect = dialect;
        }
        if let Some(cap) = self.varchar_cap {
            config.varchar_cap = cap;
        }
        if self.no_drop_table {
            config.include_drop_table = false;
        }
        if self.no_inserts {
            config.include_inserts = false;
        }
        if self.no_optimize_types {
            config.optimize_types = false;
        }
        config.validate()?;
        Ok(config)
    }
}

impl InferArgs {
    pub fn resolve(&self) -> Result<GenerationConfig> {
        let mut config = load_base_config(self.config.as_ref())?;
        if let Some(cap) = self.varchar_cap {
            config.varchar_cap = cap;
        }
        config.validate()?;
        Ok(config)
    }
}

fn load_base_config(path: Option<&PathBuf>) -> Result<GenerationConfig> {
    match path {
        Some(path) => GenerationConfig::load(path)
            .with_context(|| format!("Loading configuration from {path:?}")),
        None => Ok(GenerationConfig::default()),
    }
}
