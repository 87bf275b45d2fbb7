pub mod classify;
pub mod cli;
pub mod config;
pub mod data;
pub mod dialect;
pub mod emit;
pub mod error;
pub mod format;
pub mod generate;
pub mod infer;
pub mod io_utils;
pub mod parser;
pub mod schema;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands},
    config::GenerationConfig,
    generate::{filter_csv_sources, generate_batch, generate_single, prepare_table, table_name_for},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_sqlgen", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Convert(args) => handle_convert(&args),
        Commands::Infer(args) => handle_infer(&args),
        Commands::InitConfig(args) => handle_init_config(&args),
    }
}

fn handle_convert(args: &cli::ConvertArgs) -> Result<()> {
    let config = args.options.resolve()?;
    let encoding = io_utils::resolve_encoding(args.options.input_encoding.as_deref())?;
    debug!(
        "Converting {} input(s) with dialect '{}' and encoding '{}'",
        args.inputs.len(),
        config.dialect,
        encoding.name()
    );
    let sources = io_utils::read_sources(&args.inputs)?;
    let sql = if sources.len() == 1 {
        let source = filter_csv_sources(sources)?
            .into_iter()
            .next()
            .context("No CSV input to convert")?;
        generate_single(&source, &config, encoding)
            .with_context(|| format!("Generating SQL for {}", source.name))?
    } else {
        generate_batch(sources, &config, encoding)?
    };
    io_utils::write_output(args.output.as_deref(), &sql)?;
    if let Some(path) = &args.output {
        info!("SQL script written to {path:?}");
    }
    Ok(())
}

fn handle_infer(args: &cli::InferArgs) -> Result<()> {
    let config = args.resolve()?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let sources = filter_csv_sources(io_utils::read_sources(&args.inputs)?)?;
    let mut reports = Vec::with_capacity(sources.len());
    for source in &sources {
        let spec = prepare_table(source, &table_name_for(&source.name), encoding, &config)
            .with_context(|| format!("Inferring column types for {}", source.name))?;
        reports.push(table::render_type_report(&spec));
    }
    io_utils::write_output(None, &reports.join("\n"))
}

fn handle_init_config(args: &cli::InitConfigArgs) -> Result<()> {
    let config = GenerationConfig::default();
    config
        .save(&args.output)
        .with_context(|| format!("Writing default configuration to {:?}", args.output))?;
    info!("Default configuration written to {:?}", args.output);
    Ok(())
}
