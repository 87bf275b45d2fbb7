use std::{fs, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;

pub const DEFAULT_VARCHAR_CAP: u32 = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Overrides the table name derived from the file name (single-file runs only).
    pub table_name: Option<String>,
    pub dialect: Dialect,
    pub varchar_cap: u32,
    pub include_drop_table: bool,
    pub include_inserts: bool,
    pub optimize_types: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            table_name: None,
            dialect: Dialect::default(),
            varchar_cap: DEFAULT_VARCHAR_CAP,
            include_drop_table: true,
            include_inserts: true,
            optimize_types: true,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.varchar_cap > 0, "varchar_cap must be positive");
        if let Some(name) = &self.table_name {
            ensure!(!name.trim().is_empty(), "table_name cannot be blank");
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening config file {path:?}"))?;
        let config: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("Parsing config file {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = self.to_yaml_string()?;
        fs::write(path, serialized).with_context(|| format!("Writing config file {path:?}"))
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing generation config")
    }
}
