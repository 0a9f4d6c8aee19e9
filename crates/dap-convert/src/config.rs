//! Configuration for the converter.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConvertError, ConvertResult};

/// Configuration for attribute attachment and materialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Attribute tables attached to the dataset root.
    pub global_tables: Vec<String>,

    /// Table carrying server extras such as the unlimited dimension.
    pub extra_table: String,

    /// Table declaring extra dimensions as `name = length`.
    pub extra_dimension_table: String,

    /// Convert degenerate string scalars into char data.
    pub legacy_char_strings: bool,

    /// Merge `coordinates` into `_CoordinateAxes` after attachment.
    pub merge_coordinate_axes: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            global_tables: vec!["NC_GLOBAL".to_string(), "HDF_GLOBAL".to_string()],
            extra_table: "DODS_EXTRA".to_string(),
            extra_dimension_table: "EXTRA_DIMENSION".to_string(),
            legacy_char_strings: true,
            merge_coordinate_axes: true,
        }
    }
}

impl ConvertConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("DAP_GLOBAL_TABLES") {
            let tables: Vec<String> = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !tables.is_empty() {
                config.global_tables = tables;
            }
        }

        if let Ok(val) = std::env::var("DAP_LEGACY_CHAR_STRINGS") {
            config.legacy_char_strings = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("DAP_MERGE_COORDINATE_AXES") {
            config.merge_coordinate_axes = parse_flag(&val);
        }

        config
    }

    /// Parse configuration from a YAML document. Missing keys take defaults.
    pub fn from_yaml_str(yaml: &str) -> ConvertResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate().map_err(ConvertError::config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.global_tables.is_empty() {
            return Err("global_tables must not be empty".to_string());
        }

        if self.global_tables.iter().any(|t| t.trim().is_empty()) {
            return Err("global_tables must not contain empty names".to_string());
        }

        if self.extra_table.trim().is_empty() {
            return Err("extra_table must not be empty".to_string());
        }

        if self.extra_dimension_table.trim().is_empty() {
            return Err("extra_dimension_table must not be empty".to_string());
        }

        Ok(())
    }

    /// Whether `table` holds file-level attributes.
    pub fn is_global_table(&self, table: &str) -> bool {
        self.global_tables.iter().any(|t| t == table)
    }
}

fn parse_flag(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}
