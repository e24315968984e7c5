// ABOUTME: Explicit configuration for the backup and restore pipelines
// ABOUTME: Handles defaults, TOML config file loading, and CLI overrides

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conventional location for per-table schema dumps
pub const DEFAULT_SCHEMA_DIR: &str = "./dynamodb/backup_schemas";

/// Conventional location for per-table data dumps
pub const DEFAULT_DATA_DIR: &str = "./dynamodb/backup_data";

/// Configuration passed into every pipeline component at construction time
///
/// Replaces ambient environment state with an explicit struct. Values come
/// from (lowest to highest precedence): built-in defaults, an optional
/// `archive-config.toml` file, and CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Directory holding one `<table>.json` schema dump per table
    pub schema_dir: PathBuf,
    /// Directory holding one `<table>.json` data dump per table
    pub data_dir: PathBuf,
    /// AWS region override; falls back to the ambient AWS configuration
    pub region: Option<String>,
    /// Endpoint override, e.g. http://localhost:8000 for DynamoDB Local
    pub endpoint_url: Option<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        ArchiveConfig {
            schema_dir: PathBuf::from(DEFAULT_SCHEMA_DIR),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            region: None,
            endpoint_url: None,
        }
    }
}

impl ArchiveConfig {
    /// Load configuration from a TOML file, filling unset fields with defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ArchiveConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply CLI flag overrides on top of this configuration
    pub fn apply_overrides(
        mut self,
        schema_dir: Option<PathBuf>,
        data_dir: Option<PathBuf>,
        region: Option<String>,
        endpoint_url: Option<String>,
    ) -> Self {
        if let Some(dir) = schema_dir {
            self.schema_dir = dir;
        }
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if region.is_some() {
            self.region = region;
        }
        if endpoint_url.is_some() {
            self.endpoint_url = endpoint_url;
        }
        self
    }
}
