// ABOUTME: File store for schema and data dumps
// ABOUTME: Reads and writes per-table JSON files under the configured dump directories

use crate::config::ArchiveConfig;
use crate::dynamo::attr::{self, Item};
use crate::dynamo::TableSchema;
use crate::utils::dump_file_table_name;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Path of the schema dump for a table
pub fn schema_dump_path(config: &ArchiveConfig, table: &str) -> PathBuf {
    config.schema_dir.join(format!("{}.json", table))
}

/// Path of the data dump for a table
pub fn data_dump_path(config: &ArchiveConfig, table: &str) -> PathBuf {
    config.data_dir.join(format!("{}.json", table))
}

/// Write a captured schema as `<schema_dir>/<table>.json`
pub fn write_schema_dump(config: &ArchiveConfig, schema: &TableSchema) -> Result<PathBuf> {
    fs::create_dir_all(&config.schema_dir).with_context(|| {
        format!(
            "Failed to create schema dump directory {}",
            config.schema_dir.display()
        )
    })?;

    let path = schema_dump_path(config, &schema.table_name);
    let json = serde_json::to_string_pretty(schema).context("Failed to serialize table schema")?;
    fs::write(&path, json)
        .with_context(|| format!("Failed to write schema dump {}", path.display()))?;

    tracing::debug!("Wrote schema dump {}", path.display());
    Ok(path)
}

/// Read one schema dump file
pub fn read_schema_dump(path: &Path) -> Result<TableSchema> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema dump {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse schema dump {}", path.display()))
}

/// List every schema dump present, sorted by file name
///
/// Only `*.json` entries count; anything else in the directory is ignored.
pub fn list_schema_dumps(config: &ArchiveConfig) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(&config.schema_dir).with_context(|| {
        format!(
            "Failed to read schema dump directory {}",
            config.schema_dir.display()
        )
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| dump_file_table_name(path).is_some())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Write a scanned item batch as `<data_dir>/<table>.json`
pub fn write_data_dump(config: &ArchiveConfig, table: &str, items: &[Item]) -> Result<PathBuf> {
    fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "Failed to create data dump directory {}",
            config.data_dir.display()
        )
    })?;

    let path = data_dump_path(config, table);
    let json = serde_json::to_string_pretty(items).context("Failed to serialize item batch")?;
    fs::write(&path, json)
        .with_context(|| format!("Failed to write data dump {}", path.display()))?;

    tracing::debug!("Wrote {} item(s) to {}", items.len(), path.display());
    Ok(path)
}

/// Read one data dump file
///
/// Rows pass through raw JSON so a field holding a bare `null` (the
/// original dump tooling's "undefined") normalizes to an explicit
/// DynamoDB null instead of failing or being dropped.
pub fn read_data_dump(path: &Path) -> Result<Vec<Item>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data dump {}", path.display()))?;

    let raw: Vec<BTreeMap<String, serde_json::Value>> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse data dump {}", path.display()))?;

    raw.into_iter()
        .enumerate()
        .map(|(row, fields)| {
            fields
                .into_iter()
                .map(|(name, value)| {
                    let attr = attr::attr_from_json(value).with_context(|| {
                        format!(
                            "Row {} attribute '{}' in {}",
                            row + 1,
                            name,
                            path.display()
                        )
                    })?;
                    Ok((name, attr))
                })
                .collect::<Result<Item>>()
        })
        .collect()
}
