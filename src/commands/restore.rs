// ABOUTME: Restore command - recreate tables from schema dumps and re-import rows
// ABOUTME: Sequential table creation followed by per-row update-based import

use crate::dynamo::{self, KeyTemplate, TableSchema};
use crate::utils::sanitize_identifier;
use crate::{config::ArchiveConfig, store};
use anyhow::{bail, Context, Result};
use aws_sdk_dynamodb::Client;
use dialoguer::{theme::ColorfulTheme, Confirm};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Which phases of the restore to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePhase {
    /// Recreate tables, then import data
    All,
    /// Only recreate tables from schema dumps
    SchemaOnly,
    /// Only import data; tables are assumed to exist
    DataOnly,
}

/// Restore tables from the dump directories
///
/// Phase 1 recreates every captured table sequentially, using each schema
/// dump verbatim as the creation payload. A creation failure does not stop
/// the remaining tables; every failure is logged as it occurs and the
/// command terminates with the first error after all attempts.
///
/// Phase 2 re-imports each table's dumped rows one at a time, in stored
/// order, as update operations against the captured key schema. The first
/// row failure stops that table's import and becomes its terminal error;
/// sibling tables still run.
///
/// Nothing is rolled back on failure: a partially restored table keeps
/// whatever rows were applied before the error.
///
/// # Arguments
///
/// * `config` - Dump directories and connection overrides
/// * `tables` - Restrict the restore to these tables; `None` restores
///   every schema dump present
/// * `skip_confirmation` - Skip the prompt (automation)
/// * `drop_existing` - Delete existing tables before recreating them
/// * `phase` - Schema creation, data import, or both
pub async fn restore(
    config: &ArchiveConfig,
    tables: Option<Vec<String>>,
    skip_confirmation: bool,
    drop_existing: bool,
    phase: RestorePhase,
) -> Result<()> {
    tracing::info!("Starting restore...");

    let schemas = load_schemas(config, &tables)?;
    if schemas.is_empty() {
        bail!(
            "No schema dumps found in {}",
            config.schema_dir.display()
        );
    }

    tracing::info!("Found {} schema dump(s)", schemas.len());
    for schema in &schemas {
        tracing::info!(
            "  - {} ({} key attribute(s), ~{} item(s) at capture)",
            sanitize_identifier(&schema.table_name),
            schema.key_schema.len(),
            schema.item_count
        );
    }

    if !skip_confirmation && !confirm_restore(&schemas, drop_existing)? {
        bail!("Restore cancelled by user");
    }

    let client = dynamo::connect(config).await?;

    // A table failing in both phases still counts as one failed table
    let mut failed_tables: BTreeSet<String> = BTreeSet::new();
    let mut first_error: Option<anyhow::Error> = None;
    let record_failure = |table: &str,
                          err: anyhow::Error,
                          failed: &mut BTreeSet<String>,
                          first: &mut Option<anyhow::Error>| {
        tracing::error!("  ✗ {}: {:#}", sanitize_identifier(table), err);
        failed.insert(table.to_string());
        if first.is_none() {
            *first = Some(err);
        }
    };

    if phase != RestorePhase::DataOnly {
        tracing::info!("");
        tracing::info!("Phase 1/2: Recreating tables...");
        for schema in &schemas {
            match recreate_table(&client, schema, drop_existing).await {
                Ok(()) => {
                    tracing::info!("  ✓ Created table '{}'", sanitize_identifier(&schema.table_name));
                }
                Err(e) => {
                    record_failure(&schema.table_name, e, &mut failed_tables, &mut first_error);
                }
            }
        }
    }

    if phase != RestorePhase::SchemaOnly {
        tracing::info!("");
        tracing::info!("Phase 2/2: Importing data...");
        for schema in &schemas {
            match restore_table_data(&client, config, schema).await {
                Ok(Some(count)) => {
                    tracing::info!(
                        "  ✓ Restored {} row(s) into '{}'",
                        count,
                        sanitize_identifier(&schema.table_name)
                    );
                }
                Ok(None) => {
                    tracing::info!(
                        "  ⚠ No data dump for '{}', skipping import",
                        sanitize_identifier(&schema.table_name)
                    );
                }
                Err(e) => {
                    record_failure(&schema.table_name, e, &mut failed_tables, &mut first_error);
                }
            }
        }
    }

    tracing::info!("");
    tracing::info!("========================================");
    tracing::info!("Restore Summary");
    tracing::info!("========================================");
    tracing::info!("Tables: {}", schemas.len());
    tracing::info!(
        "✓ Succeeded: {}",
        schemas.len().saturating_sub(failed_tables.len())
    );
    if !failed_tables.is_empty() {
        tracing::error!("✗ Failed: {}", failed_tables.len());
    }
    tracing::info!("========================================");

    if let Some(err) = first_error {
        return Err(err.context(format!(
            "{} table(s) failed to restore",
            failed_tables.len()
        )));
    }

    tracing::info!("✓ Restore complete");
    Ok(())
}

/// Read every selected schema dump, failing on the first unreadable file
fn load_schemas(
    config: &ArchiveConfig,
    tables: &Option<Vec<String>>,
) -> Result<Vec<TableSchema>> {
    let paths: Vec<PathBuf> = store::list_schema_dumps(config)?
        .into_iter()
        .filter(|path| match tables {
            Some(named) => crate::utils::dump_file_table_name(path)
                .map(|stem| named.contains(&stem))
                .unwrap_or(false),
            None => true,
        })
        .collect();

    paths.iter().map(|path| store::read_schema_dump(path)).collect()
}

fn confirm_restore(schemas: &[TableSchema], drop_existing: bool) -> Result<bool> {
    if drop_existing {
        tracing::warn!("⚠ --drop-existing will DELETE existing tables before recreating them");
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Restore {} table(s)?", schemas.len()))
        .default(false)
        .interact()
        .context("Confirmation prompt failed")
}

async fn recreate_table(
    client: &Client,
    schema: &TableSchema,
    drop_existing: bool,
) -> Result<()> {
    if drop_existing && dynamo::table_exists(client, &schema.table_name).await? {
        dynamo::delete_table_and_wait(client, &schema.table_name).await?;
    }
    dynamo::create_table_from_schema(client, schema).await
}

/// Import one table's dumped rows; returns `None` when no data dump exists
///
/// Rows are applied strictly one at a time, in stored order. The first
/// failing row aborts the remainder of this table's import.
async fn restore_table_data(
    client: &Client,
    config: &ArchiveConfig,
    schema: &TableSchema,
) -> Result<Option<usize>> {
    let path = store::data_dump_path(config, &schema.table_name);
    if !path.exists() {
        return Ok(None);
    }

    let items = store::read_data_dump(&path)?;
    let template: KeyTemplate = schema.key_template();

    let progress = ProgressBar::new(items.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    progress.set_message(format!("Restoring {}", sanitize_identifier(&schema.table_name)));

    for (index, item) in items.iter().enumerate() {
        let row_update = dynamo::build_row_update(item, &template).with_context(|| {
            format!(
                "Row {} of '{}' could not be converted",
                index + 1,
                sanitize_identifier(&schema.table_name)
            )
        })?;

        let mut request = client
            .update_item()
            .table_name(&schema.table_name)
            .set_key(Some(row_update.key));

        if let Some(descriptor) = row_update.descriptor {
            request = request
                .update_expression(descriptor.expression)
                .set_expression_attribute_names(Some(descriptor.names))
                .set_expression_attribute_values(Some(descriptor.values));
        }

        request.send().await.with_context(|| {
            format!(
                "Failed to restore row {} of '{}'",
                index + 1,
                sanitize_identifier(&schema.table_name)
            )
        })?;
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(Some(items.len()))
}
