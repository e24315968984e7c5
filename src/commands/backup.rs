// ABOUTME: Backup command - capture table schemas and scan table data to dump files
// ABOUTME: Runs the schema-capture and paginated-scan read paths per table

use crate::dynamo::{self, ScanOutcome};
use crate::utils::{sanitize_identifier, validate_table_name};
use crate::{config::ArchiveConfig, interactive, store};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

/// Back up tables: one schema dump plus one data dump per table
///
/// Determines the target set from `tables` (explicit), the interactive
/// selector (default when no tables are named), or a full listing
/// (`no_interactive`). For each table, in sequence:
/// 1. Capture the table description and write the schema dump
/// 2. Scan the table to completion and write the data dump; an empty
///    table keeps its schema dump but gets no data file
///
/// A failing table is recorded and its siblings still run; the command
/// ends with the first error received, if any.
///
/// # Arguments
///
/// * `config` - Dump directories and connection overrides
/// * `tables` - Explicit tables to back up; `None` means all/interactive
/// * `exclude_tables` - Tables to skip
/// * `no_interactive` - Disable the selection prompt, back up everything
/// * `page_size` - Optional per-page scan limit
pub async fn backup(
    config: &ArchiveConfig,
    tables: Option<Vec<String>>,
    exclude_tables: Vec<String>,
    no_interactive: bool,
    page_size: Option<i32>,
) -> Result<()> {
    tracing::info!("Starting backup...");

    let client = dynamo::connect(config).await?;

    let mut targets = match tables {
        Some(named) => {
            for table in &named {
                validate_table_name(table)?;
            }
            named
        }
        None if !no_interactive => interactive::select_tables(&client).await?,
        None => dynamo::list_tables(&client)
            .await
            .context("Failed to discover tables to back up")?,
    };
    targets.retain(|table| !exclude_tables.contains(table));

    if targets.is_empty() {
        tracing::warn!("⚠ No tables to back up");
        return Ok(());
    }

    tracing::info!("Backing up {} table(s)", targets.len());

    let progress = ProgressBar::new(targets.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let mut total_items = 0usize;
    let mut empty_tables = 0usize;
    let mut failures: Vec<String> = Vec::new();
    let mut first_error: Option<anyhow::Error> = None;

    for table in &targets {
        progress.set_message(format!("Backing up {}", sanitize_identifier(table)));

        match backup_table(&client, config, table, page_size).await {
            Ok(item_count) => {
                match item_count {
                    Some(count) => total_items += count,
                    None => empty_tables += 1,
                }
                progress.inc(1);
            }
            Err(e) => {
                tracing::error!("  ✗ {}: {:#}", sanitize_identifier(table), e);
                failures.push(table.clone());
                if first_error.is_none() {
                    first_error = Some(e);
                }
                progress.inc(1);
            }
        }
    }

    progress.finish_with_message("Backup complete");
    tracing::info!("");
    tracing::info!("========================================");
    tracing::info!("Backup Summary");
    tracing::info!("========================================");
    tracing::info!("Tables processed: {}", targets.len());
    tracing::info!("✓ Succeeded: {}", targets.len() - failures.len());
    tracing::info!("Items dumped: {}", total_items);
    if empty_tables > 0 {
        tracing::info!("⚠ Empty tables (schema only): {}", empty_tables);
    }
    if !failures.is_empty() {
        tracing::error!("✗ Failed: {}", failures.len());
    }
    tracing::info!("Schema dumps: {}", config.schema_dir.display());
    tracing::info!("Data dumps: {}", config.data_dir.display());
    tracing::info!("========================================");

    if let Some(err) = first_error {
        return Err(err.context(format!("{} table(s) failed to back up", failures.len())));
    }

    Ok(())
}

/// Back up one table; returns the dumped item count, or `None` if empty
async fn backup_table(
    client: &aws_sdk_dynamodb::Client,
    config: &ArchiveConfig,
    table: &str,
    page_size: Option<i32>,
) -> Result<Option<usize>> {
    let schema = dynamo::capture_schema(client, table).await?;
    store::write_schema_dump(config, &schema)?;
    tracing::info!("  ✓ Captured schema for '{}'", sanitize_identifier(table));

    match dynamo::scan_table_with_page_size(client, table, page_size).await? {
        ScanOutcome::Empty => {
            tracing::warn!(
                "  ⚠ Table '{}' is empty, writing schema dump only",
                sanitize_identifier(table)
            );
            Ok(None)
        }
        ScanOutcome::Items(items) => {
            let path = store::write_data_dump(config, table, &items)?;
            tracing::info!(
                "  ✓ Dumped {} item(s) from '{}' to {}",
                items.len(),
                sanitize_identifier(table),
                path.display()
            );
            Ok(Some(items.len()))
        }
    }
}
