// ABOUTME: Verify command - compare captured schema dumps against live tables
// ABOUTME: Checks key schema equality and dumped row counts per table

use crate::config::ArchiveConfig;
use crate::dynamo::{self, TableSchema};
use crate::store;
use crate::utils::sanitize_identifier;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

/// Result of comparing one captured schema against the live table
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyResult {
    pub table: String,
    pub table_exists: bool,
    pub key_schema_matches: bool,
    pub attributes_match: bool,
    /// Rows in the data dump, if one exists
    pub dumped_rows: Option<usize>,
    /// Item count reported by the live table
    pub live_items: i64,
}

impl VerifyResult {
    /// Structural match: the table exists with the captured key schema
    /// and attribute definitions. Item counts are informational only,
    /// since DynamoDB refreshes them roughly every six hours.
    pub fn is_valid(&self) -> bool {
        self.table_exists && self.key_schema_matches && self.attributes_match
    }
}

/// Verify that every captured schema dump matches its live table
///
/// For each schema dump (optionally restricted to `tables`): describe the
/// live table and compare key schema and attribute definitions; when a
/// data dump exists, report its row count against the live item count.
/// Tables are checked one at a time. Fails if any table is missing or
/// structurally different.
pub async fn verify(config: &ArchiveConfig, tables: Option<Vec<String>>) -> Result<()> {
    tracing::info!("Starting verification...");

    let paths: Vec<_> = store::list_schema_dumps(config)?
        .into_iter()
        .filter(|path| match &tables {
            Some(named) => crate::utils::dump_file_table_name(path)
                .map(|stem| named.contains(&stem))
                .unwrap_or(false),
            None => true,
        })
        .collect();

    if paths.is_empty() {
        tracing::warn!("⚠ No schema dumps found to verify");
        return Ok(());
    }

    tracing::info!("Verifying {} captured schema(s)", paths.len());
    let client = dynamo::connect(config).await?;

    let progress = ProgressBar::new(paths.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let mut mismatches = 0usize;
    let mut matches = 0usize;

    for path in &paths {
        let captured = store::read_schema_dump(path)?;
        let result = verify_table(&client, config, &captured).await?;
        progress.inc(1);
        progress.set_message(format!("Verified {}", sanitize_identifier(&result.table)));

        if result.is_valid() {
            matches += 1;
            tracing::info!(
                "  ✓ {}: key schema matches ({} live item(s){})",
                sanitize_identifier(&result.table),
                result.live_items,
                match result.dumped_rows {
                    Some(rows) => format!(", {} dumped row(s)", rows),
                    None => ", no data dump".to_string(),
                }
            );
            if let Some(rows) = result.dumped_rows {
                if rows as i64 != result.live_items {
                    tracing::warn!(
                        "  ⚠ {}: dumped {} row(s) but live count reports {} (counts refresh ~6h)",
                        sanitize_identifier(&result.table),
                        rows,
                        result.live_items
                    );
                }
            }
        } else {
            mismatches += 1;
            if !result.table_exists {
                tracing::error!(
                    "  ✗ {}: table does not exist on the target",
                    sanitize_identifier(&result.table)
                );
            } else if !result.key_schema_matches {
                tracing::error!(
                    "  ✗ {}: key schema differs from the captured description",
                    sanitize_identifier(&result.table)
                );
            } else {
                tracing::error!(
                    "  ✗ {}: attribute definitions differ from the captured description",
                    sanitize_identifier(&result.table)
                );
            }
        }
    }

    progress.finish_with_message("Verification complete");
    tracing::info!("");
    tracing::info!("========================================");
    tracing::info!("Verification Summary");
    tracing::info!("========================================");
    tracing::info!("Total schemas: {}", paths.len());
    tracing::info!("✓ Matches: {}", matches);
    tracing::info!("✗ Mismatches: {}", mismatches);
    tracing::info!("========================================");

    if mismatches > 0 {
        anyhow::bail!("{} table(s) failed verification", mismatches);
    }

    tracing::info!("✓ All captured schemas match their live tables");
    Ok(())
}

async fn verify_table(
    client: &aws_sdk_dynamodb::Client,
    config: &ArchiveConfig,
    captured: &TableSchema,
) -> Result<VerifyResult> {
    let dumped_rows = {
        let path = store::data_dump_path(config, &captured.table_name);
        if path.exists() {
            Some(store::read_data_dump(&path)?.len())
        } else {
            None
        }
    };

    if !dynamo::table_exists(client, &captured.table_name).await? {
        return Ok(VerifyResult {
            table: captured.table_name.clone(),
            table_exists: false,
            key_schema_matches: false,
            attributes_match: false,
            dumped_rows,
            live_items: 0,
        });
    }

    let live = dynamo::capture_schema(client, &captured.table_name)
        .await
        .with_context(|| {
            format!(
                "Failed to describe live table '{}'",
                sanitize_identifier(&captured.table_name)
            )
        })?;

    // Attribute definition order is not significant
    let mut captured_attrs = captured.attribute_definitions.clone();
    let mut live_attrs = live.attribute_definitions.clone();
    captured_attrs.sort_by(|a, b| a.name.cmp(&b.name));
    live_attrs.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(VerifyResult {
        table: captured.table_name.clone(),
        table_exists: true,
        key_schema_matches: live.key_schema == captured.key_schema,
        attributes_match: live_attrs == captured_attrs,
        dumped_rows,
        live_items: live.item_count,
    })
}
