// ABOUTME: Tables command - report live tables with key schema and item counts
// ABOUTME: Read-only listing used before choosing what to back up

use crate::config::ArchiveConfig;
use crate::dynamo::{self, Billing};
use crate::utils::sanitize_identifier;
use anyhow::{Context, Result};

/// List live tables with their key schema and item counts
///
/// Item counts come from DescribeTable and are refreshed by DynamoDB
/// roughly every six hours, so treat them as estimates.
pub async fn tables(config: &ArchiveConfig) -> Result<()> {
    let client = dynamo::connect(config).await?;

    tracing::info!("Discovering tables...");
    let names = dynamo::list_tables(&client)
        .await
        .context("Failed to list tables")?;

    if names.is_empty() {
        tracing::warn!("⚠ No tables found");
        return Ok(());
    }

    tracing::info!("Found {} table(s)", names.len());
    tracing::info!("");

    let mut total_items: i64 = 0;
    for name in &names {
        let schema = dynamo::capture_schema(&client, name).await?;

        let keys: Vec<String> = schema
            .key_schema
            .iter()
            .map(|element| format!("{} ({})", element.name, element.key_type))
            .collect();
        let billing = match &schema.billing {
            Billing::PayPerRequest => "on-demand".to_string(),
            Billing::Provisioned {
                read_capacity_units,
                write_capacity_units,
            } => format!("provisioned {}r/{}w", read_capacity_units, write_capacity_units),
        };

        tracing::info!(
            "  - {}: keys [{}], {}, ~{} item(s)",
            sanitize_identifier(name),
            keys.join(", "),
            billing,
            schema.item_count
        );
        total_items += schema.item_count;
    }

    tracing::info!("");
    tracing::info!("Total: {} table(s), ~{} item(s)", names.len(), total_items);
    Ok(())
}
