// ABOUTME: Interactive terminal UI for table selection
// ABOUTME: Provides a multi-select interface for choosing tables to back up

use crate::dynamo;
use anyhow::{bail, Context, Result};
use aws_sdk_dynamodb::Client;
use dialoguer::{theme::ColorfulTheme, MultiSelect};

/// Interactively select tables to back up
///
/// Lists every table visible to the client and presents a multi-select
/// with all tables checked by default.
///
/// # Errors
///
/// Returns an error if the listing fails, the account has no tables,
/// the prompt is cancelled, or nothing is selected.
pub async fn select_tables(client: &Client) -> Result<Vec<String>> {
    tracing::info!("Discovering tables...");
    let tables = dynamo::list_tables(client)
        .await
        .context("Failed to list tables for selection")?;

    if tables.is_empty() {
        bail!("No tables found on the source account");
    }

    let defaults = vec![true; tables.len()];
    let selection = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select tables to back up (space to toggle, enter to confirm)")
        .items(&tables)
        .defaults(&defaults)
        .interact()
        .context("Table selection cancelled")?;

    if selection.is_empty() {
        bail!("No tables selected");
    }

    Ok(selection
        .into_iter()
        .map(|index| tables[index].clone())
        .collect())
}
