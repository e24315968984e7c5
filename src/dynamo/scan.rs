// ABOUTME: Paginated table scanner accumulating the complete item set
// ABOUTME: Follows LastEvaluatedKey continuation tokens until exhaustion

use crate::dynamo::attr::{self, Item};
use crate::utils::sanitize_identifier;
use anyhow::{Context, Result};
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;

/// Result of scanning a table to completion
///
/// An empty table is an explicit signal, not an error and not an empty
/// vec a caller could mistake for a failed read. `Items` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The table exists but holds no items
    Empty,
    /// Every item in the table, in the order the pages returned them
    Items(Vec<Item>),
}

impl ScanOutcome {
    pub fn len(&self) -> usize {
        match self {
            ScanOutcome::Empty => 0,
            ScanOutcome::Items(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ScanOutcome::Empty)
    }
}

/// Scan a table to completion
pub async fn scan_table(client: &Client, table: &str) -> Result<ScanOutcome> {
    scan_table_with_page_size(client, table, None).await
}

/// Scan a table to completion with an optional per-page item limit
///
/// Each page's `LastEvaluatedKey` is passed back as `ExclusiveStartKey`;
/// absence of the key signals exhaustion. The first page-read error aborts
/// the scan with no partial result.
pub async fn scan_table_with_page_size(
    client: &Client,
    table: &str,
    page_size: Option<i32>,
) -> Result<ScanOutcome> {
    tracing::info!("Scanning table '{}'", sanitize_identifier(table));

    let mut items: Vec<Item> = Vec::new();
    let mut start_key: Option<HashMap<String, AttributeValue>> = None;
    let mut pages = 0u64;

    loop {
        let mut request = client.scan().table_name(table);
        if let Some(limit) = page_size {
            request = request.limit(limit);
        }
        request = request.set_exclusive_start_key(start_key.take());

        let output = request.send().await.with_context(|| {
            format!("Scan failed for table '{}'", sanitize_identifier(table))
        })?;
        pages += 1;

        for raw in output.items.unwrap_or_default() {
            let item = attr::item_from_dynamo(&raw).with_context(|| {
                format!(
                    "Unconvertible item in table '{}'",
                    sanitize_identifier(table)
                )
            })?;
            items.push(item);
        }

        match output.last_evaluated_key {
            Some(key) => start_key = Some(key),
            None => break,
        }
    }

    tracing::info!(
        "Scanned {} item(s) across {} page(s) from '{}'",
        items.len(),
        pages,
        sanitize_identifier(table)
    );

    if items.is_empty() {
        Ok(ScanOutcome::Empty)
    } else {
        Ok(ScanOutcome::Items(items))
    }
}
