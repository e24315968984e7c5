// ABOUTME: DynamoDB access module: client construction and table operations
// ABOUTME: Exports the attribute model, scanner, schema, and update builders

pub mod attr;
pub mod scan;
pub mod schema;
pub mod update;

pub use attr::{Attr, Item};
pub use scan::{scan_table, scan_table_with_page_size, ScanOutcome};
pub use schema::{
    capture_schema, create_table_from_schema, delete_table_and_wait, list_tables, table_exists,
    AttributeDef, Billing, KeyElement, TableSchema,
};
pub use update::{build_row_update, KeyTemplate, RowUpdate, UpdateDescriptor};

use crate::config::ArchiveConfig;
use anyhow::{bail, Result};
use aws_sdk_dynamodb::Client;

/// Build a DynamoDB client from the archive configuration
///
/// Region and endpoint overrides come from the config; everything else
/// (credentials, profiles) resolves through the ambient AWS configuration
/// chain. An endpoint override points the client at DynamoDB Local.
pub async fn connect(config: &ArchiveConfig) -> Result<Client> {
    if let Some(endpoint) = &config.endpoint_url {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            bail!(
                "Invalid endpoint URL '{}'.\n\
                 Expected format: http://host:port or https://host:port",
                endpoint
            );
        }
    }

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    if let Some(endpoint) = &config.endpoint_url {
        tracing::debug!("Using DynamoDB endpoint override: {}", endpoint);
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    Ok(Client::new(&sdk_config))
}
