// ABOUTME: Table schema capture, enumeration, and recreation
// ABOUTME: Converts DescribeTable output into a persistable creation payload

use crate::dynamo::update::KeyTemplate;
use crate::utils::sanitize_identifier;
use anyhow::{anyhow, bail, Context, Result};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode as SdkBillingMode, KeySchemaElement, KeyType,
    ProvisionedThroughput, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One declared attribute type: `S`, `N` or `B`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub attr_type: String,
}

/// One key schema element: `HASH` or `RANGE` on a named attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyElement {
    pub name: String,
    pub key_type: String,
}

/// Capacity mode captured with the schema so recreation preserves it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Billing {
    PayPerRequest,
    Provisioned {
        read_capacity_units: i64,
        write_capacity_units: i64,
    },
}

/// A table's structural description as persisted in a schema dump
///
/// Captured once per backup run and immutable afterwards; used as the
/// creation payload at restore time and as the source of key attribute
/// names for the row restorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub attribute_definitions: Vec<AttributeDef>,
    pub key_schema: Vec<KeyElement>,
    pub billing: Billing,
    /// Item count reported by DescribeTable at capture time (informational;
    /// DynamoDB refreshes this figure roughly every six hours)
    pub item_count: i64,
}

impl TableSchema {
    /// Names of the attributes that form the table's primary key
    pub fn key_attribute_names(&self) -> Vec<&str> {
        self.key_schema
            .iter()
            .map(|element| element.name.as_str())
            .collect()
    }

    /// Derive the key template used by the row restorer
    pub fn key_template(&self) -> KeyTemplate {
        KeyTemplate::new(
            self.key_schema
                .iter()
                .map(|element| element.name.clone())
                .collect(),
        )
    }
}

/// List all tables visible to the client
///
/// Follows `LastEvaluatedTableName` continuation tokens until the listing
/// is exhausted.
pub async fn list_tables(client: &Client) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut start_name: Option<String> = None;

    loop {
        let mut request = client.list_tables();
        if let Some(name) = &start_name {
            request = request.exclusive_start_table_name(name);
        }

        let output = request.send().await.context("Failed to list tables")?;
        names.extend(output.table_names.unwrap_or_default());

        match output.last_evaluated_table_name {
            Some(next) => start_name = Some(next),
            None => break,
        }
    }

    tracing::debug!("Found {} table(s)", names.len());
    Ok(names)
}

/// Fetch one table's structural description
pub async fn capture_schema(client: &Client, table: &str) -> Result<TableSchema> {
    let output = client
        .describe_table()
        .table_name(table)
        .send()
        .await
        .with_context(|| format!("Failed to describe table '{}'", sanitize_identifier(table)))?;

    let description = output.table.ok_or_else(|| {
        anyhow!(
            "DescribeTable returned no description for '{}'",
            sanitize_identifier(table)
        )
    })?;

    let attribute_definitions = description
        .attribute_definitions
        .unwrap_or_default()
        .iter()
        .map(|def| AttributeDef {
            name: def.attribute_name.clone(),
            attr_type: def.attribute_type.as_str().to_string(),
        })
        .collect::<Vec<_>>();

    let key_schema = description
        .key_schema
        .unwrap_or_default()
        .iter()
        .map(|element| KeyElement {
            name: element.attribute_name.clone(),
            key_type: element.key_type.as_str().to_string(),
        })
        .collect::<Vec<_>>();

    if key_schema.is_empty() {
        bail!(
            "Table '{}' has no key schema in its description",
            sanitize_identifier(table)
        );
    }

    // On-demand tables report a billing mode summary; provisioned tables
    // created before on-demand existed may not, so fall back to throughput.
    let billing = match description
        .billing_mode_summary
        .as_ref()
        .and_then(|summary| summary.billing_mode.as_ref())
    {
        Some(SdkBillingMode::PayPerRequest) => Billing::PayPerRequest,
        _ => {
            let throughput = description.provisioned_throughput.as_ref();
            let read = throughput.and_then(|t| t.read_capacity_units).unwrap_or(0);
            let write = throughput.and_then(|t| t.write_capacity_units).unwrap_or(0);
            if read == 0 && write == 0 {
                Billing::PayPerRequest
            } else {
                Billing::Provisioned {
                    read_capacity_units: read,
                    write_capacity_units: write,
                }
            }
        }
    };

    Ok(TableSchema {
        table_name: description
            .table_name
            .unwrap_or_else(|| table.to_string()),
        attribute_definitions,
        key_schema,
        billing,
        item_count: description.item_count.unwrap_or(0),
    })
}

/// Create a table using a captured schema as the creation payload
pub async fn create_table_from_schema(client: &Client, schema: &TableSchema) -> Result<()> {
    let attribute_definitions = schema
        .attribute_definitions
        .iter()
        .map(|def| {
            AttributeDefinition::builder()
                .attribute_name(&def.name)
                .attribute_type(ScalarAttributeType::from(def.attr_type.as_str()))
                .build()
                .with_context(|| {
                    format!(
                        "Invalid attribute definition '{}' in schema dump",
                        sanitize_identifier(&def.name)
                    )
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let key_schema = schema
        .key_schema
        .iter()
        .map(|element| {
            KeySchemaElement::builder()
                .attribute_name(&element.name)
                .key_type(KeyType::from(element.key_type.as_str()))
                .build()
                .with_context(|| {
                    format!(
                        "Invalid key schema element '{}' in schema dump",
                        sanitize_identifier(&element.name)
                    )
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let request = client
        .create_table()
        .table_name(&schema.table_name)
        .set_attribute_definitions(Some(attribute_definitions))
        .set_key_schema(Some(key_schema));

    let request = match &schema.billing {
        Billing::PayPerRequest => request.billing_mode(SdkBillingMode::PayPerRequest),
        Billing::Provisioned {
            read_capacity_units,
            write_capacity_units,
        } => request
            .billing_mode(SdkBillingMode::Provisioned)
            .provisioned_throughput(
                ProvisionedThroughput::builder()
                    .read_capacity_units(*read_capacity_units)
                    .write_capacity_units(*write_capacity_units)
                    .build()
                    .context("Invalid provisioned throughput in schema dump")?,
            ),
    };

    request.send().await.with_context(|| {
        format!(
            "Failed to create table '{}'",
            sanitize_identifier(&schema.table_name)
        )
    })?;

    Ok(())
}

/// Check whether a table currently exists
pub async fn table_exists(client: &Client, table: &str) -> Result<bool> {
    match client.describe_table().table_name(table).send().await {
        Ok(_) => Ok(true),
        Err(err) => {
            let service_err = err.into_service_error();
            if service_err.is_resource_not_found_exception() {
                Ok(false)
            } else {
                Err(service_err).with_context(|| {
                    format!("Failed to describe table '{}'", sanitize_identifier(table))
                })
            }
        }
    }
}

/// Delete a table and wait for the deletion to complete
///
/// Table deletion is asynchronous; a CreateTable issued while the old table
/// is still draining fails with ResourceInUse, so poll DescribeTable until
/// the table is gone.
pub async fn delete_table_and_wait(client: &Client, table: &str) -> Result<()> {
    tracing::info!("Deleting table '{}'", sanitize_identifier(table));

    client
        .delete_table()
        .table_name(table)
        .send()
        .await
        .with_context(|| format!("Failed to delete table '{}'", sanitize_identifier(table)))?;

    for _ in 0..60 {
        if !table_exists(client, table).await? {
            tracing::debug!("Table '{}' deletion complete", sanitize_identifier(table));
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    bail!(
        "Timed out waiting for table '{}' to finish deleting",
        sanitize_identifier(table)
    )
}
