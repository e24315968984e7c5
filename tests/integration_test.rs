// ABOUTME: Integration tests for the full backup/restore workflow
// ABOUTME: Tests scanner, schema round trip, and commands against DynamoDB Local

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use dynamo_archiver::commands::{self, RestorePhase};
use dynamo_archiver::config::ArchiveConfig;
use dynamo_archiver::dynamo::{self, Billing, ScanOutcome, TableSchema};
use dynamo_archiver::dynamo::schema::{AttributeDef, KeyElement};
use dynamo_archiver::store;
use std::env;
use std::path::Path;

/// Helper to get the DynamoDB Local endpoint from the environment
///
/// Run e.g. `docker run -p 8000:8000 amazon/dynamodb-local` and set
/// TEST_DYNAMO_ENDPOINT=http://localhost:8000 (credentials can be dummies,
/// DynamoDB Local accepts anything).
fn test_endpoint() -> Option<String> {
    env::var("TEST_DYNAMO_ENDPOINT").ok()
}

fn test_config(endpoint: &str, dir: &Path) -> ArchiveConfig {
    ArchiveConfig {
        schema_dir: dir.join("schemas"),
        data_dir: dir.join("data"),
        region: Some("us-east-1".to_string()),
        endpoint_url: Some(endpoint.to_string()),
    }
}

fn simple_schema(table: &str) -> TableSchema {
    TableSchema {
        table_name: table.to_string(),
        attribute_definitions: vec![AttributeDef {
            name: "id".to_string(),
            attr_type: "S".to_string(),
        }],
        key_schema: vec![KeyElement {
            name: "id".to_string(),
            key_type: "HASH".to_string(),
        }],
        billing: Billing::PayPerRequest,
        item_count: 0,
    }
}

async fn put_row(client: &Client, table: &str, id: &str, name: &str, age: &str) {
    client
        .put_item()
        .table_name(table)
        .item("id", AttributeValue::S(id.to_string()))
        .item("name", AttributeValue::S(name.to_string()))
        .item("age", AttributeValue::N(age.to_string()))
        .send()
        .await
        .unwrap();
}

async fn drop_if_exists(client: &Client, table: &str) {
    if dynamo::table_exists(client, table).await.unwrap() {
        dynamo::delete_table_and_wait(client, table).await.unwrap();
    }
}

#[tokio::test]
#[ignore]
async fn test_scan_page_count_invariance() {
    let endpoint = test_endpoint().expect("TEST_DYNAMO_ENDPOINT must be set");
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&endpoint, dir.path());
    let client = dynamo::connect(&config).await.unwrap();

    let table = "archiver_it_paging";
    drop_if_exists(&client, table).await;
    dynamo::create_table_from_schema(&client, &simple_schema(table))
        .await
        .unwrap();

    for i in 0..5 {
        put_row(&client, table, &format!("id-{}", i), "row", &i.to_string()).await;
    }

    // Page size 1 forces 5+ pages; the total must not change
    let paged = dynamo::scan_table_with_page_size(&client, table, Some(1))
        .await
        .unwrap();
    let unpaged = dynamo::scan_table(&client, table).await.unwrap();

    println!("paged: {} item(s), unpaged: {} item(s)", paged.len(), unpaged.len());
    assert_eq!(paged.len(), 5);
    assert_eq!(unpaged.len(), 5);

    // No duplicates across page boundaries
    if let ScanOutcome::Items(items) = paged {
        let mut ids: Vec<_> = items
            .iter()
            .map(|item| item.get("id").cloned().unwrap())
            .collect();
        ids.sort_by_key(|attr| format!("{:?}", attr));
        ids.dedup();
        assert_eq!(ids.len(), 5);
    } else {
        panic!("Expected items");
    }

    drop_if_exists(&client, table).await;
}

#[tokio::test]
#[ignore]
async fn test_empty_table_yields_explicit_signal() {
    let endpoint = test_endpoint().expect("TEST_DYNAMO_ENDPOINT must be set");
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&endpoint, dir.path());
    let client = dynamo::connect(&config).await.unwrap();

    let table = "archiver_it_empty";
    drop_if_exists(&client, table).await;
    dynamo::create_table_from_schema(&client, &simple_schema(table))
        .await
        .unwrap();

    let outcome = dynamo::scan_table(&client, table).await.unwrap();
    assert_eq!(outcome, ScanOutcome::Empty);

    drop_if_exists(&client, table).await;
}

#[tokio::test]
#[ignore]
async fn test_backup_restore_round_trip() {
    let endpoint = test_endpoint().expect("TEST_DYNAMO_ENDPOINT must be set");
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&endpoint, dir.path());
    let client = dynamo::connect(&config).await.unwrap();

    let table = "archiver_it_roundtrip";
    drop_if_exists(&client, table).await;
    dynamo::create_table_from_schema(&client, &simple_schema(table))
        .await
        .unwrap();
    put_row(&client, table, "1", "a", "5").await;
    put_row(&client, table, "2", "b", "7").await;

    // Back up the one table
    commands::backup(
        &config,
        Some(vec![table.to_string()]),
        vec![],
        true,
        None,
    )
    .await
    .unwrap();

    assert!(store::schema_dump_path(&config, table).exists());
    assert!(store::data_dump_path(&config, table).exists());

    // Blow the table away, then restore it from the dumps
    dynamo::delete_table_and_wait(&client, table).await.unwrap();
    commands::restore(&config, Some(vec![table.to_string()]), true, false, RestorePhase::All)
        .await
        .unwrap();

    // The recreated table's key schema matches the original description
    let captured = store::read_schema_dump(&store::schema_dump_path(&config, table)).unwrap();
    let live = dynamo::capture_schema(&client, table).await.unwrap();
    assert_eq!(live.key_schema, captured.key_schema);

    // And the rows came back
    let outcome = dynamo::scan_table(&client, table).await.unwrap();
    assert_eq!(outcome.len(), 2);

    // Verify agrees
    commands::verify(&config, Some(vec![table.to_string()]))
        .await
        .unwrap();

    drop_if_exists(&client, table).await;
}

#[tokio::test]
#[ignore]
async fn test_restore_stops_at_first_failing_row() {
    let endpoint = test_endpoint().expect("TEST_DYNAMO_ENDPOINT must be set");
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&endpoint, dir.path());
    let client = dynamo::connect(&config).await.unwrap();

    let table = "archiver_it_rowfail";
    drop_if_exists(&client, table).await;

    // Five dumped rows; row 3 is missing its key attribute
    store::write_schema_dump(&config, &simple_schema(table)).unwrap();
    std::fs::create_dir_all(&config.data_dir).unwrap();
    std::fs::write(
        store::data_dump_path(&config, table),
        r#"[
            {"id": {"S": "1"}, "name": {"S": "a"}},
            {"id": {"S": "2"}, "name": {"S": "b"}},
            {"name": {"S": "c"}},
            {"id": {"S": "4"}, "name": {"S": "d"}},
            {"id": {"S": "5"}, "name": {"S": "e"}}
        ]"#,
    )
    .unwrap();

    let result = commands::restore(
        &config,
        Some(vec![table.to_string()]),
        true,
        false,
        RestorePhase::All,
    )
    .await;

    // The row-3 failure is the table's terminal restore error
    let message = format!("{:#}", result.unwrap_err());
    println!("restore error: {}", message);
    assert!(message.contains("Row 3"));
    assert!(message.contains("key attribute 'id'"));

    // Rows 1-2 were applied, rows 4-5 were never attempted
    let outcome = dynamo::scan_table(&client, table).await.unwrap();
    match outcome {
        ScanOutcome::Items(items) => {
            let mut ids: Vec<String> = items
                .iter()
                .map(|item| match item.get("id").unwrap() {
                    dynamo_archiver::dynamo::Attr::S(s) => s.clone(),
                    other => panic!("Unexpected id attr: {:?}", other),
                })
                .collect();
            ids.sort();
            assert_eq!(ids, vec!["1".to_string(), "2".to_string()]);
        }
        ScanOutcome::Empty => panic!("Expected rows 1-2 to have been applied"),
    }

    drop_if_exists(&client, table).await;
}

#[tokio::test]
#[ignore]
async fn test_restore_failure_counted_once_per_table() {
    let endpoint = test_endpoint().expect("TEST_DYNAMO_ENDPOINT must be set");
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&endpoint, dir.path());
    let client = dynamo::connect(&config).await.unwrap();

    let table = "archiver_it_doublefail";
    drop_if_exists(&client, table).await;

    // An attribute definition with no matching key element is rejected by
    // CreateTable, so phase 1 fails; the table then doesn't exist, so the
    // data import fails too. One table, two failing phases.
    let mut schema = simple_schema(table);
    schema.attribute_definitions.push(AttributeDef {
        name: "orphan".to_string(),
        attr_type: "S".to_string(),
    });
    store::write_schema_dump(&config, &schema).unwrap();
    std::fs::create_dir_all(&config.data_dir).unwrap();
    std::fs::write(
        store::data_dump_path(&config, table),
        r#"[{"id": {"S": "1"}, "name": {"S": "a"}}]"#,
    )
    .unwrap();

    let result = commands::restore(
        &config,
        Some(vec![table.to_string()]),
        true,
        false,
        RestorePhase::All,
    )
    .await;

    let message = format!("{:#}", result.unwrap_err());
    println!("restore error: {}", message);
    assert!(message.contains("1 table(s) failed to restore"));

    drop_if_exists(&client, table).await;
}

#[tokio::test]
#[ignore]
async fn test_restore_normalizes_null_fields() {
    let endpoint = test_endpoint().expect("TEST_DYNAMO_ENDPOINT must be set");
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&endpoint, dir.path());
    let client = dynamo::connect(&config).await.unwrap();

    let table = "archiver_it_nulls";
    drop_if_exists(&client, table).await;

    // Hand-written dumps: one row carries a bare JSON null for "name"
    store::write_schema_dump(&config, &simple_schema(table)).unwrap();
    std::fs::create_dir_all(&config.data_dir).unwrap();
    std::fs::write(
        store::data_dump_path(&config, table),
        r#"[{"id": {"S": "1"}, "name": null}]"#,
    )
    .unwrap();

    commands::restore(&config, Some(vec![table.to_string()]), true, false, RestorePhase::All)
        .await
        .unwrap();

    let outcome = dynamo::scan_table(&client, table).await.unwrap();
    match outcome {
        ScanOutcome::Items(items) => {
            assert_eq!(items.len(), 1);
            // The field is present as an explicit null, not omitted
            assert_eq!(
                items[0].get("name"),
                Some(&dynamo_archiver::dynamo::Attr::Null(true))
            );
        }
        ScanOutcome::Empty => panic!("Expected the restored row"),
    }

    drop_if_exists(&client, table).await;
}
