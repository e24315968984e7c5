// ABOUTME: Typed mirror of the DynamoDB attribute-value union for dump files
// ABOUTME: Converts losslessly between dump JSON and SDK AttributeValue types

use anyhow::{anyhow, bail, Context, Result};
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One row of a table as stored in a data dump, keyed by attribute name
///
/// A `BTreeMap` keeps attribute order deterministic in dump files and in
/// generated update expressions.
pub type Item = BTreeMap<String, Attr>;

/// A single DynamoDB attribute value
///
/// Serializes as standard DynamoDB JSON, i.e. `{"S": "hello"}`,
/// `{"N": "42"}`, `{"BOOL": true}`, so dump files are interchangeable with
/// what the wire protocol carries. Binary payloads are base64-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attr {
    /// String
    S(String),
    /// Number, carried as its decimal string representation
    N(String),
    /// Binary, base64-encoded
    B(String),
    /// Boolean
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Explicit null
    #[serde(rename = "NULL")]
    Null(bool),
    /// List
    L(Vec<Attr>),
    /// Map
    M(BTreeMap<String, Attr>),
    /// String set
    SS(Vec<String>),
    /// Number set
    NS(Vec<String>),
    /// Binary set, members base64-encoded
    BS(Vec<String>),
}

impl Attr {
    /// Convert an SDK attribute value into the dump representation
    pub fn from_attribute_value(value: &AttributeValue) -> Result<Attr> {
        let attr = match value {
            AttributeValue::S(s) => Attr::S(s.clone()),
            AttributeValue::N(n) => Attr::N(n.clone()),
            AttributeValue::B(blob) => Attr::B(BASE64.encode(blob.as_ref())),
            AttributeValue::Bool(b) => Attr::Bool(*b),
            AttributeValue::Null(n) => Attr::Null(*n),
            AttributeValue::L(list) => Attr::L(
                list.iter()
                    .map(Attr::from_attribute_value)
                    .collect::<Result<Vec<_>>>()?,
            ),
            AttributeValue::M(map) => Attr::M(
                map.iter()
                    .map(|(name, nested)| Ok((name.clone(), Attr::from_attribute_value(nested)?)))
                    .collect::<Result<BTreeMap<_, _>>>()?,
            ),
            AttributeValue::Ss(set) => Attr::SS(set.clone()),
            AttributeValue::Ns(set) => Attr::NS(set.clone()),
            AttributeValue::Bs(set) => {
                Attr::BS(set.iter().map(|blob| BASE64.encode(blob.as_ref())).collect())
            }
            other => bail!("Unsupported attribute value variant: {:?}", other),
        };
        Ok(attr)
    }

    /// Convert the dump representation back into an SDK attribute value
    ///
    /// A dumped `NULL` always becomes `Null(true)`: the store only accepts
    /// an explicit null, never an absent value.
    pub fn to_attribute_value(&self) -> Result<AttributeValue> {
        let value = match self {
            Attr::S(s) => AttributeValue::S(s.clone()),
            Attr::N(n) => AttributeValue::N(n.clone()),
            Attr::B(encoded) => AttributeValue::B(Blob::new(
                BASE64
                    .decode(encoded)
                    .context("Invalid base64 in binary attribute")?,
            )),
            Attr::Bool(b) => AttributeValue::Bool(*b),
            Attr::Null(_) => AttributeValue::Null(true),
            Attr::L(list) => AttributeValue::L(
                list.iter()
                    .map(Attr::to_attribute_value)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Attr::M(map) => AttributeValue::M(
                map.iter()
                    .map(|(name, nested)| Ok((name.clone(), nested.to_attribute_value()?)))
                    .collect::<Result<HashMap<_, _>>>()?,
            ),
            Attr::SS(set) => AttributeValue::Ss(set.clone()),
            Attr::NS(set) => AttributeValue::Ns(set.clone()),
            Attr::BS(set) => AttributeValue::Bs(
                set.iter()
                    .map(|encoded| {
                        Ok(Blob::new(
                            BASE64
                                .decode(encoded)
                                .context("Invalid base64 in binary set member")?,
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        Ok(value)
    }
}

/// Parse a dumped attribute from raw JSON
///
/// A bare JSON `null` (the original dump tooling's "undefined") normalizes
/// to an explicit DynamoDB null rather than being dropped.
pub fn attr_from_json(value: serde_json::Value) -> Result<Attr> {
    if value.is_null() {
        return Ok(Attr::Null(true));
    }
    serde_json::from_value(value).map_err(|e| anyhow!("Invalid attribute value in dump: {}", e))
}

/// Convert a scanned SDK item into the dump representation
pub fn item_from_dynamo(item: &HashMap<String, AttributeValue>) -> Result<Item> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), Attr::from_attribute_value(value)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_matches_dynamodb_json() {
        assert_eq!(
            serde_json::to_string(&Attr::S("hello".to_string())).unwrap(),
            r#"{"S":"hello"}"#
        );
        assert_eq!(
            serde_json::to_string(&Attr::N("42".to_string())).unwrap(),
            r#"{"N":"42"}"#
        );
        assert_eq!(
            serde_json::to_string(&Attr::Bool(true)).unwrap(),
            r#"{"BOOL":true}"#
        );
        assert_eq!(
            serde_json::to_string(&Attr::Null(true)).unwrap(),
            r#"{"NULL":true}"#
        );
        assert_eq!(
            serde_json::to_string(&Attr::SS(vec!["a".to_string(), "b".to_string()])).unwrap(),
            r#"{"SS":["a","b"]}"#
        );
    }

    #[test]
    fn test_round_trip_scalar_values() {
        let values = vec![
            AttributeValue::S("text".to_string()),
            AttributeValue::N("3.25".to_string()),
            AttributeValue::Bool(false),
            AttributeValue::Null(true),
            AttributeValue::Ns(vec!["1".to_string(), "2".to_string()]),
        ];

        for original in values {
            let attr = Attr::from_attribute_value(&original).unwrap();
            let restored = attr.to_attribute_value().unwrap();
            assert_eq!(original, restored);
        }
    }

    #[test]
    fn test_round_trip_binary_through_base64() {
        let original = AttributeValue::B(Blob::new(vec![0u8, 159, 146, 150]));
        let attr = Attr::from_attribute_value(&original).unwrap();

        match &attr {
            Attr::B(encoded) => assert_eq!(encoded, &BASE64.encode([0u8, 159, 146, 150])),
            other => panic!("Expected binary attr, got {:?}", other),
        }

        assert_eq!(attr.to_attribute_value().unwrap(), original);
    }

    #[test]
    fn test_round_trip_nested_list_and_map() {
        let mut inner = HashMap::new();
        inner.insert("count".to_string(), AttributeValue::N("7".to_string()));
        inner.insert(
            "tags".to_string(),
            AttributeValue::L(vec![
                AttributeValue::S("a".to_string()),
                AttributeValue::Null(true),
            ]),
        );
        let original = AttributeValue::M(inner);

        let attr = Attr::from_attribute_value(&original).unwrap();
        assert_eq!(attr.to_attribute_value().unwrap(), original);
    }

    #[test]
    fn test_json_null_normalizes_to_explicit_null() {
        let attr = attr_from_json(serde_json::Value::Null).unwrap();
        assert_eq!(attr, Attr::Null(true));
        assert_eq!(
            attr.to_attribute_value().unwrap(),
            AttributeValue::Null(true)
        );
    }

    #[test]
    fn test_dumped_null_false_still_sends_explicit_null() {
        // NULL(false) never means "omit the field"
        let attr: Attr = serde_json::from_str(r#"{"NULL":false}"#).unwrap();
        assert_eq!(
            attr.to_attribute_value().unwrap(),
            AttributeValue::Null(true)
        );
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        let attr = Attr::B("not base64!!".to_string());
        assert!(attr.to_attribute_value().is_err());
    }

    #[test]
    fn test_item_from_dynamo_is_sorted() {
        let mut raw = HashMap::new();
        raw.insert("zeta".to_string(), AttributeValue::N("1".to_string()));
        raw.insert("alpha".to_string(), AttributeValue::N("2".to_string()));

        let item = item_from_dynamo(&raw).unwrap();
        let names: Vec<&str> = item.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
