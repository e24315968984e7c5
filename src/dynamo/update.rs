// ABOUTME: Key template derivation and per-row update descriptor construction
// ABOUTME: Builds SET expressions over non-key attributes with #name/:name aliases

use crate::dynamo::attr::Item;
use anyhow::{anyhow, Result};
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

/// The key attribute names of a table, derived once from its captured schema
///
/// Immutable; every row borrows it to build a fresh lookup key, so no
/// per-row state is ever shared or overwritten between iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTemplate {
    names: Vec<String>,
}

impl KeyTemplate {
    pub fn new(names: Vec<String>) -> Self {
        KeyTemplate { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.names.iter().any(|name| name == attribute)
    }
}

/// Aliased update operation covering every non-key attribute of one row
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDescriptor {
    /// `SET #a = :a, #b = :b, …` over the row's non-key attributes
    pub expression: String,
    /// `#name` alias → literal attribute name
    pub names: HashMap<String, String>,
    /// `:name` alias → literal attribute value
    pub values: HashMap<String, AttributeValue>,
}

/// One row's restore payload: the lookup key plus the update to apply
///
/// `descriptor` is `None` when the row consists of key attributes only;
/// the update is then sent key-only and still materializes the row.
#[derive(Debug, Clone)]
pub struct RowUpdate {
    pub key: HashMap<String, AttributeValue>,
    pub descriptor: Option<UpdateDescriptor>,
}

/// Build the update payload for one dumped row
///
/// The lookup key copies the row's value for each key attribute named in
/// the template; a row missing a key attribute is an error. Every remaining
/// attribute becomes one (alias-name, alias-value, literal-value) triple in
/// a single SET expression. Attribute iteration order is the item's sorted
/// key order, so the generated expression is deterministic.
pub fn build_row_update(item: &Item, template: &KeyTemplate) -> Result<RowUpdate> {
    let mut key = HashMap::new();
    for name in template.names() {
        let value = item
            .get(name)
            .ok_or_else(|| anyhow!("Row is missing key attribute '{}'", name))?;
        key.insert(name.clone(), value.to_attribute_value()?);
    }

    let mut assignments = Vec::new();
    let mut names = HashMap::new();
    let mut values = HashMap::new();

    for (attr_name, attr_value) in item {
        if template.contains(attr_name) {
            continue;
        }

        let name_alias = format!("#{}", attr_name);
        let value_alias = format!(":{}", attr_name);
        assignments.push(format!("{} = {}", name_alias, value_alias));
        names.insert(name_alias, attr_name.clone());
        values.insert(value_alias, attr_value.to_attribute_value()?);
    }

    let descriptor = if assignments.is_empty() {
        None
    } else {
        Some(UpdateDescriptor {
            expression: format!("SET {}", assignments.join(", ")),
            names,
            values,
        })
    };

    Ok(RowUpdate { key, descriptor })
}
