use serde::{Deserialize, Serialize};

use crate::{Item, Result, StoreError};

/// The primary key of a stored item.
///
/// Tables without a sort key use keys whose `sort` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    pub partition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl Key {
    /// Creates a key for a table with only a partition key.
    pub fn partition(value: impl Into<String>) -> Self {
        Self {
            partition: value.into(),
            sort: None,
        }
    }

    /// Creates a key for a table with a partition key and a sort key.
    pub fn composite(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: Some(sort.into()),
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sort {
            Some(sort) => write!(f, "{}/{}", self.partition, sort),
            None => write!(f, "{}", self.partition),
        }
    }
}

/// Names of the key attributes of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    pub partition_key: String,
    pub sort_key: Option<String>,
}

impl KeySchema {
    /// A schema keyed by a single partition attribute.
    pub fn partition(name: impl Into<String>) -> Self {
        Self {
            partition_key: name.into(),
            sort_key: None,
        }
    }

    /// A schema keyed by a partition attribute and a sort attribute.
    pub fn composite(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self {
            partition_key: partition.into(),
            sort_key: Some(sort.into()),
        }
    }

    /// Returns true if `attribute` is one of the key attributes.
    pub fn is_key_attribute(&self, attribute: &str) -> bool {
        self.partition_key == attribute || self.sort_key.as_deref() == Some(attribute)
    }

    /// Extracts the key of `item`. Key attributes must be non-empty strings.
    pub fn key_of(&self, table: &str, item: &Item) -> Result<Key> {
        let partition = key_attribute(table, item, &self.partition_key)?;
        let sort = match &self.sort_key {
            Some(name) => Some(key_attribute(table, item, name)?),
            None => None,
        };
        Ok(Key { partition, sort })
    }

    /// Checks that `key` has exactly the parts this schema requires.
    pub fn validate(&self, table: &str, key: &Key) -> Result<()> {
        match (&self.sort_key, &key.sort) {
            (Some(name), None) => Err(StoreError::InvalidKey {
                table: table.to_string(),
                reason: format!("missing sort key '{name}'"),
            }),
            (None, Some(_)) => Err(StoreError::InvalidKey {
                table: table.to_string(),
                reason: "table has no sort key".to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Builds the key attributes of an item from a key.
    pub fn key_attributes(&self, key: &Key) -> Item {
        let mut item = Item::new();
        item.insert(
            self.partition_key.clone(),
            serde_json::Value::String(key.partition.clone()),
        );
        if let (Some(name), Some(sort)) = (&self.sort_key, &key.sort) {
            item.insert(name.clone(), serde_json::Value::String(sort.clone()));
        }
        item
    }

    /// Rejects partial updates that are empty or touch a key attribute.
    pub fn validate_changes(&self, table: &str, changes: &Item) -> Result<()> {
        if changes.is_empty() {
            return Err(StoreError::EmptyUpdate {
                table: table.to_string(),
            });
        }
        if let Some(attribute) = changes.keys().find(|name| self.is_key_attribute(name)) {
            return Err(StoreError::KeyAttributeUpdate {
                table: table.to_string(),
                attribute: attribute.clone(),
            });
        }
        Ok(())
    }
}

fn key_attribute(table: &str, item: &Item, name: &str) -> Result<String> {
    match item.get(name) {
        Some(serde_json::Value::String(value)) if !value.is_empty() => Ok(value.clone()),
        Some(_) => Err(StoreError::InvalidKey {
            table: table.to_string(),
            reason: format!("key attribute '{name}' must be a non-empty string"),
        }),
        None => Err(StoreError::InvalidKey {
            table: table.to_string(),
            reason: format!("missing key attribute '{name}'"),
        }),
    }
}
