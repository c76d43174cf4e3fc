use serde_json::Value;

use crate::{Item, Key};

/// Key condition of a query: an exact partition key, optionally narrowed to
/// one exact sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCondition {
    pub partition: String,
    pub sort: Option<String>,
}

impl KeyCondition {
    /// Matches every item in one partition.
    pub fn partition(value: impl Into<String>) -> Self {
        Self {
            partition: value.into(),
            sort: None,
        }
    }

    /// Narrows the condition to an exact sort key.
    pub fn sort_equals(mut self, value: impl Into<String>) -> Self {
        self.sort = Some(value.into());
        self
    }

    /// Returns true if the key satisfies this condition.
    pub fn matches(&self, key: &Key) -> bool {
        if key.partition != self.partition {
            return false;
        }
        match &self.sort {
            Some(sort) => key.sort.as_deref() == Some(sort.as_str()),
            None => true,
        }
    }
}

/// Containment filter applied to items after the key condition has selected
/// them.
///
/// Matches when the attribute is a string containing `value`, or a list
/// holding the string `value` as an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub attribute: String,
    pub value: String,
}

impl Filter {
    /// Creates a containment filter.
    pub fn contains(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Returns true if the item passes the filter. Missing attributes never match.
    pub fn matches(&self, item: &Item) -> bool {
        match item.get(&self.attribute) {
            Some(Value::String(s)) => s.contains(self.value.as_str()),
            Some(Value::Array(elements)) => elements
                .iter()
                .any(|element| element.as_str() == Some(self.value.as_str())),
            _ => false,
        }
    }
}

/// Request for one page of a scan.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// Maximum number of items to return. `None` returns everything left.
    pub limit: Option<usize>,
    /// Resume after this key (the `last_key` of the previous page).
    pub start_after: Option<Key>,
}

impl PageRequest {
    /// Requests the first page with the given size.
    pub fn first(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            start_after: None,
        }
    }

    /// Requests the page following `key`.
    pub fn after(limit: usize, key: Key) -> Self {
        Self {
            limit: Some(limit),
            start_after: Some(key),
        }
    }
}

/// One page of results with an optional continuation key.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Key of the last returned item when more items remain.
    pub last_key: Option<Key>,
}

impl<T> Page<T> {
    /// Returns true if no further page exists.
    pub fn is_last(&self) -> bool {
        self.last_key.is_none()
    }

    /// Converts every item of the page, keeping the continuation key.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            last_key: self.last_key,
        })
    }
}
