use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::value::Item;

/// Key attributes of a table or of one of its indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchema {
    pub partition_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
}

impl KeySchema {
    /// A schema with only a partition key.
    pub fn partition(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: None,
        }
    }

    /// A schema with a partition key and a sort key.
    pub fn composite(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: Some(sort_key.into()),
        }
    }

    /// The key attribute names, partition key first.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.partition_key.as_str()).chain(self.sort_key.as_deref())
    }
}

/// How much consumed capacity the store should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnConsumedCapacity {
    Indexes,
    Total,
    None,
}

impl ReturnConsumedCapacity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indexes => "INDEXES",
            Self::Total => "TOTAL",
            Self::None => "NONE",
        }
    }
}

impl fmt::Display for ReturnConsumedCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReturnConsumedCapacity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INDEXES" => Ok(Self::Indexes),
            "TOTAL" => Ok(Self::Total),
            "NONE" => Ok(Self::None),
            other => Err(format!("unknown consumed capacity mode: {other}")),
        }
    }
}

/// Capacity the store reports for a read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumedCapacity {
    pub table_name: Option<String>,
    pub capacity_units: Option<f64>,
}

/// Result of a single query or scan page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOutput {
    /// Matching items, in the order the store returned them.
    pub items: Vec<Item>,
    /// Number of items returned after the filter.
    pub count: usize,
    /// Number of items read before the filter.
    pub scanned_count: usize,
    /// Key of the last item read when the page stopped early. Never followed.
    pub last_evaluated_key: Option<Item>,
    pub consumed_capacity: Option<ConsumedCapacity>,
}

/// Result of a single-item read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GetItemOutput {
    pub item: Option<Item>,
    pub consumed_capacity: Option<ConsumedCapacity>,
}

impl QueryOutput {
    /// An output with the given items and no metadata beyond the counts.
    pub fn from_items(items: Vec<Item>) -> Self {
        let count = items.len();
        Self {
            items,
            count,
            scanned_count: count,
            last_evaluated_key: None,
            consumed_capacity: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
