//! JSON fixtures for the in-memory table.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use dynaquery_core::storage::{KeySchema, QueryError};
use dynaquery_core::value::Item;

use super::InMemoryTable;

/// Errors raised while loading a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid fixture: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid fixture item: {0}")]
    Item(#[from] QueryError),
}

/// A table described as JSON.
///
/// ```json
/// {
///   "table": "carts",
///   "key_schema": { "partition_key": "pk", "sort_key": "sk" },
///   "indexes": { "by-name": { "partition_key": "name" } },
///   "items": [{ "pk": "id#1", "sk": "cart#1", "name": "SomeName" }]
/// }
/// ```
///
/// Items are plain JSON: numbers become `N`, arrays `L` and objects `M`.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub table: Option<String>,
    pub key_schema: KeySchema,
    #[serde(default)]
    pub indexes: BTreeMap<String, KeySchema>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Fixture {
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FixtureError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json(&json)
    }

    /// Loads the fixture into a table. The table takes the fixture's name, or
    /// `default_name` when the fixture has none.
    pub async fn into_table(self, default_name: &str) -> Result<InMemoryTable, FixtureError> {
        let name = self.table.unwrap_or_else(|| default_name.to_string());
        let table = self
            .indexes
            .into_iter()
            .fold(InMemoryTable::new(name, self.key_schema), |table, (index, schema)| {
                table.with_index(index, schema)
            });
        table.put_items(self.items).await?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARTS: &str = r#"{
        "table": "carts",
        "key_schema": {"partition_key": "pk", "sort_key": "sk"},
        "indexes": {"by-name": {"partition_key": "name"}},
        "items": [
            {"pk": "id#1", "sk": "cart#1", "name": "SomeName"},
            {"pk": "id#1", "sk": "order#1", "name": "SomeName"}
        ]
    }"#;

    #[tokio::test]
    async fn test_fixture_into_table() {
        let table = Fixture::from_json(CARTS)
            .unwrap()
            .into_table("ignored")
            .await
            .unwrap();

        assert_eq!(table.name(), "carts");
        assert_eq!(table.key_schema(), &KeySchema::composite("pk", "sk"));
        assert_eq!(table.len().await, 2);
    }

    #[tokio::test]
    async fn test_fixture_without_name_uses_default() {
        let fixture = Fixture::from_json(r#"{"key_schema": {"partition_key": "id"}}"#).unwrap();
        let table = fixture.into_table("things").await.unwrap();

        assert_eq!(table.name(), "things");
        assert!(table.is_empty().await);
    }

    #[tokio::test]
    async fn test_fixture_item_without_key_is_rejected() {
        let fixture = Fixture::from_json(
            r#"{"key_schema": {"partition_key": "id"}, "items": [{"name": "x"}]}"#,
        )
        .unwrap();

        let result = fixture.into_table("things").await;
        assert!(matches!(result, Err(FixtureError::Item(_))));
    }

    #[test]
    fn test_malformed_fixture() {
        let result = Fixture::from_json(r#"{"items": []}"#);
        assert!(matches!(result, Err(FixtureError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = Fixture::from_path("/nonexistent/fixture.json").await;
        assert!(matches!(result, Err(FixtureError::Read { .. })));
    }
}
