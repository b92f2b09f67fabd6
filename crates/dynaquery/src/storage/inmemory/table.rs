//! In-memory table implementation.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use dynaquery_core::condition::{AttributePath, Condition, PathSegment};
use dynaquery_core::query::{GetItemRequest, KeyCondition, QueryRequest, ScanRequest};
use dynaquery_core::storage::{
    ConsumedCapacity, GetItemOutput, KeySchema, QueryError, QueryOutput, QueryTable, Result,
    ReturnConsumedCapacity,
};
use dynaquery_core::value::{Item, Value};

/// Size of one read capacity unit, in bytes.
const READ_UNIT_BYTES: usize = 4096;

/// Per-request settings applied once items are in read order.
struct PageOptions<'a> {
    filter: Option<&'a Condition>,
    projection: &'a [AttributePath],
    limit: Option<u32>,
    return_consumed_capacity: Option<ReturnConsumedCapacity>,
    consistent_read: bool,
}

/// In-memory table for tests and fixtures.
///
/// Evaluates key conditions and filters locally and rejects the requests the
/// service would reject: a different table name, an unknown index, a key
/// condition that does not fit the key schema, or a filter on a key
/// attribute. Data is not persisted.
#[derive(Debug, Clone)]
pub struct InMemoryTable {
    name: String,
    key_schema: KeySchema,
    indexes: BTreeMap<String, KeySchema>,
    items: Arc<RwLock<Vec<Item>>>,
}

impl InMemoryTable {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>, key_schema: KeySchema) -> Self {
        Self {
            name: name.into(),
            key_schema,
            indexes: BTreeMap::new(),
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Adds a secondary index. Items without the index's key attributes are
    /// left out of it.
    pub fn with_index(mut self, name: impl Into<String>, key_schema: KeySchema) -> Self {
        self.indexes.insert(name.into(), key_schema);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_schema(&self) -> &KeySchema {
        &self.key_schema
    }

    /// Stores an item, replacing any item with the same primary key.
    pub async fn put_item(&self, item: Item) -> Result<()> {
        for name in self.key_schema.attribute_names() {
            match item.get(name) {
                Some(value) if value.is_key_type() => {}
                Some(value) => {
                    return Err(QueryError::InvalidRequest(format!(
                        "key attribute '{name}' must be S, N or B, got {}",
                        value.attribute_type()
                    )))
                }
                None => {
                    return Err(QueryError::InvalidRequest(format!(
                        "item is missing key attribute '{name}'"
                    )))
                }
            }
        }

        let mut items = self.items.write().await;
        match items
            .iter_mut()
            .find(|existing| same_key(&self.key_schema, existing, &item))
        {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        Ok(())
    }

    pub async fn put_items(&self, items: impl IntoIterator<Item = Item>) -> Result<()> {
        for item in items {
            self.put_item(item).await?;
        }
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    fn check_table(&self, table_name: &str) -> Result<()> {
        if table_name == self.name {
            Ok(())
        } else {
            Err(QueryError::TableNotFound {
                table: table_name.to_string(),
                message: "Requested resource not found".to_string(),
            })
        }
    }

    fn schema_for(&self, index_name: Option<&str>) -> Result<&KeySchema> {
        match index_name {
            None => Ok(&self.key_schema),
            Some(name) => self.indexes.get(name).ok_or_else(|| {
                QueryError::InvalidRequest(format!(
                    "table '{}' has no index named '{name}'",
                    self.name
                ))
            }),
        }
    }

    /// Items readable through the schema, in key order.
    fn ordered(&self, items: &[Item], schema: &KeySchema) -> Vec<Item> {
        let mut readable: Vec<Item> = items
            .iter()
            .filter(|item| schema.attribute_names().all(|name| item.contains_key(name)))
            .cloned()
            .collect();
        readable.sort_by(|a, b| {
            compare_keys(schema, a, b).then_with(|| compare_keys(&self.key_schema, a, b))
        });
        readable
    }

    fn consumed_capacity(
        &self,
        mode: Option<ReturnConsumedCapacity>,
        read: &[Item],
        consistent_read: bool,
    ) -> Option<ConsumedCapacity> {
        mode.filter(|mode| *mode != ReturnConsumedCapacity::None)
            .map(|_| ConsumedCapacity {
                table_name: Some(self.name.clone()),
                capacity_units: Some(read_units(read, consistent_read)),
            })
    }

    /// Applies the limit, then the filter and projection, to items already in
    /// read order.
    fn page(&self, read: Vec<Item>, schema: &KeySchema, options: PageOptions<'_>) -> QueryOutput {
        let available = read.len();
        let limit = options.limit.map_or(available, |l| l as usize);
        let read: Vec<Item> = read.into_iter().take(limit).collect();

        let last_evaluated_key = (available > read.len())
            .then(|| read.last().map(|last| self.key_of(schema, last)))
            .flatten();
        let consumed_capacity = self.consumed_capacity(
            options.return_consumed_capacity,
            &read,
            options.consistent_read,
        );
        let scanned_count = read.len();

        let items: Vec<Item> = read
            .into_iter()
            .filter(|item| options.filter.is_none_or(|f| f.matches(item)))
            .map(|item| project(item, options.projection))
            .collect();

        QueryOutput {
            count: items.len(),
            items,
            scanned_count,
            last_evaluated_key,
            consumed_capacity,
        }
    }

    /// The table's primary key plus the index key attributes of an item.
    fn key_of(&self, schema: &KeySchema, item: &Item) -> Item {
        self.key_schema
            .attribute_names()
            .chain(schema.attribute_names())
            .filter_map(|name| Some((name.to_string(), item.get(name)?.clone())))
            .collect()
    }
}

#[async_trait]
impl QueryTable for InMemoryTable {
    async fn query(&self, request: &QueryRequest) -> Result<QueryOutput> {
        self.check_table(request.table_name())?;
        let schema = self.schema_for(request.index_name())?;
        check_key_condition(schema, request.key_condition())?;
        if let Some(filter) = request.filter() {
            check_filter(schema, filter)?;
        }

        let items = self.items.read().await;
        let mut read: Vec<Item> = self
            .ordered(&items, schema)
            .into_iter()
            .filter(|item| request.key_condition().matches(item))
            .collect();
        if !request.scan_index_forward() {
            read.reverse();
        }

        let output = self.page(
            read,
            schema,
            PageOptions {
                filter: request.filter(),
                projection: request.projection(),
                limit: request.limit(),
                return_consumed_capacity: request.return_consumed_capacity(),
                consistent_read: request.consistent_read(),
            },
        );
        debug!(
            table = %self.name,
            count = output.count,
            scanned_count = output.scanned_count,
            "in-memory query complete"
        );
        Ok(output)
    }

    async fn scan(&self, request: &ScanRequest) -> Result<QueryOutput> {
        self.check_table(request.table_name())?;
        let schema = self.schema_for(request.index_name())?;

        let items = self.items.read().await;
        let read = self.ordered(&items, schema);

        let output = self.page(
            read,
            schema,
            PageOptions {
                filter: request.filter(),
                projection: request.projection(),
                limit: request.limit(),
                return_consumed_capacity: request.return_consumed_capacity(),
                consistent_read: request.consistent_read(),
            },
        );
        debug!(
            table = %self.name,
            count = output.count,
            scanned_count = output.scanned_count,
            "in-memory scan complete"
        );
        Ok(output)
    }

    async fn get_item(&self, request: &GetItemRequest) -> Result<GetItemOutput> {
        self.check_table(request.table_name())?;
        check_key(&self.key_schema, request.key())?;

        let items = self.items.read().await;
        let found = items
            .iter()
            .find(|item| same_key(&self.key_schema, item, request.key()))
            .cloned();
        let read: Vec<Item> = found.iter().cloned().collect();

        let consumed_capacity = self.consumed_capacity(
            request.return_consumed_capacity(),
            &read,
            request.consistent_read(),
        );
        debug!(
            table = %self.name,
            found = found.is_some(),
            "in-memory get-item complete"
        );
        Ok(GetItemOutput {
            item: found.map(|item| project(item, request.projection())),
            consumed_capacity,
        })
    }
}

/// Rejects key conditions that do not fit the schema, with the service's wording.
fn check_key_condition(schema: &KeySchema, key_condition: &KeyCondition) -> Result<()> {
    if let Some(name) = key_condition
        .attribute_names()
        .find(|name| !schema.attribute_names().any(|key| key == *name))
    {
        return Err(QueryError::InvalidRequest(format!(
            "Query condition references non-key attribute: {name}"
        )));
    }

    match key_condition.term_for(&schema.partition_key) {
        Some(Condition::Equals { .. }) => Ok(()),
        _ => Err(QueryError::InvalidRequest(format!(
            "Query condition missed key schema element: {}",
            schema.partition_key
        ))),
    }
}

/// Filters cannot reference the primary-key attributes of the table or index
/// being queried, even those the key condition leaves out.
fn check_filter(schema: &KeySchema, filter: &Condition) -> Result<()> {
    match filter
        .paths()
        .filter_map(AttributePath::root)
        .find(|name| schema.attribute_names().any(|key| key == *name))
    {
        Some(name) => Err(QueryError::InvalidRequest(format!(
            "Filter Expression can only contain non-primary key attributes: Primary key attribute: {name}"
        ))),
        None => Ok(()),
    }
}

/// A get-item key names exactly the schema's key attributes.
fn check_key(schema: &KeySchema, key: &Item) -> Result<()> {
    let matches_schema = key.len() == schema.attribute_names().count()
        && schema.attribute_names().all(|name| key.contains_key(name));
    if matches_schema {
        Ok(())
    } else {
        Err(QueryError::InvalidRequest(
            "The provided key element does not match the schema".to_string(),
        ))
    }
}

fn same_key(schema: &KeySchema, a: &Item, b: &Item) -> bool {
    schema
        .attribute_names()
        .all(|name| match (a.get(name), b.get(name)) {
            (Some(x), Some(y)) => x.same_as(y),
            _ => false,
        })
}

fn compare_keys(schema: &KeySchema, a: &Item, b: &Item) -> Ordering {
    schema
        .attribute_names()
        .map(|name| compare_attribute(a.get(name), b.get(name)))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_attribute(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Read units for the items read, rounded up to whole 4 KB units; eventually
/// consistent reads cost half.
fn read_units(items: &[Item], consistent_read: bool) -> f64 {
    let bytes: usize = items.iter().map(item_size).sum();
    let units = bytes.div_ceil(READ_UNIT_BYTES).max(1) as f64;
    if consistent_read {
        units
    } else {
        units / 2.0
    }
}

fn item_size(item: &Item) -> usize {
    item.iter().map(|(name, value)| name.len() + value_size(value)).sum()
}

fn value_size(value: &Value) -> usize {
    match value {
        Value::S(s) => s.len(),
        Value::B(b) => b.len(),
        Value::N(n) => number_size(n),
        Value::Bool(_) | Value::Null => 1,
        Value::L(list) => list.iter().map(value_size).sum::<usize>() + 3,
        Value::M(map) => item_size(map) + 3,
        Value::Ss(set) => set.iter().map(String::len).sum(),
        Value::Ns(set) => set.iter().map(|n| number_size(n)).sum(),
        Value::Bs(set) => set.iter().map(Vec::len).sum(),
    }
}

/// Numbers take one byte per two significant digits, plus one.
fn number_size(n: &str) -> usize {
    n.bytes().filter(u8::is_ascii_digit).count().div_ceil(2) + 1
}

/// Keeps only the projected paths. An empty projection keeps everything.
fn project(item: Item, paths: &[AttributePath]) -> Item {
    if paths.is_empty() {
        return item;
    }

    let mut projected = Item::new();
    for path in paths {
        let Some(value) = path.resolve(&item) else {
            continue;
        };
        let Some((PathSegment::Name(first), rest)) = path.segments().split_first() else {
            continue;
        };
        let slot = projected
            .entry(first.clone())
            .or_insert_with(|| empty_for(rest.first()));
        place(slot, rest, value.clone());
    }
    projected
}

fn empty_for(next: Option<&PathSegment>) -> Value {
    match next {
        Some(PathSegment::Name(_)) => Value::M(BTreeMap::new()),
        Some(PathSegment::Index(_)) => Value::L(Vec::new()),
        None => Value::Null,
    }
}

/// Writes `value` at `rest` below `slot`. List elements are appended in
/// projection order, so projected lists are compacted.
fn place(slot: &mut Value, rest: &[PathSegment], value: Value) {
    match rest.split_first() {
        None => *slot = value,
        Some((PathSegment::Name(name), tail)) => {
            if let Value::M(map) = slot {
                let next = map
                    .entry(name.clone())
                    .or_insert_with(|| empty_for(tail.first()));
                place(next, tail, value);
            }
        }
        Some((PathSegment::Index(_), tail)) => {
            if let Value::L(list) = slot {
                list.push(empty_for(tail.first()));
                if let Some(next) = list.last_mut() {
                    place(next, tail, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynaquery_core::condition::Comparator;
    use serde_json::json;

    fn item(json: serde_json::Value) -> Item {
        serde_json::from_value(json).unwrap()
    }

    async fn carts() -> InMemoryTable {
        let table = InMemoryTable::new("carts", KeySchema::composite("pk", "sk"))
            .with_index("by-name", KeySchema::composite("name", "sk"));
        table
            .put_items([
                item(json!({"pk": "id#1", "sk": "cart#1", "name": "SomeName", "qty": 1})),
                item(json!({"pk": "id#1", "sk": "cart#2", "name": "OtherName", "qty": 2})),
                item(json!({"pk": "id#1", "sk": "order#1", "name": "SomeName", "qty": 3})),
                item(json!({"pk": "id#2", "sk": "cart#1", "name": "SomeName", "qty": 4})),
            ])
            .await
            .unwrap();
        table
    }

    fn cart_key() -> Condition {
        Condition::eq("pk", "id#1").and(Condition::begins_with("sk", "cart#"))
    }

    fn sort_keys(output: &QueryOutput) -> Vec<&str> {
        output
            .items
            .iter()
            .filter_map(|item| item.get("sk")?.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_key_condition_returns_only_matching_sort_keys() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(cart_key())
            .build()
            .unwrap();

        let output = table.query(&request).await.unwrap();

        assert_eq!(sort_keys(&output), vec!["cart#1", "cart#2"]);
        assert_eq!(output.count, 2);
        assert_eq!(output.scanned_count, 2);
        assert!(output.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn test_filter_restricts_results() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(cart_key())
            .filter(Condition::eq("name", "SomeName"))
            .build()
            .unwrap();

        let output = table.query(&request).await.unwrap();

        assert_eq!(sort_keys(&output), vec!["cart#1"]);
        assert_eq!(output.count, 1);
        assert_eq!(output.scanned_count, 2);
    }

    #[tokio::test]
    async fn test_filter_matching_nothing_is_empty_not_error() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(cart_key())
            .filter(Condition::eq("name", "Nobody"))
            .build()
            .unwrap();

        let output = table.query(&request).await.unwrap();

        assert!(output.is_empty());
        assert_eq!(output.count, 0);
        assert_eq!(output.scanned_count, 2);
    }

    #[tokio::test]
    async fn test_without_filter_returns_all_key_matches() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(Condition::eq("pk", "id#1"))
            .build()
            .unwrap();

        let output = table.query(&request).await.unwrap();

        assert_eq!(sort_keys(&output), vec!["cart#1", "cart#2", "order#1"]);
    }

    #[tokio::test]
    async fn test_missing_partition_equality_is_rejected_before_sending() {
        let result = QueryRequest::builder("carts")
            .key_condition(Condition::begins_with("sk", "cart#"))
            .build();

        assert!(matches!(result, Err(QueryError::InvalidKeyCondition(_))));
    }

    #[tokio::test]
    async fn test_unknown_partition_is_empty() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(Condition::eq("pk", "id#404").and(Condition::begins_with("sk", "cart#")))
            .build()
            .unwrap();

        let output = table.query(&request).await.unwrap();

        assert!(output.is_empty());
        assert_eq!(output.scanned_count, 0);
    }

    #[tokio::test]
    async fn test_descending_order() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(Condition::eq("pk", "id#1"))
            .descending()
            .build()
            .unwrap();

        let output = table.query(&request).await.unwrap();

        assert_eq!(sort_keys(&output), vec!["order#1", "cart#2", "cart#1"]);
    }

    #[tokio::test]
    async fn test_limit_applies_before_filter() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(Condition::eq("pk", "id#1"))
            .filter(Condition::eq("name", "OtherName"))
            .limit(1)
            .build()
            .unwrap();

        let output = table.query(&request).await.unwrap();

        assert!(output.is_empty());
        assert_eq!(output.scanned_count, 1);
        assert_eq!(
            output.last_evaluated_key,
            Some(item(json!({"pk": "id#1", "sk": "cart#1"})))
        );
    }

    #[tokio::test]
    async fn test_limit_covering_everything_has_no_last_key() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(cart_key())
            .limit(2)
            .build()
            .unwrap();

        let output = table.query(&request).await.unwrap();

        assert_eq!(output.count, 2);
        assert!(output.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn test_projection() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(cart_key())
            .projection(["name"])
            .build()
            .unwrap();

        let output = table.query(&request).await.unwrap();

        assert_eq!(output.items[0], item(json!({"name": "SomeName"})));
    }

    #[test]
    fn test_nested_projection() {
        let source = item(json!({
            "pk": "id#1",
            "address": {"city": "Lisbon", "zip": "1000"},
            "tags": ["a", "b", "c"]
        }));

        let projected = project(
            source,
            &[
                AttributePath::parse("address.city"),
                AttributePath::parse("tags[2]"),
            ],
        );

        assert_eq!(
            projected,
            item(json!({"address": {"city": "Lisbon"}, "tags": ["c"]}))
        );
    }

    #[tokio::test]
    async fn test_query_on_index() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .index("by-name")
            .key_condition(Condition::eq("name", "SomeName").and(Condition::begins_with("sk", "cart#")))
            .build()
            .unwrap();

        let output = table.query(&request).await.unwrap();

        let partitions: Vec<&str> = output
            .items
            .iter()
            .filter_map(|item| item.get("pk")?.as_str())
            .collect();
        assert_eq!(partitions, vec!["id#1", "id#2"]);
    }

    #[tokio::test]
    async fn test_unknown_index_is_invalid_request() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .index("missing")
            .key_condition(cart_key())
            .build()
            .unwrap();

        let result = table.query(&request).await;

        assert!(matches!(result, Err(QueryError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_other_table_is_not_found() {
        let table = carts().await;
        let request = QueryRequest::builder("orders")
            .key_condition(cart_key())
            .build()
            .unwrap();

        let result = table.query(&request).await;

        assert_eq!(
            result,
            Err(QueryError::TableNotFound {
                table: "orders".to_string(),
                message: "Requested resource not found".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_key_condition_on_non_key_attribute_is_invalid_request() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(Condition::eq("pk", "id#1").and(Condition::begins_with("name", "Some")))
            .build()
            .unwrap();

        let result = table.query(&request).await;

        assert!(matches!(result, Err(QueryError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_equality_on_sort_key_only_is_invalid_request() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(Condition::eq("sk", "cart#1"))
            .build()
            .unwrap();

        let result = table.query(&request).await;

        assert!(matches!(result, Err(QueryError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_put_item_replaces_same_key() {
        let table = carts().await;
        table
            .put_item(item(json!({"pk": "id#1", "sk": "cart#1", "name": "Renamed"})))
            .await
            .unwrap();

        assert_eq!(table.len().await, 4);
    }

    #[tokio::test]
    async fn test_put_item_requires_key_attributes() {
        let table = carts().await;

        let missing = table.put_item(item(json!({"pk": "id#1"}))).await;
        assert!(matches!(missing, Err(QueryError::InvalidRequest(_))));

        let wrong_type = table
            .put_item(item(json!({"pk": "id#1", "sk": true})))
            .await;
        assert!(matches!(wrong_type, Err(QueryError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_put_item_keeps_neighbouring_large_numeric_keys() {
        let table = InMemoryTable::new("events", KeySchema::composite("pk", "sk"));
        for sk in ["1234567890123456788", "1234567890123456789"] {
            let mut event = item(json!({"pk": "stream#1"}));
            event.insert("sk".to_string(), Value::N(sk.to_string()));
            table.put_item(event).await.unwrap();
        }

        assert_eq!(table.len().await, 2);

        let request = QueryRequest::builder("events")
            .key_condition(
                Condition::eq("pk", "stream#1")
                    .and(Condition::eq("sk", Value::N("1234567890123456789".to_string()))),
            )
            .build()
            .unwrap();
        let output = table.query(&request).await.unwrap();
        assert_eq!(output.count, 1);
        assert_eq!(
            output.items[0]["sk"],
            Value::N("1234567890123456789".to_string())
        );
    }

    #[tokio::test]
    async fn test_filter_on_sort_key_left_out_of_key_condition_is_invalid_request() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(Condition::eq("pk", "id#1"))
            .filter(Condition::begins_with("sk", "cart#"))
            .build()
            .unwrap();

        let result = table.query(&request).await;

        assert!(matches!(result, Err(QueryError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_filter_on_index_key_is_invalid_request() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .index("by-name")
            .key_condition(Condition::eq("name", "SomeName"))
            .filter(Condition::eq("sk", "cart#1"))
            .build()
            .unwrap();

        let result = table.query(&request).await;

        assert!(matches!(result, Err(QueryError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_size_filter_skips_numbers() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(cart_key())
            .filter(Condition::size("qty", Comparator::Equal, 1))
            .build()
            .unwrap();

        let output = table.query(&request).await.unwrap();

        assert!(output.is_empty());
        assert_eq!(output.scanned_count, 2);
    }

    #[tokio::test]
    async fn test_get_item_returns_the_item_with_that_key() {
        let table = carts().await;
        let request = GetItemRequest::builder("carts")
            .key("pk", "id#1")
            .key("sk", "cart#2")
            .build()
            .unwrap();

        let output = table.get_item(&request).await.unwrap();

        let found = output.item.unwrap();
        assert_eq!(found["name"], Value::from("OtherName"));
        assert_eq!(found["qty"], Value::from(2));
        assert!(output.consumed_capacity.is_none());
    }

    #[tokio::test]
    async fn test_get_item_missing_is_none_not_error() {
        let table = carts().await;
        let request = GetItemRequest::builder("carts")
            .key("pk", "id#9")
            .key("sk", "cart#1")
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .build()
            .unwrap();

        let output = table.get_item(&request).await.unwrap();

        assert!(output.item.is_none());
        assert_eq!(
            output.consumed_capacity,
            Some(ConsumedCapacity {
                table_name: Some("carts".to_string()),
                capacity_units: Some(0.5),
            })
        );
    }

    #[tokio::test]
    async fn test_get_item_with_projection() {
        let table = carts().await;
        let request = GetItemRequest::builder("carts")
            .key("pk", "id#1")
            .key("sk", "order#1")
            .projection(["qty"])
            .build()
            .unwrap();

        let output = table.get_item(&request).await.unwrap();

        assert_eq!(output.item, Some(item(json!({"qty": 3}))));
    }

    #[tokio::test]
    async fn test_get_item_key_must_match_schema() {
        let table = carts().await;

        let partial = GetItemRequest::builder("carts")
            .key("pk", "id#1")
            .build()
            .unwrap();
        assert!(matches!(
            table.get_item(&partial).await,
            Err(QueryError::InvalidRequest(_))
        ));

        let wrong_names = GetItemRequest::builder("carts")
            .key("pk", "id#1")
            .key("name", "SomeName")
            .build()
            .unwrap();
        assert!(matches!(
            table.get_item(&wrong_names).await,
            Err(QueryError::InvalidRequest(_))
        ));

        let other_table = GetItemRequest::builder("orders")
            .key("pk", "id#1")
            .key("sk", "cart#1")
            .build()
            .unwrap();
        assert!(matches!(
            table.get_item(&other_table).await,
            Err(QueryError::TableNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_scan_with_filter() {
        let table = carts().await;
        let request = ScanRequest::builder("carts")
            .filter(Condition::ge("qty", 3))
            .build()
            .unwrap();

        let output = table.scan(&request).await.unwrap();

        let quantities: Vec<&Value> = output.items.iter().filter_map(|i| i.get("qty")).collect();
        assert_eq!(quantities, vec![&Value::from(3), &Value::from(4)]);
        assert_eq!(output.scanned_count, 4);
    }

    #[tokio::test]
    async fn test_consumed_capacity() {
        let table = carts().await;
        let request = QueryRequest::builder("carts")
            .key_condition(cart_key())
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .build()
            .unwrap();

        let output = table.query(&request).await.unwrap();

        assert_eq!(
            output.consumed_capacity,
            Some(ConsumedCapacity {
                table_name: Some("carts".to_string()),
                capacity_units: Some(0.5),
            })
        );
    }
}
