//! Query, scan and get-item requests.
//!
//! Requests are assembled with a builder and validated once in `build`, so a
//! backend only ever sees a well-formed request.

use crate::condition::{AttributePath, Condition, ExpressionContext, Expressions};
use crate::storage::{QueryError, Result, ReturnConsumedCapacity};
use crate::value::{Item, Value};

use super::KeyCondition;

/// A validated key-condition query against one table or index.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    table_name: String,
    index_name: Option<String>,
    key_condition: KeyCondition,
    filter: Option<Condition>,
    projection: Vec<AttributePath>,
    limit: Option<u32>,
    scan_index_forward: bool,
    consistent_read: bool,
    return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

impl QueryRequest {
    pub fn builder(table_name: impl Into<String>) -> QueryRequestBuilder {
        QueryRequestBuilder::new(table_name)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn key_condition(&self) -> &KeyCondition {
        &self.key_condition
    }

    pub fn filter(&self) -> Option<&Condition> {
        self.filter.as_ref()
    }

    pub fn projection(&self) -> &[AttributePath] {
        &self.projection
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// `false` when items come back in descending sort-key order.
    pub fn scan_index_forward(&self) -> bool {
        self.scan_index_forward
    }

    pub fn consistent_read(&self) -> bool {
        self.consistent_read
    }

    pub fn return_consumed_capacity(&self) -> Option<ReturnConsumedCapacity> {
        self.return_consumed_capacity
    }

    /// Renders the key condition, filter and projection with one shared set
    /// of placeholders.
    pub fn compile(&self) -> Expressions {
        let mut ctx = ExpressionContext::new();
        let key_condition = ctx.condition(&self.key_condition.to_condition());
        let filter = self.filter.as_ref().map(|f| ctx.condition(f));
        let projection = (!self.projection.is_empty()).then(|| ctx.projection(&self.projection));
        let (attribute_names, attribute_values) = ctx.finish();

        Expressions {
            key_condition: Some(key_condition),
            filter,
            projection,
            attribute_names,
            attribute_values,
        }
    }
}

/// Builder for [`QueryRequest`].
#[derive(Debug, Clone)]
pub struct QueryRequestBuilder {
    table_name: String,
    index_name: Option<String>,
    key_condition: Option<Condition>,
    filter: Option<Condition>,
    projection: Vec<AttributePath>,
    limit: Option<u32>,
    scan_index_forward: bool,
    consistent_read: bool,
    return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

impl QueryRequestBuilder {
    fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: None,
            key_condition: None,
            filter: None,
            projection: Vec::new(),
            limit: None,
            scan_index_forward: true,
            consistent_read: false,
            return_consumed_capacity: None,
        }
    }

    /// Query a secondary index instead of the base table.
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn key_condition(mut self, condition: Condition) -> Self {
        self.key_condition = Some(condition);
        self
    }

    /// Sets the filter, replacing any previous one. Combine conditions with
    /// [`Condition::and`] to filter on several attributes.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(condition);
        self
    }

    pub fn projection<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<AttributePath>,
    {
        self.projection = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Maximum number of items to read, counted before the filter.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn descending(self) -> Self {
        self.scan_index_forward(false)
    }

    pub fn scan_index_forward(mut self, forward: bool) -> Self {
        self.scan_index_forward = forward;
        self
    }

    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = consistent;
        self
    }

    pub fn return_consumed_capacity(mut self, mode: ReturnConsumedCapacity) -> Self {
        self.return_consumed_capacity = Some(mode);
        self
    }

    pub fn build(self) -> Result<QueryRequest> {
        check_target(&self.table_name, self.index_name.as_deref())?;

        let condition = self.key_condition.ok_or(QueryError::MissingKeyCondition)?;
        let key_condition = KeyCondition::try_from(condition)?;

        if let Some(filter) = &self.filter {
            check_filter(filter)?;
            let key_names: Vec<&str> = key_condition.attribute_names().collect();
            if let Some(name) = filter
                .paths()
                .filter_map(AttributePath::root)
                .find(|name| key_names.contains(name))
            {
                return Err(QueryError::InvalidRequest(format!(
                    "filter cannot reference key attribute '{name}'"
                )));
            }
        }

        check_projection(&self.projection)?;
        check_limit(self.limit)?;

        Ok(QueryRequest {
            table_name: self.table_name,
            index_name: self.index_name,
            key_condition,
            filter: self.filter,
            projection: self.projection,
            limit: self.limit,
            scan_index_forward: self.scan_index_forward,
            consistent_read: self.consistent_read,
            return_consumed_capacity: self.return_consumed_capacity,
        })
    }
}

/// A filter-only read of a whole table or index.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    table_name: String,
    index_name: Option<String>,
    filter: Option<Condition>,
    projection: Vec<AttributePath>,
    limit: Option<u32>,
    consistent_read: bool,
    return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

impl ScanRequest {
    pub fn builder(table_name: impl Into<String>) -> ScanRequestBuilder {
        ScanRequestBuilder {
            table_name: table_name.into(),
            index_name: None,
            filter: None,
            projection: Vec::new(),
            limit: None,
            consistent_read: false,
            return_consumed_capacity: None,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn filter(&self) -> Option<&Condition> {
        self.filter.as_ref()
    }

    pub fn projection(&self) -> &[AttributePath] {
        &self.projection
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn consistent_read(&self) -> bool {
        self.consistent_read
    }

    pub fn return_consumed_capacity(&self) -> Option<ReturnConsumedCapacity> {
        self.return_consumed_capacity
    }

    pub fn compile(&self) -> Expressions {
        let mut ctx = ExpressionContext::new();
        let filter = self.filter.as_ref().map(|f| ctx.condition(f));
        let projection = (!self.projection.is_empty()).then(|| ctx.projection(&self.projection));
        let (attribute_names, attribute_values) = ctx.finish();

        Expressions {
            key_condition: None,
            filter,
            projection,
            attribute_names,
            attribute_values,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanRequestBuilder {
    table_name: String,
    index_name: Option<String>,
    filter: Option<Condition>,
    projection: Vec<AttributePath>,
    limit: Option<u32>,
    consistent_read: bool,
    return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

impl ScanRequestBuilder {
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(condition);
        self
    }

    pub fn projection<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<AttributePath>,
    {
        self.projection = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = consistent;
        self
    }

    pub fn return_consumed_capacity(mut self, mode: ReturnConsumedCapacity) -> Self {
        self.return_consumed_capacity = Some(mode);
        self
    }

    pub fn build(self) -> Result<ScanRequest> {
        check_target(&self.table_name, self.index_name.as_deref())?;
        if let Some(filter) = &self.filter {
            check_filter(filter)?;
        }
        check_projection(&self.projection)?;
        check_limit(self.limit)?;

        Ok(ScanRequest {
            table_name: self.table_name,
            index_name: self.index_name,
            filter: self.filter,
            projection: self.projection,
            limit: self.limit,
            consistent_read: self.consistent_read,
            return_consumed_capacity: self.return_consumed_capacity,
        })
    }
}

/// A read of the one item with the given primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct GetItemRequest {
    table_name: String,
    key: Item,
    projection: Vec<AttributePath>,
    consistent_read: bool,
    return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

impl GetItemRequest {
    pub fn builder(table_name: impl Into<String>) -> GetItemRequestBuilder {
        GetItemRequestBuilder {
            table_name: table_name.into(),
            key: Item::new(),
            projection: Vec::new(),
            consistent_read: false,
            return_consumed_capacity: None,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The primary key attributes: the partition key and, for composite
    /// tables, the sort key.
    pub fn key(&self) -> &Item {
        &self.key
    }

    pub fn projection(&self) -> &[AttributePath] {
        &self.projection
    }

    pub fn consistent_read(&self) -> bool {
        self.consistent_read
    }

    pub fn return_consumed_capacity(&self) -> Option<ReturnConsumedCapacity> {
        self.return_consumed_capacity
    }

    /// Only the projection is an expression; the key is sent as values.
    pub fn compile(&self) -> Expressions {
        let mut ctx = ExpressionContext::new();
        let projection = (!self.projection.is_empty()).then(|| ctx.projection(&self.projection));
        let (attribute_names, _) = ctx.finish();

        Expressions {
            projection,
            attribute_names,
            ..Expressions::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct GetItemRequestBuilder {
    table_name: String,
    key: Item,
    projection: Vec<AttributePath>,
    consistent_read: bool,
    return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

impl GetItemRequestBuilder {
    /// Adds one key attribute. Call once for the partition key and once more
    /// for the sort key of a composite table.
    pub fn key(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.key.insert(name.into(), value.into());
        self
    }

    pub fn projection<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<AttributePath>,
    {
        self.projection = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = consistent;
        self
    }

    pub fn return_consumed_capacity(mut self, mode: ReturnConsumedCapacity) -> Self {
        self.return_consumed_capacity = Some(mode);
        self
    }

    pub fn build(self) -> Result<GetItemRequest> {
        check_target(&self.table_name, None)?;
        check_key(&self.key)?;
        check_projection(&self.projection)?;

        Ok(GetItemRequest {
            table_name: self.table_name,
            key: self.key,
            projection: self.projection,
            consistent_read: self.consistent_read,
            return_consumed_capacity: self.return_consumed_capacity,
        })
    }
}

/// A primary key has one or two attributes, each a string, number or binary.
fn check_key(key: &Item) -> Result<()> {
    if key.is_empty() {
        return Err(QueryError::MissingKeyCondition);
    }
    if key.len() > 2 {
        return Err(QueryError::InvalidKeyCondition(
            "a key takes a partition key and at most one sort key".to_string(),
        ));
    }
    for (name, value) in key {
        if name.trim().is_empty() {
            return Err(QueryError::InvalidKeyCondition(
                "key attribute names cannot be empty".to_string(),
            ));
        }
        if !value.is_key_type() {
            return Err(QueryError::InvalidKeyCondition(format!(
                "key attribute '{name}' must be S, N or B, got {}",
                value.attribute_type()
            )));
        }
    }
    Ok(())
}

fn check_target(table_name: &str, index_name: Option<&str>) -> Result<()> {
    if table_name.trim().is_empty() {
        return Err(QueryError::InvalidRequest(
            "table name cannot be empty".to_string(),
        ));
    }
    if index_name.is_some_and(|name| name.trim().is_empty()) {
        return Err(QueryError::InvalidRequest(
            "index name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn check_filter(filter: &Condition) -> Result<()> {
    filter
        .validate()
        .map_err(|e| QueryError::InvalidRequest(format!("invalid filter: {e}")))
}

fn check_projection(projection: &[AttributePath]) -> Result<()> {
    projection
        .iter()
        .try_for_each(AttributePath::validate)
        .map_err(|e| QueryError::InvalidRequest(format!("invalid projection: {e}")))
}

fn check_limit(limit: Option<u32>) -> Result<()> {
    match limit {
        Some(0) => Err(QueryError::InvalidRequest(
            "limit must be at least 1".to_string(),
        )),
        _ => Ok(()),
    }
}
