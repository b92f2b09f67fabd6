use async_trait::async_trait;

use crate::query::{GetItemRequest, QueryRequest, ScanRequest};

use super::{GetItemOutput, QueryOutput, Result};

/// A table that answers key-condition queries, filtered scans and single-item
/// reads.
///
/// Implementations send exactly one read per call and surface the store's
/// failures as [`QueryError`](super::QueryError) without retrying. An empty
/// result is not an error.
#[async_trait]
pub trait QueryTable: Send + Sync {
    /// Reads the items of one partition that satisfy the key condition and,
    /// when present, the filter.
    async fn query(&self, request: &QueryRequest) -> Result<QueryOutput>;

    /// Reads every item that satisfies the filter, if any.
    async fn scan(&self, request: &ScanRequest) -> Result<QueryOutput>;

    /// Reads the item with exactly the given primary key. A missing item is
    /// `Ok` with `item: None`.
    async fn get_item(&self, request: &GetItemRequest) -> Result<GetItemOutput>;
}
