//! Storage backends implementing
//! [`QueryTable`](dynaquery_core::storage::QueryTable).
//!
//! - [`dynamodb`]: Amazon DynamoDB through `aws-sdk-dynamodb`
//! - [`inmemory`]: a local table for tests and JSON fixtures

pub mod dynamodb;
pub mod inmemory;

pub use dynamodb::DynamoDbTable;
pub use inmemory::{Fixture, InMemoryTable};
