//! DynamoDB storage backend.
//!
//! Implements [`QueryTable`](dynaquery_core::storage::QueryTable) with
//! `aws-sdk-dynamodb`. Each call is a single `Query`, `Scan` or `GetItem`
//! request; the SDK's own retry policy is the only one applied.

mod conversions;
mod error;
mod table;

pub use conversions::{attribute_to_value, item_to_attributes, value_to_attribute};
pub use table::DynamoDbTable;
