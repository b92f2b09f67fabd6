//! Imperative shell for `dynaquery_core`: table backends and configuration.
//!
//! ```no_run
//! use dynaquery::config::Config;
//! use dynaquery::storage::DynamoDbTable;
//! use dynaquery_core::condition::Condition;
//! use dynaquery_core::query::QueryRequest;
//! use dynaquery_core::storage::QueryTable;
//!
//! # async fn run() -> dynaquery_core::storage::Result<()> {
//! let table = DynamoDbTable::from_config(&Config::from_env()).await;
//! let request = QueryRequest::builder("carts")
//!     .key_condition(Condition::eq("pk", "id#1").and(Condition::begins_with("sk", "cart#")))
//!     .filter(Condition::eq("name", "SomeName"))
//!     .build()?;
//! let output = table.query(&request).await?;
//! println!("{} items", output.count);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod storage;
