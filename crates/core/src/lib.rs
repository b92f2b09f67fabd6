//! Functional core for key-condition queries against DynamoDB-style tables.
//!
//! Everything in this crate is pure: attribute values, predicate trees, request
//! validation, expression compilation and in-process evaluation. Talking to a
//! store happens behind the [`storage::QueryTable`] trait, implemented in the
//! `dynaquery` crate.

pub mod condition;
pub mod query;
pub mod storage;
pub mod value;
