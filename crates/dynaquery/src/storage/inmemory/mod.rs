//! In-memory storage backend.
//!
//! [`InMemoryTable`] answers queries and scans locally. It backs the test
//! suite and the `--fixture` option of the command line.

mod fixture;
mod table;

pub use fixture::{Fixture, FixtureError};
pub use table::InMemoryTable;
