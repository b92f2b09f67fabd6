mod error;
mod traits;
mod types;

pub use error::{QueryError, Result};
pub use traits::QueryTable;
pub use types::{
    ConsumedCapacity, GetItemOutput, KeySchema, QueryOutput, ReturnConsumedCapacity,
};
