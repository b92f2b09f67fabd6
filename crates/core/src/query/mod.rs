//! Request types for the read operations.

mod key_condition;
mod request;

pub use key_condition::KeyCondition;
pub use request::{
    GetItemRequest, GetItemRequestBuilder, QueryRequest, QueryRequestBuilder, ScanRequest,
    ScanRequestBuilder,
};
