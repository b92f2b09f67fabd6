//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `QueryError` from `dynaquery_core::storage`. The
//! service's own message travels with every variant.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::query::QueryError as SdkQueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use dynaquery_core::storage::QueryError;

/// Map a Query SDK error to QueryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<SdkQueryError, R>,
    table: &str,
) -> QueryError {
    if let Some(error) = map_transport_error(&err) {
        return error;
    }
    let context = DisplayErrorContext(&err).to_string();
    let err = err.into_service_error();
    let message = service_message(&err, context);
    match err {
        SdkQueryError::ResourceNotFoundException(_) => QueryError::TableNotFound {
            table: table.to_string(),
            message,
        },
        SdkQueryError::ProvisionedThroughputExceededException(_)
        | SdkQueryError::RequestLimitExceeded(_) => QueryError::Throttled(message),
        SdkQueryError::InternalServerError(_) => QueryError::Service(message),
        err => map_error_code(err.code(), &message),
    }
}

/// Map a Scan SDK error to QueryError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
    table: &str,
) -> QueryError {
    if let Some(error) = map_transport_error(&err) {
        return error;
    }
    let context = DisplayErrorContext(&err).to_string();
    let err = err.into_service_error();
    let message = service_message(&err, context);
    match err {
        ScanError::ResourceNotFoundException(_) => QueryError::TableNotFound {
            table: table.to_string(),
            message,
        },
        ScanError::ProvisionedThroughputExceededException(_) | ScanError::RequestLimitExceeded(_) => {
            QueryError::Throttled(message)
        }
        ScanError::InternalServerError(_) => QueryError::Service(message),
        err => map_error_code(err.code(), &message),
    }
}

/// Map a GetItem SDK error to QueryError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
    table: &str,
) -> QueryError {
    if let Some(error) = map_transport_error(&err) {
        return error;
    }
    let context = DisplayErrorContext(&err).to_string();
    let err = err.into_service_error();
    let message = service_message(&err, context);
    match err {
        GetItemError::ResourceNotFoundException(_) => QueryError::TableNotFound {
            table: table.to_string(),
            message,
        },
        GetItemError::ProvisionedThroughputExceededException(_)
        | GetItemError::RequestLimitExceeded(_) => QueryError::Throttled(message),
        GetItemError::InternalServerError(_) => QueryError::Service(message),
        err => map_error_code(err.code(), &message),
    }
}

/// The service's message, or the whole error chain when it sent none.
fn service_message(err: &impl ProvideErrorMetadata, context: String) -> String {
    err.message().map(str::to_string).unwrap_or(context)
}

/// Failures that never reached the service.
fn map_transport_error<E, R>(err: &SdkError<E, R>) -> Option<QueryError>
where
    E: std::error::Error + 'static,
    R: Debug,
{
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => Some(
            QueryError::ConnectionFailed(DisplayErrorContext(err).to_string()),
        ),
        SdkError::ConstructionFailure(_) => Some(QueryError::InvalidRequest(format!(
            "Request could not be built: {}",
            DisplayErrorContext(err)
        ))),
        _ => None,
    }
}

/// Map the error codes the SDK does not model for these operations.
pub fn map_error_code(code: Option<&str>, message: &str) -> QueryError {
    match code {
        Some("ValidationException") => QueryError::InvalidRequest(message.to_string()),
        Some(
            "AccessDeniedException"
            | "UnrecognizedClientException"
            | "MissingAuthenticationTokenException"
            | "InvalidSignatureException"
            | "ExpiredTokenException",
        ) => QueryError::AccessDenied(message.to_string()),
        Some("ThrottlingException") => QueryError::Throttled(message.to_string()),
        Some(code) => QueryError::Service(format!("{code}: {message}")),
        None => QueryError::Service(message.to_string()),
    }
}
