//! DynamoDB table implementation.

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use tracing::debug;

use dynaquery_core::query::{GetItemRequest, QueryRequest, ScanRequest};
use dynaquery_core::storage::{GetItemOutput, QueryOutput, QueryTable, Result};

use super::conversions::{
    item_output, item_to_attributes, limit, page_to_output, placeholder_values,
    return_consumed_capacity,
};
use super::error::{map_get_item_error, map_query_error, map_scan_error};
use crate::config::{create_client, Config};

/// A DynamoDB table reached through the AWS SDK.
///
/// The table name travels with each request, so one instance serves every
/// table the credentials can read.
#[derive(Debug, Clone)]
pub struct DynamoDbTable {
    client: Client,
}

impl DynamoDbTable {
    /// Creates a table backend around an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a table backend from configuration, using the AWS SDK default
    /// credential chain.
    pub async fn from_config(config: &Config) -> Self {
        Self::new(create_client(config).await)
    }
}

#[async_trait]
impl QueryTable for DynamoDbTable {
    async fn query(&self, request: &QueryRequest) -> Result<QueryOutput> {
        let expressions = request.compile();
        debug!(
            table = request.table_name(),
            index = request.index_name(),
            key_condition = expressions.key_condition.as_deref(),
            filter = expressions.filter.as_deref(),
            projection = expressions.projection.as_deref(),
            "sending query"
        );

        let output = self
            .client
            .query()
            .table_name(request.table_name())
            .set_index_name(request.index_name().map(str::to_string))
            .set_key_condition_expression(expressions.key_condition)
            .set_filter_expression(expressions.filter)
            .set_projection_expression(expressions.projection)
            .set_expression_attribute_names(
                expressions.attribute_names.map(|names| names.into_iter().collect()),
            )
            .set_expression_attribute_values(expressions.attribute_values.map(placeholder_values))
            .set_limit(request.limit().map(limit))
            .scan_index_forward(request.scan_index_forward())
            .consistent_read(request.consistent_read())
            .set_return_consumed_capacity(
                request.return_consumed_capacity().map(return_consumed_capacity),
            )
            .send()
            .await
            .map_err(|e| map_query_error(e, request.table_name()))?;

        let page = page_to_output(
            output.items(),
            output.count(),
            output.scanned_count(),
            output.last_evaluated_key(),
            output.consumed_capacity(),
        )?;
        debug!(
            table = request.table_name(),
            count = page.count,
            scanned_count = page.scanned_count,
            "query complete"
        );
        Ok(page)
    }

    async fn scan(&self, request: &ScanRequest) -> Result<QueryOutput> {
        let expressions = request.compile();
        debug!(
            table = request.table_name(),
            index = request.index_name(),
            filter = expressions.filter.as_deref(),
            projection = expressions.projection.as_deref(),
            "sending scan"
        );

        let output = self
            .client
            .scan()
            .table_name(request.table_name())
            .set_index_name(request.index_name().map(str::to_string))
            .set_filter_expression(expressions.filter)
            .set_projection_expression(expressions.projection)
            .set_expression_attribute_names(
                expressions.attribute_names.map(|names| names.into_iter().collect()),
            )
            .set_expression_attribute_values(expressions.attribute_values.map(placeholder_values))
            .set_limit(request.limit().map(limit))
            .consistent_read(request.consistent_read())
            .set_return_consumed_capacity(
                request.return_consumed_capacity().map(return_consumed_capacity),
            )
            .send()
            .await
            .map_err(|e| map_scan_error(e, request.table_name()))?;

        let page = page_to_output(
            output.items(),
            output.count(),
            output.scanned_count(),
            output.last_evaluated_key(),
            output.consumed_capacity(),
        )?;
        debug!(
            table = request.table_name(),
            count = page.count,
            scanned_count = page.scanned_count,
            "scan complete"
        );
        Ok(page)
    }

    async fn get_item(&self, request: &GetItemRequest) -> Result<GetItemOutput> {
        let expressions = request.compile();
        debug!(
            table = request.table_name(),
            projection = expressions.projection.as_deref(),
            "sending get-item"
        );

        let output = self
            .client
            .get_item()
            .table_name(request.table_name())
            .set_key(Some(item_to_attributes(request.key())))
            .set_projection_expression(expressions.projection)
            .set_expression_attribute_names(
                expressions.attribute_names.map(|names| names.into_iter().collect()),
            )
            .consistent_read(request.consistent_read())
            .set_return_consumed_capacity(
                request.return_consumed_capacity().map(return_consumed_capacity),
            )
            .send()
            .await
            .map_err(|e| map_get_item_error(e, request.table_name()))?;

        let result = item_output(output.item(), output.consumed_capacity())?;
        debug!(
            table = request.table_name(),
            found = result.item.is_some(),
            "get-item complete"
        );
        Ok(result)
    }
}
