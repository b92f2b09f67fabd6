//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between `AttributeValue` maps and
//! `dynaquery_core` values. These are testable in isolation without DynamoDB
//! access.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::{
    AttributeValue, ConsumedCapacity as SdkConsumedCapacity,
    ReturnConsumedCapacity as SdkReturnConsumedCapacity,
};
use dynaquery_core::storage::{
    ConsumedCapacity, GetItemOutput, QueryError, QueryOutput, ReturnConsumedCapacity,
};
use dynaquery_core::value::{Item, Value};

/// Convert a value to a DynamoDB attribute value.
pub fn value_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::N(n) => AttributeValue::N(n.clone()),
        Value::S(s) => AttributeValue::S(s.clone()),
        Value::B(bytes) => AttributeValue::B(Blob::new(bytes.clone())),
        Value::L(list) => AttributeValue::L(list.iter().map(value_to_attribute).collect()),
        Value::M(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_attribute(v)))
                .collect(),
        ),
        Value::Ss(set) => AttributeValue::Ss(set.iter().cloned().collect()),
        Value::Ns(set) => AttributeValue::Ns(set.iter().cloned().collect()),
        Value::Bs(set) => AttributeValue::Bs(set.iter().cloned().map(Blob::new).collect()),
    }
}

/// Convert a DynamoDB attribute value to a value.
pub fn attribute_to_value(attribute: &AttributeValue) -> Result<Value, QueryError> {
    Ok(match attribute {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::N(n) => Value::N(n.clone()),
        AttributeValue::S(s) => Value::S(s.clone()),
        AttributeValue::B(blob) => Value::B(blob.as_ref().to_vec()),
        AttributeValue::L(list) => Value::L(
            list.iter()
                .map(attribute_to_value)
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::M(map) => Value::M(attributes_to_item(map)?),
        AttributeValue::Ss(set) => Value::Ss(set.iter().cloned().collect()),
        AttributeValue::Ns(set) => Value::Ns(set.iter().cloned().collect()),
        AttributeValue::Bs(set) => Value::Bs(set.iter().map(|b| b.as_ref().to_vec()).collect()),
        other => {
            return Err(QueryError::Serialization(format!(
                "unsupported attribute value: {other:?}"
            )))
        }
    })
}

/// Convert an item to a DynamoDB attribute map.
pub fn item_to_attributes(item: &Item) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(k, v)| (k.clone(), value_to_attribute(v)))
        .collect()
}

/// Convert a DynamoDB attribute map to an item.
pub fn attributes_to_item(attributes: &HashMap<String, AttributeValue>) -> Result<Item, QueryError> {
    attributes
        .iter()
        .map(|(k, v)| Ok((k.clone(), attribute_to_value(v)?)))
        .collect()
}

/// Convert expression placeholder values to the SDK's attribute map.
pub fn placeholder_values(values: BTreeMap<String, Value>) -> HashMap<String, AttributeValue> {
    values
        .into_iter()
        .map(|(k, v)| (k, value_to_attribute(&v)))
        .collect()
}

pub fn return_consumed_capacity(mode: ReturnConsumedCapacity) -> SdkReturnConsumedCapacity {
    match mode {
        ReturnConsumedCapacity::Indexes => SdkReturnConsumedCapacity::Indexes,
        ReturnConsumedCapacity::Total => SdkReturnConsumedCapacity::Total,
        ReturnConsumedCapacity::None => SdkReturnConsumedCapacity::None,
    }
}

/// Clamp a page size to the SDK's `i32`.
pub fn limit(limit: u32) -> i32 {
    i32::try_from(limit).unwrap_or(i32::MAX)
}

pub fn consumed_capacity(capacity: &SdkConsumedCapacity) -> ConsumedCapacity {
    ConsumedCapacity {
        table_name: capacity.table_name().map(str::to_string),
        capacity_units: capacity.capacity_units(),
    }
}

/// Assemble a page from the parts shared by the Query and Scan outputs.
pub fn page_to_output(
    items: &[HashMap<String, AttributeValue>],
    count: i32,
    scanned_count: i32,
    last_evaluated_key: Option<&HashMap<String, AttributeValue>>,
    consumed_capacity: Option<&SdkConsumedCapacity>,
) -> Result<QueryOutput, QueryError> {
    let items = items
        .iter()
        .map(attributes_to_item)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QueryOutput {
        items,
        count: usize::try_from(count).unwrap_or_default(),
        scanned_count: usize::try_from(scanned_count).unwrap_or_default(),
        last_evaluated_key: last_evaluated_key.map(attributes_to_item).transpose()?,
        consumed_capacity: consumed_capacity.map(self::consumed_capacity),
    })
}

/// Assemble a GetItem result. An absent item is not an error.
pub fn item_output(
    item: Option<&HashMap<String, AttributeValue>>,
    consumed_capacity: Option<&SdkConsumedCapacity>,
) -> Result<GetItemOutput, QueryError> {
    Ok(GetItemOutput {
        item: item.map(attributes_to_item).transpose()?,
        consumed_capacity: consumed_capacity.map(self::consumed_capacity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(
            value_to_attribute(&Value::from("id#1")),
            AttributeValue::S("id#1".to_string())
        );
        assert_eq!(
            value_to_attribute(&Value::from(42)),
            AttributeValue::N("42".to_string())
        );
        assert_eq!(value_to_attribute(&Value::Null), AttributeValue::Null(true));
        assert_eq!(
            attribute_to_value(&AttributeValue::Bool(true)).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_binary_and_sets() {
        let blob = AttributeValue::B(Blob::new(vec![1, 2, 3]));
        assert_eq!(attribute_to_value(&blob).unwrap(), Value::binary([1, 2, 3]));

        let set = value_to_attribute(&Value::string_set(["b", "a"]));
        let AttributeValue::Ss(members) = set else {
            panic!("expected a string set");
        };
        assert_eq!(members, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_nested_item() {
        let item: Item = serde_json::from_value(serde_json::json!({
            "pk": "id#1",
            "address": {"city": "Lisbon", "zip": [1, 2]}
        }))
        .unwrap();

        let attributes = item_to_attributes(&item);
        let AttributeValue::M(address) = &attributes["address"] else {
            panic!("expected a map");
        };
        assert_eq!(address["city"], AttributeValue::S("Lisbon".to_string()));

        assert_eq!(attributes_to_item(&attributes).unwrap(), item);
    }

    #[test]
    fn test_limit_clamps() {
        assert_eq!(limit(25), 25);
        assert_eq!(limit(u32::MAX), i32::MAX);
    }

    #[test]
    fn test_page_to_output() {
        let items = vec![HashMap::from([(
            "pk".to_string(),
            AttributeValue::S("id#1".to_string()),
        )])];
        let key = items[0].clone();
        let capacity = SdkConsumedCapacity::builder()
            .table_name("carts")
            .capacity_units(0.5)
            .build();

        let output = page_to_output(&items, 1, 3, Some(&key), Some(&capacity)).unwrap();

        assert_eq!(output.count, 1);
        assert_eq!(output.scanned_count, 3);
        assert_eq!(output.items[0]["pk"], Value::from("id#1"));
        assert!(output.last_evaluated_key.is_some());
        assert_eq!(
            output.consumed_capacity,
            Some(ConsumedCapacity {
                table_name: Some("carts".to_string()),
                capacity_units: Some(0.5),
            })
        );
    }

    #[test]
    fn test_item_output_without_item() {
        let output = item_output(None, None).unwrap();
        assert_eq!(output, GetItemOutput::default());

        let found = HashMap::from([("pk".to_string(), AttributeValue::S("id#1".to_string()))]);
        let output = item_output(Some(&found), None).unwrap();
        assert_eq!(output.item.unwrap()["pk"], Value::from("id#1"));
    }
}
