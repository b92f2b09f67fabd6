//! In-process evaluation of conditions against items.
//!
//! Follows the store's comparison rules: a missing attribute fails every
//! comparison, mismatched types are never equal and never ordered.

use std::cmp::Ordering;

use super::{Comparator, Condition};
use crate::value::{Item, Value};

impl Condition {
    /// Returns whether the item satisfies this condition.
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Self::And(children) => children.iter().all(|c| c.matches(item)),
            Self::Or(children) => children.iter().any(|c| c.matches(item)),
            Self::Not(inner) => !inner.matches(item),
            Self::Exists { path } => path.resolve(item).is_some(),
            Self::NotExists { path } => path.resolve(item).is_none(),
            Self::Equals { path, value } => path.resolve(item).is_some_and(|v| v.same_as(value)),
            Self::NotEquals { path, value } => {
                path.resolve(item).is_some_and(|v| !v.same_as(value))
            }
            Self::Compare {
                path,
                comparator,
                value,
            } => path
                .resolve(item)
                .is_some_and(|v| compare(v, *comparator, value)),
            Self::BeginsWith { path, prefix } => {
                path.resolve(item).is_some_and(|v| begins_with(v, prefix))
            }
            Self::Between { path, low, high } => path.resolve(item).is_some_and(|v| {
                compare(v, Comparator::GreaterOrEqual, low)
                    && compare(v, Comparator::LessOrEqual, high)
            }),
            Self::In { path, values } => path
                .resolve(item)
                .is_some_and(|v| values.iter().any(|candidate| v.same_as(candidate))),
            Self::Contains { path, operand } => {
                path.resolve(item).is_some_and(|v| contains(v, operand))
            }
            Self::IsType {
                path,
                attribute_type,
            } => path
                .resolve(item)
                .is_some_and(|v| v.attribute_type() == *attribute_type),
            Self::Size {
                path,
                comparator,
                size,
            } => path
                .resolve(item)
                .and_then(Value::size)
                .is_some_and(|actual| comparator.holds(actual.cmp(size))),
        }
    }
}

fn compare(left: &Value, comparator: Comparator, right: &Value) -> bool {
    match comparator {
        Comparator::Equal => left.same_as(right),
        Comparator::NotEqual => !left.same_as(right),
        _ => left
            .compare(right)
            .is_some_and(|ordering: Ordering| comparator.holds(ordering)),
    }
}

fn begins_with(value: &Value, prefix: &Value) -> bool {
    match (value, prefix) {
        (Value::S(s), Value::S(p)) => s.starts_with(p.as_str()),
        (Value::B(b), Value::B(p)) => b.starts_with(p),
        _ => false,
    }
}

fn contains(value: &Value, operand: &Value) -> bool {
    match (value, operand) {
        (Value::S(s), Value::S(sub)) => s.contains(sub.as_str()),
        (Value::B(b), Value::B(sub)) => sub.is_empty() || b.windows(sub.len()).any(|w| w == sub),
        (Value::Ss(set), Value::S(member)) => set.contains(member),
        (Value::Ns(set), Value::N(_)) => set
            .iter()
            .any(|n| Value::N(n.clone()).same_as(operand)),
        (Value::Bs(set), Value::B(member)) => set.contains(member),
        (Value::L(list), _) => list.iter().any(|element| element.same_as(operand)),
        _ => false,
    }
}
