//! Compilation of conditions into expression strings with placeholders.
//!
//! Attribute names become `#n<i>` placeholders, de-duplicated per name for the
//! whole request, and literal values become `:v<i>` placeholders in visit
//! order. Sharing one [`ExpressionContext`] across the key condition, the
//! filter and the projection keeps the placeholders of a request disjoint.

use std::collections::{BTreeMap, HashMap};

use super::{AttributePath, Condition, PathSegment};
use crate::value::Value;

/// Everything a request sends besides its scalar parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expressions {
    pub key_condition: Option<String>,
    pub filter: Option<String>,
    pub projection: Option<String>,
    /// `None` when no names were used.
    pub attribute_names: Option<BTreeMap<String, String>>,
    /// `None` when no values were used.
    pub attribute_values: Option<BTreeMap<String, Value>>,
}

/// Accumulates placeholders while expressions are rendered.
#[derive(Debug, Default)]
pub struct ExpressionContext {
    names: BTreeMap<String, String>,
    placeholders_by_name: HashMap<String, String>,
    values: BTreeMap<String, Value>,
}

impl ExpressionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the placeholder for an attribute name, allocating one on first use.
    pub fn name(&mut self, name: &str) -> String {
        if let Some(placeholder) = self.placeholders_by_name.get(name) {
            return placeholder.clone();
        }
        let placeholder = format!("#n{}", self.placeholders_by_name.len());
        self.placeholders_by_name
            .insert(name.to_string(), placeholder.clone());
        self.names.insert(placeholder.clone(), name.to_string());
        placeholder
    }

    /// Returns a fresh placeholder bound to the value.
    pub fn value(&mut self, value: &Value) -> String {
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(placeholder.clone(), value.clone());
        placeholder
    }

    /// Renders a document path with every name replaced by its placeholder.
    pub fn path(&mut self, path: &AttributePath) -> String {
        let mut rendered = String::new();
        for segment in path.segments() {
            match segment {
                PathSegment::Name(name) => {
                    if !rendered.is_empty() {
                        rendered.push('.');
                    }
                    rendered.push_str(&self.name(name));
                }
                PathSegment::Index(idx) => rendered.push_str(&format!("[{idx}]")),
            }
        }
        rendered
    }

    /// Renders a projection list.
    pub fn projection(&mut self, paths: &[AttributePath]) -> String {
        paths
            .iter()
            .map(|p| self.path(p))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders a condition.
    pub fn condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::And(children) => self.logical(children, " AND "),
            Condition::Or(children) => self.logical(children, " OR "),
            Condition::Not(inner) => {
                let inner = self.condition(inner);
                format!("NOT ({inner})")
            }
            Condition::Equals { path, value } => self.binary(path, "=", value),
            Condition::NotEquals { path, value } => self.binary(path, "<>", value),
            Condition::Compare {
                path,
                comparator,
                value,
            } => self.binary(path, comparator.as_str(), value),
            Condition::BeginsWith { path, prefix } => {
                let path = self.path(path);
                let prefix = self.value(prefix);
                format!("begins_with({path}, {prefix})")
            }
            Condition::Between { path, low, high } => {
                let path = self.path(path);
                let low = self.value(low);
                let high = self.value(high);
                format!("{path} BETWEEN {low} AND {high}")
            }
            Condition::In { path, values } => {
                let path = self.path(path);
                let values: Vec<String> = values.iter().map(|v| self.value(v)).collect();
                format!("{path} IN ({})", values.join(", "))
            }
            Condition::Contains { path, operand } => {
                let path = self.path(path);
                let operand = self.value(operand);
                format!("contains({path}, {operand})")
            }
            Condition::Exists { path } => format!("attribute_exists({})", self.path(path)),
            Condition::NotExists { path } => {
                format!("attribute_not_exists({})", self.path(path))
            }
            Condition::IsType {
                path,
                attribute_type,
            } => {
                let path = self.path(path);
                let descriptor = self.value(&Value::from(attribute_type.as_str()));
                format!("attribute_type({path}, {descriptor})")
            }
            Condition::Size {
                path,
                comparator,
                size,
            } => {
                let path = self.path(path);
                let size = self.value(&Value::from(*size));
                format!("size({path}) {comparator} {size}")
            }
        }
    }

    fn binary(&mut self, path: &AttributePath, operator: &str, value: &Value) -> String {
        let path = self.path(path);
        let value = self.value(value);
        format!("{path} {operator} {value}")
    }

    fn logical(&mut self, children: &[Condition], separator: &str) -> String {
        if let [only] = children {
            return self.condition(only);
        }
        children
            .iter()
            .map(|child| {
                let rendered = self.condition(child);
                if is_compound(child) {
                    format!("({rendered})")
                } else {
                    rendered
                }
            })
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Consumes the context, returning the placeholder maps (`None` when empty).
    pub fn finish(
        self,
    ) -> (
        Option<BTreeMap<String, String>>,
        Option<BTreeMap<String, Value>>,
    ) {
        let names = (!self.names.is_empty()).then_some(self.names);
        let values = (!self.values.is_empty()).then_some(self.values);
        (names, values)
    }
}

/// A group renders as its only child, so look through single-child groups.
fn is_compound(condition: &Condition) -> bool {
    match condition {
        Condition::And(children) | Condition::Or(children) => match children.as_slice() {
            [only] => is_compound(only),
            _ => true,
        },
        _ => false,
    }
}
