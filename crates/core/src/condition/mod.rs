//! Predicate value objects.
//!
//! A [`Condition`] is a plain tagged tree: leaves compare one attribute path
//! against literal values, branches combine conditions with `AND`, `OR` and
//! `NOT`. The same tree serves as a key condition or a filter; the query
//! builder decides which shapes are accepted where.
//!
//! ```
//! use dynaquery_core::condition::Condition;
//!
//! let key = Condition::eq("pk", "id#1").and(Condition::begins_with("sk", "cart#"));
//! let filter = Condition::eq("name", "SomeName");
//! assert_eq!(key.paths().count(), 2);
//! assert!(filter.validate().is_ok());
//! ```

mod eval;
mod expression;
mod path;

use std::cmp::Ordering;
use std::fmt;

pub use expression::{ExpressionContext, Expressions};
pub use path::{AttributePath, PathSegment};

use crate::value::{AttributeType, Value};

/// Maximum number of operands the store accepts for `IN`.
pub const MAX_IN_OPERANDS: usize = 100;

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Comparator {
    /// The operator as written in an expression.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }

    /// Whether an ordering between left and right operands satisfies this operator.
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::Less => ordering == Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
            Self::Greater => ordering == Ordering::Greater,
            Self::GreaterOrEqual => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicate over an item's attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `path = value`
    Equals { path: AttributePath, value: Value },
    /// `path <> value`
    NotEquals { path: AttributePath, value: Value },
    /// `path <op> value` for the ordering operators.
    Compare {
        path: AttributePath,
        comparator: Comparator,
        value: Value,
    },
    /// `begins_with(path, prefix)`
    BeginsWith { path: AttributePath, prefix: Value },
    /// `path BETWEEN low AND high`, bounds inclusive.
    Between {
        path: AttributePath,
        low: Value,
        high: Value,
    },
    /// `path IN (v1, v2, ...)`
    In { path: AttributePath, values: Vec<Value> },
    /// `contains(path, operand)`
    Contains { path: AttributePath, operand: Value },
    /// `attribute_exists(path)`
    Exists { path: AttributePath },
    /// `attribute_not_exists(path)`
    NotExists { path: AttributePath },
    /// `attribute_type(path, type)`
    IsType {
        path: AttributePath,
        attribute_type: AttributeType,
    },
    /// `size(path) <op> size`
    Size {
        path: AttributePath,
        comparator: Comparator,
        size: usize,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn eq(path: impl Into<AttributePath>, value: impl Into<Value>) -> Self {
        Self::Equals {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn ne(path: impl Into<AttributePath>, value: impl Into<Value>) -> Self {
        Self::NotEquals {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn lt(path: impl Into<AttributePath>, value: impl Into<Value>) -> Self {
        Self::compare(path, Comparator::Less, value)
    }

    pub fn le(path: impl Into<AttributePath>, value: impl Into<Value>) -> Self {
        Self::compare(path, Comparator::LessOrEqual, value)
    }

    pub fn gt(path: impl Into<AttributePath>, value: impl Into<Value>) -> Self {
        Self::compare(path, Comparator::Greater, value)
    }

    pub fn ge(path: impl Into<AttributePath>, value: impl Into<Value>) -> Self {
        Self::compare(path, Comparator::GreaterOrEqual, value)
    }

    /// Any binary comparison. `Equal` and `NotEqual` map to their own variants.
    pub fn compare(
        path: impl Into<AttributePath>,
        comparator: Comparator,
        value: impl Into<Value>,
    ) -> Self {
        let path = path.into();
        let value = value.into();
        match comparator {
            Comparator::Equal => Self::Equals { path, value },
            Comparator::NotEqual => Self::NotEquals { path, value },
            comparator => Self::Compare {
                path,
                comparator,
                value,
            },
        }
    }

    pub fn begins_with(path: impl Into<AttributePath>, prefix: impl Into<Value>) -> Self {
        Self::BeginsWith {
            path: path.into(),
            prefix: prefix.into(),
        }
    }

    pub fn between(
        path: impl Into<AttributePath>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::Between {
            path: path.into(),
            low: low.into(),
            high: high.into(),
        }
    }

    pub fn is_in<I, V>(path: impl Into<AttributePath>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In {
            path: path.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(path: impl Into<AttributePath>, operand: impl Into<Value>) -> Self {
        Self::Contains {
            path: path.into(),
            operand: operand.into(),
        }
    }

    pub fn exists(path: impl Into<AttributePath>) -> Self {
        Self::Exists { path: path.into() }
    }

    pub fn not_exists(path: impl Into<AttributePath>) -> Self {
        Self::NotExists { path: path.into() }
    }

    pub fn is_type(path: impl Into<AttributePath>, attribute_type: AttributeType) -> Self {
        Self::IsType {
            path: path.into(),
            attribute_type,
        }
    }

    pub fn size(path: impl Into<AttributePath>, comparator: Comparator, size: usize) -> Self {
        Self::Size {
            path: path.into(),
            comparator,
            size,
        }
    }

    /// Conjunction of all the given conditions.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::And(conditions.into_iter().collect())
    }

    /// Disjunction of all the given conditions.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Or(conditions.into_iter().collect())
    }

    pub fn negate(condition: Condition) -> Self {
        Self::Not(Box::new(condition))
    }

    /// `self AND other`, flattening nested conjunctions.
    pub fn and(self, other: Condition) -> Self {
        match (self, other) {
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), right) => {
                left.push(right);
                Self::And(left)
            }
            (left, Self::And(mut right)) => {
                right.insert(0, left);
                Self::And(right)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }

    /// `self OR other`, flattening nested disjunctions.
    pub fn or(self, other: Condition) -> Self {
        match (self, other) {
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), right) => {
                left.push(right);
                Self::Or(left)
            }
            (left, Self::Or(mut right)) => {
                right.insert(0, left);
                Self::Or(right)
            }
            (left, right) => Self::Or(vec![left, right]),
        }
    }

    /// The attribute path a leaf condition tests. `None` for logical nodes.
    pub fn path(&self) -> Option<&AttributePath> {
        match self {
            Self::Equals { path, .. }
            | Self::NotEquals { path, .. }
            | Self::Compare { path, .. }
            | Self::BeginsWith { path, .. }
            | Self::Between { path, .. }
            | Self::In { path, .. }
            | Self::Contains { path, .. }
            | Self::Exists { path }
            | Self::NotExists { path }
            | Self::IsType { path, .. }
            | Self::Size { path, .. } => Some(path),
            Self::And(_) | Self::Or(_) | Self::Not(_) => None,
        }
    }

    /// Every attribute path referenced anywhere in the tree, in visit order.
    pub fn paths(&self) -> Box<dyn Iterator<Item = &AttributePath> + '_> {
        match self {
            Self::And(children) | Self::Or(children) => {
                Box::new(children.iter().flat_map(|c| c.paths()))
            }
            Self::Not(inner) => inner.paths(),
            leaf => Box::new(leaf.path().into_iter()),
        }
    }

    /// Structural checks the store would reject: empty names, empty logical
    /// groups, empty or oversized `IN` lists, inverted `BETWEEN` bounds.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::And(children) | Self::Or(children) => {
                if children.is_empty() {
                    return Err("logical operators need at least one operand".to_string());
                }
                children.iter().try_for_each(Condition::validate)
            }
            Self::Not(inner) => inner.validate(),
            Self::In { path, values } => {
                path.validate()?;
                if values.is_empty() {
                    return Err(format!("IN on '{path}' needs at least one value"));
                }
                if values.len() > MAX_IN_OPERANDS {
                    return Err(format!(
                        "IN on '{path}' accepts at most {MAX_IN_OPERANDS} values"
                    ));
                }
                Ok(())
            }
            Self::Between { path, low, high } => {
                path.validate()?;
                if low.compare(high) == Some(Ordering::Greater) {
                    return Err(format!(
                        "BETWEEN on '{path}' requires the upper bound to be greater than or equal to the lower bound"
                    ));
                }
                Ok(())
            }
            leaf => leaf.path().map_or(Ok(()), AttributePath::validate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_flattens() {
        let condition = Condition::eq("a", 1)
            .and(Condition::eq("b", 2))
            .and(Condition::eq("c", 3));

        let Condition::And(children) = condition else {
            panic!("expected AND");
        };
        assert_eq!(children.len(), 3);
    }

    #[test]
    fn test_or_flattens_on_the_right() {
        let condition = Condition::eq("a", 1).or(Condition::any([
            Condition::eq("b", 2),
            Condition::eq("c", 3),
        ]));

        assert!(matches!(condition, Condition::Or(ref c) if c.len() == 3));
    }

    #[test]
    fn test_compare_maps_equality_to_own_variants() {
        assert!(matches!(
            Condition::compare("a", Comparator::Equal, 1),
            Condition::Equals { .. }
        ));
        assert!(matches!(
            Condition::compare("a", Comparator::NotEqual, 1),
            Condition::NotEquals { .. }
        ));
        assert!(matches!(
            Condition::compare("a", Comparator::Less, 1),
            Condition::Compare { comparator: Comparator::Less, .. }
        ));
    }

    #[test]
    fn test_paths_in_visit_order() {
        let condition = Condition::eq("a", 1).and(Condition::negate(
            Condition::exists("b.c").or(Condition::size("d", Comparator::Greater, 2)),
        ));

        let paths: Vec<String> = condition.paths().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["a", "b.c", "d"]);
    }

    #[test]
    fn test_validate() {
        assert!(Condition::all([]).validate().is_err());
        assert!(Condition::is_in("a", Vec::<Value>::new()).validate().is_err());
        assert!(Condition::is_in("a", 0..=MAX_IN_OPERANDS).validate().is_err());
        assert!(Condition::between("a", 5, 1).validate().is_err());
        assert!(Condition::between("a", 1, 5).validate().is_ok());
        assert!(Condition::eq("", 1).validate().is_err());
        assert!(Condition::negate(Condition::eq("a..b", 1)).validate().is_err());
    }

    #[test]
    fn test_comparator_holds() {
        assert!(Comparator::LessOrEqual.holds(Ordering::Equal));
        assert!(!Comparator::Greater.holds(Ordering::Equal));
        assert!(Comparator::NotEqual.holds(Ordering::Less));
    }
}
