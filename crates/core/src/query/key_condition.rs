//! Validated key conditions.

use crate::condition::{Comparator, Condition};
use crate::storage::QueryError;
use crate::value::{Item, Value};

/// A key condition: one partition-key equality and at most one sort-key term.
///
/// Built from a [`Condition`] with `try_from`, which rejects any other shape
/// before a request is sent. Whether the named attributes really are the
/// table's keys is left to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCondition {
    partition_key: String,
    partition_value: Value,
    terms: Vec<Condition>,
}

impl KeyCondition {
    /// The partition-key term followed by the sort-key term, if any.
    pub fn terms(&self) -> &[Condition] {
        &self.terms
    }

    /// The attribute name and value of the partition-key equality.
    ///
    /// When both terms are equalities the first one is reported; backends
    /// holding a key schema should use [`KeyCondition::term_for`] instead.
    pub fn partition(&self) -> (&str, &Value) {
        (&self.partition_key, &self.partition_value)
    }

    /// The names of the attributes the condition constrains.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().filter_map(|t| t.path()?.top_level_name())
    }

    /// The term constraining the given attribute.
    pub fn term_for(&self, name: &str) -> Option<&Condition> {
        self.terms
            .iter()
            .find(|t| t.path().and_then(|p| p.top_level_name()) == Some(name))
    }

    /// The condition as a single tree, ready to render or evaluate.
    pub fn to_condition(&self) -> Condition {
        match self.terms.as_slice() {
            [only] => only.clone(),
            terms => Condition::And(terms.to_vec()),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.terms.iter().all(|t| t.matches(item))
    }
}

impl TryFrom<Condition> for KeyCondition {
    type Error = QueryError;

    fn try_from(condition: Condition) -> Result<Self, Self::Error> {
        let mut terms = Vec::new();
        flatten_and(condition, &mut terms);

        if terms.is_empty() {
            return Err(invalid("a key condition needs a partition key equality"));
        }
        if terms.len() > 2 {
            return Err(invalid(
                "a key condition takes a partition key equality and at most one sort key term",
            ));
        }

        for term in &terms {
            check_term(term)?;
        }

        let Some((position, partition_key, partition_value)) =
            terms.iter().enumerate().find_map(|(i, t)| match t {
                Condition::Equals { path, value } => {
                    Some((i, path.top_level_name()?.to_string(), value.clone()))
                }
                _ => None,
            })
        else {
            return Err(invalid("partition key equality is required"));
        };
        terms.swap(0, position);

        if let [first, second] = terms.as_slice() {
            if first.path() == second.path() {
                let name = first.path().map(ToString::to_string).unwrap_or_default();
                return Err(invalid(&format!(
                    "attribute '{name}' appears more than once"
                )));
            }
        }

        Ok(Self {
            partition_key,
            partition_value,
            terms,
        })
    }
}

fn flatten_and(condition: Condition, terms: &mut Vec<Condition>) {
    match condition {
        Condition::And(children) => children.into_iter().for_each(|c| flatten_and(c, terms)),
        other => terms.push(other),
    }
}

fn check_term(term: &Condition) -> Result<(), QueryError> {
    let supported = match term {
        Condition::Equals { .. } | Condition::BeginsWith { .. } | Condition::Between { .. } => true,
        Condition::Compare { comparator, .. } => *comparator != Comparator::NotEqual,
        _ => false,
    };
    if !supported {
        return Err(invalid(&format!(
            "{} is not supported in a key condition",
            operator_name(term)
        )));
    }

    let path = term.path().ok_or_else(|| invalid("logical groups are not supported"))?;
    if path.top_level_name().is_none() {
        return Err(invalid(&format!(
            "key attributes must be top-level names, got '{path}'"
        )));
    }
    term.validate().map_err(QueryError::InvalidKeyCondition)
}

fn operator_name(condition: &Condition) -> &'static str {
    match condition {
        Condition::Equals { .. } => "=",
        Condition::NotEquals { .. } => "<>",
        Condition::Compare { comparator, .. } => comparator.as_str(),
        Condition::BeginsWith { .. } => "begins_with",
        Condition::Between { .. } => "BETWEEN",
        Condition::In { .. } => "IN",
        Condition::Contains { .. } => "contains",
        Condition::Exists { .. } => "attribute_exists",
        Condition::NotExists { .. } => "attribute_not_exists",
        Condition::IsType { .. } => "attribute_type",
        Condition::Size { .. } => "size",
        Condition::And(_) => "AND",
        Condition::Or(_) => "OR",
        Condition::Not(_) => "NOT",
    }
}

fn invalid(message: &str) -> QueryError {
    QueryError::InvalidKeyCondition(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(condition: Condition) {
        let result = KeyCondition::try_from(condition);
        assert!(
            matches!(result, Err(QueryError::InvalidKeyCondition(_))),
            "expected InvalidKeyCondition, got {result:?}"
        );
    }

    #[test]
    fn test_partition_and_prefix() {
        let key = KeyCondition::try_from(
            Condition::eq("pk", "id#1").and(Condition::begins_with("sk", "cart#")),
        )
        .unwrap();

        assert_eq!(key.partition(), ("pk", &Value::from("id#1")));
        assert_eq!(key.attribute_names().collect::<Vec<_>>(), vec!["pk", "sk"]);
    }

    #[test]
    fn test_partition_only() {
        let key = KeyCondition::try_from(Condition::eq("pk", "id#1")).unwrap();
        assert_eq!(key.terms().len(), 1);
        assert_eq!(key.to_condition(), Condition::eq("pk", "id#1"));
    }

    #[test]
    fn test_equality_is_moved_first() {
        let key = KeyCondition::try_from(
            Condition::gt("sk", 10).and(Condition::eq("pk", "id#1")),
        )
        .unwrap();

        assert_eq!(key.partition().0, "pk");
        assert!(matches!(key.term_for("sk"), Some(Condition::Compare { .. })));
    }

    #[test]
    fn test_missing_partition_equality_is_rejected() {
        assert_invalid(Condition::begins_with("sk", "cart#"));
        assert_invalid(Condition::gt("pk", 1).and(Condition::lt("sk", 2)));
    }

    #[test]
    fn test_too_many_terms_are_rejected() {
        assert_invalid(Condition::all([
            Condition::eq("pk", 1),
            Condition::eq("sk", 2),
            Condition::eq("other", 3),
        ]));
        assert_invalid(Condition::all([]));
    }

    #[test]
    fn test_unsupported_operators_are_rejected() {
        assert_invalid(Condition::eq("pk", 1).or(Condition::eq("pk", 2)));
        assert_invalid(Condition::eq("pk", 1).and(Condition::ne("sk", 2)));
        assert_invalid(Condition::eq("pk", 1).and(Condition::contains("sk", "x")));
        assert_invalid(Condition::negate(Condition::eq("pk", 1)));
    }

    #[test]
    fn test_nested_paths_are_rejected() {
        assert_invalid(Condition::eq("a.b", 1));
    }

    #[test]
    fn test_repeated_attribute_is_rejected() {
        assert_invalid(Condition::eq("pk", 1).and(Condition::begins_with("pk", "x")));
    }

    #[test]
    fn test_inverted_between_is_rejected() {
        assert_invalid(Condition::eq("pk", 1).and(Condition::between("sk", 9, 1)));
    }

    #[test]
    fn test_matches() {
        let key = KeyCondition::try_from(
            Condition::eq("pk", "id#1").and(Condition::begins_with("sk", "cart#")),
        )
        .unwrap();

        let item: Item = serde_json::from_value(serde_json::json!({"pk": "id#1", "sk": "cart#2"}))
            .unwrap();
        assert!(key.matches(&item));
    }
}
