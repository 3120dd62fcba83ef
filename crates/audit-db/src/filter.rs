//! Translation of HTTP query parameters into a document filter.
//!
//! Every query parameter becomes one condition on the document field of the
//! same name:
//!
//! | Parameter values | Condition |
//! |------------------|-----------|
//! | exactly one | field equals the value |
//! | more than one | field is one of the values |
//!
//! Conditions combine with logical AND. There are no range, negation, or
//! existence operators. Parameter names are not checked against the event
//! schema: an unknown name simply matches no document.
//!
//! The resulting [`EventFilter`] is evaluated two ways: rendered into a
//! parameterised `WHERE` clause for `PostgreSQL`, or matched directly
//! against the JSON form of a document by the in-memory store.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};

/// Upper bound on the number of events returned by a single list call.
pub const MAX_LIST_RESULTS: usize = 100;

/// A predicate on a single document field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The field's text value equals this string.
    Equals(String),
    /// The field's text value is one of these strings.
    In(Vec<String>),
}

impl Condition {
    /// Build a condition from the values collected for one parameter.
    ///
    /// Returns `None` when no value was collected.
    pub fn from_values(mut values: Vec<String>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(Self::Equals),
            _ => Some(Self::In(values)),
        }
    }

    /// Whether a field's text value satisfies this condition.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Equals(expected) => expected == value,
            Self::In(set) => set.iter().any(|candidate| candidate == value),
        }
    }
}

/// A conjunction of per-field conditions over event documents.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    conditions: BTreeMap<String, Condition>,
}

impl EventFilter {
    /// Create an empty filter that matches everything.
    pub const fn new() -> Self {
        Self {
            conditions: BTreeMap::new(),
        }
    }

    /// Build a filter from query pairs in the order they appeared.
    ///
    /// Repeated keys accumulate their values, so
    /// `[("action", "CREATE"), ("action", "UPDATE")]` yields
    /// `action IN (CREATE, UPDATE)`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in pairs {
            params.entry(key.into()).or_default().push(value.into());
        }
        Self::from_params(params)
    }

    /// Build a filter from an already-grouped parameter map.
    pub fn from_params(params: BTreeMap<String, Vec<String>>) -> Self {
        let conditions = params
            .into_iter()
            .filter_map(|(field, values)| {
                Condition::from_values(values).map(|condition| (field, condition))
            })
            .collect();
        Self { conditions }
    }

    /// The condition on `field`, if any.
    pub fn condition(&self, field: &str) -> Option<&Condition> {
        self.conditions.get(field)
    }

    /// Number of field conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether this filter matches every document.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate the filter against a JSON document.
    ///
    /// Field values are compared by their text form, the same way the
    /// `->>` operator projects JSONB values in `PostgreSQL`. A missing or
    /// `null` field satisfies no condition.
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|(field, condition)| {
            document
                .get(field)
                .and_then(text_value)
                .is_some_and(|value| condition.matches(&value))
        })
    }

    /// Append this filter as a `WHERE` clause on the `doc` column.
    ///
    /// Field names and values are bound as parameters, never spliced into
    /// the SQL text. Pushes nothing for an empty filter.
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for (index, (field, condition)) in self.conditions.iter().enumerate() {
            builder.push(if index == 0 { " WHERE " } else { " AND " });
            builder.push("doc ->> ");
            builder.push_bind(field.clone());
            match condition {
                Condition::Equals(value) => {
                    builder.push(" = ");
                    builder.push_bind(value.clone());
                }
                Condition::In(values) => {
                    builder.push(" = ANY(");
                    builder.push_bind(values.clone());
                    builder.push(")");
                }
            }
        }
    }
}

/// Project a JSON value to text the way `->>` does.
fn text_value(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        other => Some(Cow::Owned(other.to_string())),
    }
}
