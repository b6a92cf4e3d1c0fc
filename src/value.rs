use std::borrow::Borrow;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::explode::Explodable;

/// A bound variable value. Values are caller-owned and supplied fresh per
/// expansion; absence is a lookup miss, not a `Value` shape.
///
/// `List` and `Pairs` elements must themselves be scalar-shaped; deeper
/// nesting is rejected at expansion time.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Renders as an empty scalar.
    Null,
    Scalar(String),
    List(Vec<Value>),
    Pairs(Vec<(String, Value)>),
    /// Rendered with the expansion's date format before encoding.
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn from_string<S>(s: S) -> Value
    where
        S: Into<String>,
    {
        Value::Scalar(s.into())
    }

    pub fn from_list<I, V>(iter: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Value::List(iter.into_iter().map(|v| Value::Scalar(v.into())).collect())
    }

    pub fn from_assoc<I, K, V>(iter: I) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Value::Pairs(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::Scalar(v.into())))
                .collect(),
        )
    }

    pub fn from_timestamp(ts: DateTime<Utc>) -> Value {
        Value::Timestamp(ts)
    }

    /// Resolve a structured value through its adapter into ordered pairs.
    /// The adapter applies its own exclude/rename hints and null omission.
    pub fn from_explodable<E>(explodable: &E) -> Value
    where
        E: Explodable + ?Sized,
    {
        Value::Pairs(explodable.name_value_pairs())
    }
}

/// Name-to-value lookup consulted during expansion. The borrow parameter
/// lets sources hand out references or freshly built values.
pub trait Variables<'a, B>
where
    B: Borrow<Value>,
{
    fn get(&'a self, k: &str) -> Option<B>;
}

impl<'a> Variables<'a, &'a Value> for Vec<(String, Value)> {
    fn get(&'a self, k: &str) -> Option<&'a Value> {
        self.iter().find(|(k1, _)| k == k1).map(|(_, v1)| v1)
    }
}

impl<'a> Variables<'a, &'a Value> for HashMap<String, Value> {
    fn get(&'a self, k: &str) -> Option<&'a Value> {
        HashMap::get(self, k)
    }
}
