//! The adapter capability that turns a structured value into ordered
//! name/value pairs for composite expansion.

use crate::value::Value;

/// A structured value reducible to ordered key/value pairs.
///
/// How fields are discovered is the implementor's concern; the engine only
/// ever calls these two methods. `Value::from_explodable` resolves an
/// implementor into `Value::Pairs` for binding.
pub trait Explodable {
    /// Ordered pairs, with per-field hints already applied.
    fn name_value_pairs(&self) -> Vec<(String, Value)>;

    /// The values alone, in pair order.
    fn values(&self) -> Vec<Value> {
        self.name_value_pairs().into_iter().map(|(_, v)| v).collect()
    }
}

/// An explicit field-by-field `Explodable` builder.
///
/// Caller-declared hints: `exclude` drops a field from output, `rename`
/// substitutes the output name. Fields whose value is null are omitted.
#[derive(Clone, Debug, Default)]
pub struct FieldMap {
    fields: Vec<Field>,
}

#[derive(Clone, Debug)]
struct Field {
    name: String,
    output_name: Option<String>,
    excluded: bool,
    value: Value,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<K>(mut self, name: K, value: Value) -> Self
    where
        K: Into<String>,
    {
        self.fields.push(Field {
            name: name.into(),
            output_name: None,
            excluded: false,
            value,
        });
        self
    }

    pub fn rename<K>(mut self, field: &str, output_name: K) -> Self
    where
        K: Into<String>,
    {
        let output_name = output_name.into();
        if let Some(f) = self.fields.iter_mut().find(|f| f.name == field) {
            f.output_name = Some(output_name);
        }
        self
    }

    pub fn exclude(mut self, field: &str) -> Self {
        if let Some(f) = self.fields.iter_mut().find(|f| f.name == field) {
            f.excluded = true;
        }
        self
    }
}

impl Explodable for FieldMap {
    fn name_value_pairs(&self) -> Vec<(String, Value)> {
        self.fields
            .iter()
            .filter(|f| !f.excluded && f.value != Value::Null)
            .map(|f| {
                let name = f.output_name.as_ref().unwrap_or(&f.name).clone();
                (name, f.value.clone())
            })
            .collect()
    }
}
