//! Dynamic field values exchanged between typed field structs and the codec.

use std::collections::BTreeMap;

use super::{Attachment, Date, FormulaResult};

/// A single field value, tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Checkbox(bool),
    Date(Date),
    StringList(Vec<String>),
    Attachments(Vec<Attachment>),
    Formula(FormulaResult),
    Struct(FieldValues),
}

impl FieldValue {
    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Checkbox(_) => "checkbox",
            FieldValue::Date(_) => "date",
            FieldValue::StringList(_) => "string list",
            FieldValue::Attachments(_) => "attachments",
            FieldValue::Formula(_) => "formula",
            FieldValue::Struct(_) => "struct",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Checkbox(value)
    }
}

impl From<Date> for FieldValue {
    fn from(value: Date) -> Self {
        FieldValue::Date(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::StringList(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        FieldValue::StringList(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<Attachment>> for FieldValue {
    fn from(value: Vec<Attachment>) -> Self {
        FieldValue::Attachments(value)
    }
}

/// Field values keyed by logical field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues(BTreeMap<String, FieldValue>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

impl IntoIterator for FieldValues {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldValues
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
