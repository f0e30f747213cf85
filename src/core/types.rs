use std::borrow::Cow;
use serde::{Serialize, Deserialize};
use serde_json::{Map, Number, Value};

/// Internal document id. Dense and `u32` so it fits in a roaring bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl DocId {
    pub fn new(id: u32) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        DocId(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(Number),
    Boolean(bool),
    Null,
    /// Arrays and objects: stored and returned as-is, never indexed.
    Raw(Value),
}

impl FieldValue {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => FieldValue::Text(s),
            Value::Number(n) => FieldValue::Number(n),
            Value::Bool(b) => FieldValue::Boolean(b),
            Value::Null => FieldValue::Null,
            other => FieldValue::Raw(other),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => Value::Number(n.clone()),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Null => Value::Null,
            FieldValue::Raw(v) => v.clone(),
        }
    }

    /// Text rendering used for tokenization and facet values.
    /// `None` for values that cannot be indexed.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            FieldValue::Number(n) => Some(Cow::Owned(n.to_string())),
            FieldValue::Boolean(b) => Some(Cow::Owned(b.to_string())),
            FieldValue::Null | FieldValue::Raw(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "string",
            FieldValue::Number(_) => "number",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Null => "null",
            FieldValue::Raw(Value::Array(_)) => "array",
            FieldValue::Raw(_) => "object",
        }
    }
}

/// A stored document. Fields keep the order in which they were ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub external_id: String,
    pub fields: Vec<(String, FieldValue)>,
}

impl Document {
    pub fn new(id: DocId, external_id: String) -> Self {
        Document {
            id,
            external_id,
            fields: Vec::new(),
        }
    }

    pub fn add_field(&mut self, name: String, value: FieldValue) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn to_json_map(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }
}
