//! Dynamic object graph produced by a translation run.
//!
//! A run never knows the caller's concrete Rust types, so everything it builds
//! is a [`Value`]. Compound objects are [`Record`]s: an optional class name and
//! an insertion-ordered field map. A record without a class is the generic
//! fallback used when neither the rule nor the schema names a class.
//!
//! [`ValueType`] is the static counterpart: it is what a rule (or a schema
//! property) declares as its destination.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use std::fmt;

/// A translated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDateTime),
    /// Ordered collection, source order preserved.
    List(Vec<Value>),
    /// Unordered collection. Stored in first-insertion order, duplicates dropped.
    Set(Vec<Value>),
    Record(Record),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Items of a list or set.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Short shape name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Record(_) => "record",
        }
    }

    /// Render as JSON. Dates are formatted with `date_format` (chrono syntax).
    pub fn to_json(&self, date_format: &str) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(n) => serde_json::Value::from(*n),
            Value::Float(n) => serde_json::Number::from_f64(*n).map(serde_json::Value::Number).unwrap_or_default(),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.format(date_format).to_string()),
            Value::List(items) | Value::Set(items) => {
                serde_json::Value::Array(items.iter().map(|v| v.to_json(date_format)).collect())
            }
            Value::Record(record) => {
                let mut map = serde_json::Map::new();
                for (key, value) in &record.fields {
                    map.insert(key.clone(), value.to_json(date_format));
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

/// A compound object under construction or finished.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    class: Option<String>,
    pub fields: IndexMap<String, Value>,
}

impl Record {
    /// A record of the named class.
    pub fn new(class: impl Into<String>) -> Self {
        Record { class: Some(class.into()), fields: IndexMap::new() }
    }

    /// A classless record (the generic fallback).
    pub fn generic() -> Self {
        Record::default()
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Follow a dotted key path through nested records.
    pub fn get_path(&self, key_path: &str) -> Option<&Value> {
        let mut segments = key_path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = current.as_record()?.fields.get(segment)?;
        }
        Some(current)
    }

    /// Builder-style field insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }
}

/// Destination type of a rule or a declared schema property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Integer,
    Float,
    Bool,
    Date,
    /// Atomic with no conversion; the text is kept as a string.
    Any,
    /// A record of the given class.
    Record(String),
    List(Box<ValueType>),
    Set(Box<ValueType>),
}

impl ValueType {
    pub fn record(class: impl Into<String>) -> Self {
        ValueType::Record(class.into())
    }

    pub fn list(element: ValueType) -> Self {
        ValueType::List(Box::new(element))
    }

    pub fn set(element: ValueType) -> Self {
        ValueType::Set(Box::new(element))
    }

    /// Scalar types are coerced from text; everything else is built from events.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            ValueType::String
                | ValueType::Integer
                | ValueType::Float
                | ValueType::Bool
                | ValueType::Date
                | ValueType::Any
        )
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, ValueType::List(_) | ValueType::Set(_))
    }

    /// Element type of a collection; other types are their own element type.
    pub fn element(&self) -> &ValueType {
        match self {
            ValueType::List(inner) | ValueType::Set(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => f.write_str("string"),
            ValueType::Integer => f.write_str("integer"),
            ValueType::Float => f.write_str("float"),
            ValueType::Bool => f.write_str("bool"),
            ValueType::Date => f.write_str("date"),
            ValueType::Any => f.write_str("any"),
            ValueType::Record(class) => f.write_str(class),
            ValueType::List(inner) => write!(f, "[{inner}]"),
            ValueType::Set(inner) => write!(f, "{{{inner}}}"),
        }
    }
}
