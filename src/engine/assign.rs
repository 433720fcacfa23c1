//! Writing translated values into records at dotted key paths.
//!
//! Intermediate records on a key path are created on demand, typed from the
//! schema when the property is declared there. Append targets are created
//! lazily: a `Set` when the declared property type is a set, a `List`
//! otherwise.

use crate::error::TranslateError;
use crate::rules::Schema;
use crate::value::{Record, Value, ValueType};

/// Overwrite the value at `key_path`.
pub(crate) fn assign(target: &mut Value, key_path: &str, value: Value, schema: &Schema) -> Result<(), TranslateError> {
    let (record, last) = walk(target, key_path, schema, "assign")?;
    record.fields.insert(last.to_string(), value);
    Ok(())
}

/// Add `value` to the collection at `key_path`, creating it if needed.
pub(crate) fn append(target: &mut Value, key_path: &str, value: Value, schema: &Schema) -> Result<(), TranslateError> {
    let (record, last) = walk(target, key_path, schema, "append to")?;
    let declared = record.class().and_then(|class| schema.property_type(class, last)).cloned();

    match record.fields.get_mut(last) {
        None | Some(Value::Null) => {
            let collection = match declared {
                Some(ValueType::Set(_)) => Value::Set(vec![value]),
                _ => Value::List(vec![value]),
            };
            record.fields.insert(last.to_string(), collection);
        }
        Some(Value::List(items)) => items.push(value),
        Some(Value::Set(items)) => {
            if !items.contains(&value) {
                items.push(value);
            }
        }
        Some(other) => {
            return Err(TranslateError::InvalidTarget {
                action: "append to",
                key_path: key_path.to_string(),
                found: other.kind_name(),
            });
        }
    }
    Ok(())
}

/// Descend to the record owning the last key path segment.
fn walk<'v, 'k>(
    target: &'v mut Value,
    key_path: &'k str,
    schema: &Schema,
    action: &'static str,
) -> Result<(&'v mut Record, &'k str), TranslateError> {
    let invalid = |found: &'static str| TranslateError::InvalidTarget { action, key_path: key_path.to_string(), found };

    let mut record = match target {
        Value::Record(record) => record,
        other => return Err(invalid(other.kind_name())),
    };

    let mut segments: Vec<&str> = key_path.split('.').collect();
    let last = segments.pop().unwrap_or(key_path);

    for segment in segments {
        let declared = record.class().and_then(|class| schema.property_type(class, segment));
        let fresh = match declared {
            Some(ValueType::Record(class)) => Record::new(class.clone()),
            _ => Record::generic(),
        };
        let current = record;
        let slot = current.fields.entry(segment.to_string()).or_insert(Value::Record(fresh));
        if matches!(slot, Value::Null) {
            *slot = Value::Record(Record::generic());
        }
        record = match slot {
            Value::Record(next) => next,
            other => return Err(invalid(other.kind_name())),
        };
    }

    Ok((record, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ClassDef;

    fn schema() -> Schema {
        let mut schema = Schema::default();
        schema.insert(
            ClassDef::new("Book")
                .property("publisher", ValueType::record("Publisher"))
                .property("tags", ValueType::set(ValueType::String)),
        );
        schema
    }

    #[test]
    fn assign_overwrites_and_creates_intermediates() {
        let schema = schema();
        let mut book = Value::Record(Record::new("Book"));

        assign(&mut book, "title", "A".into(), &schema).unwrap();
        assign(&mut book, "title", "B".into(), &schema).unwrap();
        assign(&mut book, "publisher.name", "Acme".into(), &schema).unwrap();
        assign(&mut book, "meta.source", "feed".into(), &schema).unwrap();

        let record = book.as_record().unwrap();
        assert_eq!(record.get("title"), Some(&Value::from("B")));
        assert_eq!(record.get_path("publisher.name"), Some(&Value::from("Acme")));
        assert_eq!(record.get("publisher").and_then(Value::as_record).and_then(Record::class), Some("Publisher"));
        assert_eq!(record.get("meta").and_then(Value::as_record).and_then(Record::class), None);
    }

    #[test]
    fn append_creates_list_or_set_from_declaration() {
        let schema = schema();
        let mut book = Value::Record(Record::new("Book"));

        for author in ["A", "B", "A"] {
            append(&mut book, "authors", author.into(), &schema).unwrap();
        }
        for tag in ["x", "y", "x"] {
            append(&mut book, "tags", tag.into(), &schema).unwrap();
        }

        let record = book.as_record().unwrap();
        assert_eq!(record.get("authors"), Some(&Value::List(vec!["A".into(), "B".into(), "A".into()])));
        assert_eq!(record.get("tags"), Some(&Value::Set(vec!["x".into(), "y".into()])));
    }

    #[test]
    fn wrong_shapes_are_invalid_targets() {
        let schema = schema();
        let mut book = Value::Record(Record::new("Book").with("title", "Foo"));

        let err = append(&mut book, "title", "Bar".into(), &schema).unwrap_err();
        assert_eq!(
            err,
            TranslateError::InvalidTarget { action: "append to", key_path: "title".into(), found: "string" }
        );

        let err = assign(&mut book, "title.lang", "en".into(), &schema).unwrap_err();
        assert_eq!(err, TranslateError::InvalidTarget { action: "assign", key_path: "title.lang".into(), found: "string" });

        let mut scalar = Value::Integer(1);
        assert!(assign(&mut scalar, "x", Value::Null, &schema).is_err());
    }
}
