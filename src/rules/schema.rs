//! Declared property types.
//!
//! Rules may leave their destination type implicit. The engine then looks up
//! the declared type of the target property on the object being built. These
//! declarations live here and are frozen into the [`RuleTree`](crate::RuleTree).

use crate::value::ValueType;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Property declarations of one record class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    name: String,
    properties: IndexMap<String, ValueType>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        ClassDef { name: name.into(), properties: IndexMap::new() }
    }

    pub fn property(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.properties.insert(name.into(), ty);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_type(&self, name: &str) -> Option<&ValueType> {
        self.properties.get(name)
    }
}

/// All known classes.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    classes: HashMap<String, ClassDef>,
}

impl Schema {
    pub fn insert(&mut self, class: ClassDef) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    /// Declared type at a dotted key path, starting from `class`.
    ///
    /// ```text
    /// Book.publisher : Publisher, Publisher.name : string
    /// property_type("Book", "publisher.name") -> string
    /// ```
    pub fn property_type(&self, class: &str, key_path: &str) -> Option<&ValueType> {
        let mut current = self.classes.get(class)?;
        let mut segments = key_path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let ty = current.property_type(segment)?;
            if segments.peek().is_none() {
                return Some(ty);
            }
            match ty {
                ValueType::Record(next) => current = self.classes.get(next)?,
                _ => return None,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        let mut schema = Schema::default();
        schema.insert(
            ClassDef::new("Book")
                .property("title", ValueType::String)
                .property("publisher", ValueType::record("Publisher"))
                .property("tags", ValueType::set(ValueType::String)),
        );
        schema.insert(ClassDef::new("Publisher").property("name", ValueType::String));
        schema
    }

    #[test]
    fn walks_nested_classes() {
        let schema = schema();
        assert_eq!(schema.property_type("Book", "title"), Some(&ValueType::String));
        assert_eq!(schema.property_type("Book", "publisher"), Some(&ValueType::record("Publisher")));
        assert_eq!(schema.property_type("Book", "publisher.name"), Some(&ValueType::String));
        assert_eq!(schema.property_type("Book", "tags"), Some(&ValueType::set(ValueType::String)));
    }

    #[test]
    fn unknown_paths_are_none() {
        let schema = schema();
        assert_eq!(schema.property_type("Book", "isbn"), None);
        assert_eq!(schema.property_type("Book", "title.length"), None);
        assert_eq!(schema.property_type("Magazine", "title"), None);
        assert_eq!(schema.property_type("Book", "publisher.city"), None);
    }
}
