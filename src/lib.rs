//! Rule-driven translation of nested structured input into object graphs.
//!
//! Input adapters turn markup or JSON into a stream of `group_start` /
//! `group_end` events. A [`Translator`] matches every group against an
//! immutable [`RuleTree`] and builds [`Value`]s: records assembled from
//! nested groups and attributes, leaves coerced from text.
//!
//! ```
//! use rulebind::{ClassDef, EventStream, Record, RuleSpec, RuleTree, Value, ValueType, attrs, translate};
//!
//! let mut builder = RuleTree::builder();
//! let book = builder.add_rule(RuleTree::ROOT, RuleSpec::value(["book"]).destination(ValueType::record("Book")))?;
//! builder.add_rule(book, RuleSpec::attribute(["isbn"]).destination(ValueType::String))?;
//! builder.add_rule(book, RuleSpec::value(["title"]).destination(ValueType::String))?;
//! builder.add_rule(book, RuleSpec::value(["author"]).append().key_path("authors"))?;
//! builder.define_class(ClassDef::new("Book").property("authors", ValueType::list(ValueType::String)));
//! let tree = builder.build();
//!
//! let doc = EventStream::new()
//!     .start("book", attrs! { "isbn" => "123" })
//!     .leaf("title", "Foo")
//!     .leaf("author", "A")
//!     .leaf("author", "B")
//!     .end("book");
//!
//! let expected = Record::new("Book")
//!     .with("isbn", "123")
//!     .with("title", "Foo")
//!     .with("authors", Value::List(vec!["A".into(), "B".into()]));
//! assert_eq!(translate(&tree, &doc)?, vec![Value::Record(expected)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Runs are all-or-nothing: the first fatal [`TranslateError`] discards every
//! root object built so far.

extern crate self as rulebind;

#[macro_use]
mod macros;
mod api;
mod delegate;
mod document;
mod engine;
mod error;
mod rules;
mod value;

pub use api::{
    ISO_DATE_FORMAT, Options, default_date_format, set_default_date_format, translate, translate_verbose,
    translate_with,
};
pub use delegate::{AtomicRequest, Instance, InstanceRequest, NoDelegate, Translated, TranslatorDelegate};
pub use document::{Document, Event, EventSink, EventStream, JsonDocument};
pub use engine::{RunMetrics, RunResult, Translator, TranslatorState};
pub use error::{CoercionError, ConfigurationError, ErrorKind, TranslateError};
pub use rules::{Action, ClassDef, RuleId, RuleNode, RuleSpec, RuleTree, RuleTreeBuilder, Schema, SourceKind};
pub use value::{Record, Value, ValueType};

/// Flat attributes of a group, in source order.
pub type Attributes = indexmap::IndexMap<String, String>;
