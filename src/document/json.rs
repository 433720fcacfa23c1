//! `serde_json::Value` as a group-event source.
//!
//! ```text
//! {"book": {"title": "Foo", "authors": ["A", "B"], "note": null}}
//!
//! +book
//!   +title  -title "Foo"
//!   +authors -authors "A"
//!   +authors -authors "B"
//! -book
//! ```
//!
//! - Object members become groups named by key.
//! - Array elements repeat the member name, like sibling XML elements.
//! - Scalars become leaf groups whose text is the JSON literal (strings unquoted).
//! - `null` members are omitted.
//! - A top-level array emits each element under `item_name`.
//!
//! JSON has no attributes, so every group starts with an empty map; use
//! `SourceKind::VALUE` or `SourceKind::ANY` rules.

use super::{Document, EventSink};
use crate::Attributes;
use serde_json::Value as Json;
use std::ops::ControlFlow;

#[derive(Debug, Clone)]
pub struct JsonDocument {
    root: Json,
    item_name: String,
}

impl JsonDocument {
    pub fn new(root: Json) -> Self {
        JsonDocument { root, item_name: "item".to_string() }
    }

    /// Parse JSON text.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self::new)
    }

    /// Group name for elements of a top-level array.
    pub fn item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = name.into();
        self
    }
}

impl Document for JsonDocument {
    fn emit(&self, sink: &mut dyn EventSink) -> ControlFlow<()> {
        let empty = Attributes::new();
        match &self.root {
            Json::Object(members) => {
                for (name, value) in members {
                    emit_member(sink, name, value, &empty)?;
                }
                ControlFlow::Continue(())
            }
            Json::Null => ControlFlow::Continue(()),
            other => emit_member(sink, &self.item_name, other, &empty),
        }
    }
}

fn emit_member(sink: &mut dyn EventSink, name: &str, value: &Json, empty: &Attributes) -> ControlFlow<()> {
    match value {
        Json::Null => ControlFlow::Continue(()),
        Json::Array(items) => {
            for item in items {
                emit_member(sink, name, item, empty)?;
            }
            ControlFlow::Continue(())
        }
        Json::Object(members) => {
            sink.group_start(name, empty, None)?;
            for (key, member) in members {
                emit_member(sink, key, member, empty)?;
            }
            sink.group_end(name, None)
        }
        Json::String(text) => {
            sink.group_start(name, empty, None)?;
            sink.group_end(name, Some(text))
        }
        scalar => {
            let text = scalar.to_string();
            sink.group_start(name, empty, None)?;
            sink.group_end(name, Some(&text))
        }
    }
}
