//! The event contract between input adapters and the translator.
//!
//! An adapter walks its input and reports every nested group as a
//! `group_start` / `group_end` pair, strictly well nested. Attributes arrive
//! only with `group_start`; text only with `group_end`.
//!
//! ```text
//! <book isbn="1"><title>Foo</title></book>
//!
//! group_start("book", {isbn: "1"})
//!   group_start("title", {})
//!   group_end("title", "Foo")
//! group_end("book", None)
//! ```
//!
//! Sinks answer each event with `ControlFlow`; adapters should stop emitting
//! after `Break`.

#[path = "document/json.rs"]
mod json;

pub use json::JsonDocument;

use crate::Attributes;
use std::ops::ControlFlow;

/// Receiver of group events.
pub trait EventSink {
    fn group_start(&mut self, name: &str, attributes: &Attributes, context: Option<&str>) -> ControlFlow<()>;

    fn group_end(&mut self, name: &str, text: Option<&str>) -> ControlFlow<()>;
}

/// Something that can replay itself as group events.
pub trait Document {
    fn emit(&self, sink: &mut dyn EventSink) -> ControlFlow<()>;
}

/// One recorded group event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start { name: String, attributes: Attributes, context: Option<String> },
    End { name: String, text: Option<String> },
}

/// An in-memory event stream.
///
/// Handy for adapters that tokenize up front and for tests:
///
/// ```
/// use rulebind::{EventStream, attrs};
///
/// let stream = EventStream::new()
///     .start("book", attrs! { "isbn" => "123" })
///     .leaf("title", "Foo")
///     .end("book");
/// assert_eq!(stream.events().len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStream {
    events: Vec<Event>,
}

impl EventStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn start(mut self, name: &str, attributes: Attributes) -> Self {
        self.events.push(Event::Start { name: name.to_string(), attributes, context: None });
        self
    }

    /// Start a group with an explicit context override.
    pub fn start_in(mut self, name: &str, attributes: Attributes, context: &str) -> Self {
        self.events.push(Event::Start { name: name.to_string(), attributes, context: Some(context.to_string()) });
        self
    }

    pub fn end(mut self, name: &str) -> Self {
        self.events.push(Event::End { name: name.to_string(), text: None });
        self
    }

    pub fn end_with_text(mut self, name: &str, text: &str) -> Self {
        self.events.push(Event::End { name: name.to_string(), text: Some(text.to_string()) });
        self
    }

    /// A group with text and no attributes or children.
    pub fn leaf(self, name: &str, text: &str) -> Self {
        self.start(name, Attributes::new()).end_with_text(name, text)
    }
}

impl Document for EventStream {
    fn emit(&self, sink: &mut dyn EventSink) -> ControlFlow<()> {
        for event in &self.events {
            match event {
                Event::Start { name, attributes, context } => sink.group_start(name, attributes, context.as_deref())?,
                Event::End { name, text } => sink.group_end(name, text.as_deref())?,
            }
        }
        ControlFlow::Continue(())
    }
}

/// Recording sink: captures another document's events.
impl EventSink for EventStream {
    fn group_start(&mut self, name: &str, attributes: &Attributes, context: Option<&str>) -> ControlFlow<()> {
        self.push(Event::Start {
            name: name.to_string(),
            attributes: attributes.clone(),
            context: context.map(str::to_string),
        });
        ControlFlow::Continue(())
    }

    fn group_end(&mut self, name: &str, text: Option<&str>) -> ControlFlow<()> {
        self.push(Event::End { name: name.to_string(), text: text.map(str::to_string) });
        ControlFlow::Continue(())
    }
}

impl FromIterator<Event> for EventStream {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        EventStream { events: iter.into_iter().collect() }
    }
}
