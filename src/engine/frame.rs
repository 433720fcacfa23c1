//! One stack entry per open group.

use crate::Attributes;
use crate::rules::{RuleId, RuleTree};
use crate::value::{Value, ValueType};
use std::collections::HashSet;

/// In-progress state for one nesting level.
///
/// ```text
/// <book isbn="1">        push Frame { rule: book, object: Some(Book{isbn}) }
///   <title>Foo</title>   push Frame { rule: title, object: None } ... pop
///   <blurb>..</blurb>    push skip frame (unmatched) ... pop, no-op
/// </book>                pop, check required, assign to parent
/// ```
#[derive(Debug)]
pub(crate) struct Frame {
    pub source_name: String,
    /// `None` marks a skip frame: unmatched or skipped by the delegate.
    pub rule: Option<RuleId>,
    pub depth: usize,
    /// Absent for atomic values until their group ends.
    pub object: Option<Value>,
    pub destination: ValueType,
    pub attributes: Attributes,
    /// Effective context handed to children.
    pub context: Option<String>,
    /// Key paths whose `Require` rule fired under this frame.
    pub satisfied: HashSet<String>,
}

impl Frame {
    pub fn root() -> Self {
        Frame {
            source_name: String::new(),
            rule: Some(RuleTree::ROOT),
            depth: 0,
            object: None,
            destination: ValueType::Any,
            attributes: Attributes::new(),
            context: None,
            satisfied: HashSet::new(),
        }
    }

    pub fn skip(source_name: &str, depth: usize) -> Self {
        Frame { source_name: source_name.to_string(), rule: None, depth, ..Frame::root() }
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}
