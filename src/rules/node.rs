//! Rule nodes and child resolution.
//!
//! A node says "source name(s) X, seen as an attribute and/or a nested value,
//! go to key path K of the object being built, as type T, with action A".
//! Children of a node describe what may appear *inside* the matched group.
//!
//! ## Resolution
//!
//! ```text
//! resolve_child(name, origin, context)
//!   index[(name, origin)] ──▶ candidates, declared order
//!       ├─ context == caller context   -> preferred
//!       ├─ no context (wildcard)       -> fallback
//!       └─ any other context           -> never matches
//! ```
//!
//! Two candidates of the same tier are rejected as ambiguous when the rule is
//! added (see `builder.rs`).

use crate::value::ValueType;
use std::collections::HashMap;

/// Index of a node in its [`RuleTree`](crate::RuleTree).
pub type RuleId = usize;

bitflags::bitflags! {
    /// Which event origins a rule accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SourceKind: u8 {
        /// Flat attribute supplied at group start.
        const ATTRIBUTE = 1 << 0;
        /// Nested group (element, JSON member).
        const VALUE     = 1 << 1;
        const ANY       = Self::ATTRIBUTE.bits() | Self::VALUE.bits();
    }
}

/// What happens with a translated value at its key path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Like `Assign`, and must occur at least once under its parent.
    Require,
    /// Overwrite; last write wins.
    Assign,
    /// Add to a lazily created list or set.
    Append,
}

/// One immutable node of the rule tree.
#[derive(Debug, Clone)]
pub struct RuleNode {
    pub(crate) source_names: Vec<String>,
    pub(crate) kind: SourceKind,
    pub(crate) action: Action,
    pub(crate) key_path: String,
    pub(crate) destination: Option<ValueType>,
    pub(crate) context: Option<String>,
    pub(crate) children: Vec<RuleId>,
    /// `(name, single origin bit)` -> children in declared order.
    pub(crate) index: HashMap<(String, SourceKind), Vec<RuleId>>,
}

impl RuleNode {
    pub(crate) fn root() -> Self {
        RuleNode {
            source_names: Vec::new(),
            kind: SourceKind::VALUE,
            action: Action::Assign,
            key_path: String::new(),
            destination: None,
            context: None,
            children: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn source_names(&self) -> &[String] {
        &self.source_names
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn key_path(&self) -> &str {
        &self.key_path
    }

    /// Explicit destination type, if the rule names one.
    pub fn destination(&self) -> Option<&ValueType> {
        self.destination.as_ref()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn children(&self) -> &[RuleId] {
        &self.children
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.source_names.iter().any(|n| n == name)
    }

    /// A leaf textual value rather than an object built from nested events.
    ///
    /// Explicit scalar destinations are atomic; without an explicit
    /// destination a rule with no children is atomic.
    pub fn is_atomic(&self) -> bool {
        match &self.destination {
            Some(ty) => ty.is_atomic(),
            None => self.children.is_empty(),
        }
    }

    /// Label used in logs and error messages, e.g. `"author|writer"`.
    pub fn label(&self) -> String {
        if self.source_names.is_empty() { "<root>".to_string() } else { self.source_names.join("|") }
    }

    pub(crate) fn index_child(&mut self, id: RuleId, child: &RuleNode) {
        for origin in [SourceKind::ATTRIBUTE, SourceKind::VALUE] {
            if !child.kind.intersects(origin) {
                continue;
            }
            for name in &child.source_names {
                let slot = self.index.entry((name.clone(), origin)).or_default();
                if !slot.contains(&id) {
                    slot.push(id);
                }
            }
        }
        self.children.push(id);
    }

    /// Candidate children for `name` arriving from `origin`, in declared order.
    pub(crate) fn candidates(&self, name: &str, origin: SourceKind) -> &[RuleId] {
        self.index.get(&(name.to_string(), origin)).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Pick among `candidates` given the caller's context.
///
/// `context_of` maps a candidate to its declared context.
pub(crate) fn select_by_context<'a>(
    candidates: &[RuleId],
    context: Option<&str>,
    context_of: impl Fn(RuleId) -> Option<&'a str>,
) -> Option<RuleId> {
    if let Some(ctx) = context {
        if let Some(&exact) = candidates.iter().find(|&&id| context_of(id) == Some(ctx)) {
            return Some(exact);
        }
    }
    candidates.iter().copied().find(|&id| context_of(id).is_none())
}
