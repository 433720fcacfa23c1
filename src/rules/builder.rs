//! Rule tree construction and validation.
//!
//! This is the *static* side of a translation: a tree is assembled once,
//! checked as it grows, then frozen into a [`RuleTree`] that any number of
//! runs can share.
//!
//! ```text
//! RuleTreeBuilder::new()
//!   .add_rule(ROOT, RuleSpec)   ── validate against parent + siblings
//!   .add_rule(book, RuleSpec)   ── index under (name, origin)
//!   .define_class(ClassDef)
//!   .build()                    ──▶ RuleTree (immutable, Send + Sync)
//! ```
//!
//! ## Invariants
//!
//! - `RuleId` is an index into `RuleTree::nodes`; node `0` is the root marker.
//! - No two children of one parent share a source name, an origin and a
//!   context. Violations are `ConfigurationError::Ambiguous`.
//! - Attribute rules and atomic rules are leaves.
//! - Destinations name element types; collections only arise from `Append`.

use super::node::{Action, RuleId, RuleNode, SourceKind, select_by_context};
use super::schema::{ClassDef, Schema};
use crate::error::ConfigurationError;
use crate::value::ValueType;

/// Declarative description of one rule, consumed by [`RuleTreeBuilder::add_rule`].
#[derive(Debug, Clone)]
pub struct RuleSpec {
    source_names: Vec<String>,
    kind: SourceKind,
    action: Action,
    key_path: String,
    destination: Option<ValueType>,
    context: Option<String>,
}

impl RuleSpec {
    pub fn new<S: Into<String>>(source_names: impl IntoIterator<Item = S>, kind: SourceKind) -> Self {
        RuleSpec {
            source_names: source_names.into_iter().map(Into::into).collect(),
            kind,
            action: Action::Assign,
            key_path: String::new(),
            destination: None,
            context: None,
        }
    }

    /// Matches nested groups only.
    pub fn value<S: Into<String>>(source_names: impl IntoIterator<Item = S>) -> Self {
        Self::new(source_names, SourceKind::VALUE)
    }

    /// Matches attributes only.
    pub fn attribute<S: Into<String>>(source_names: impl IntoIterator<Item = S>) -> Self {
        Self::new(source_names, SourceKind::ATTRIBUTE)
    }

    /// Matches attributes and nested groups.
    pub fn any<S: Into<String>>(source_names: impl IntoIterator<Item = S>) -> Self {
        Self::new(source_names, SourceKind::ANY)
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn require(self) -> Self {
        self.action(Action::Require)
    }

    pub fn append(self) -> Self {
        self.action(Action::Append)
    }

    /// Destination key path. Defaults to the first source name.
    pub fn key_path(mut self, key_path: impl Into<String>) -> Self {
        self.key_path = key_path.into();
        self
    }

    pub fn destination(mut self, ty: ValueType) -> Self {
        self.destination = Some(ty);
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Assembles a [`RuleTree`].
#[derive(Debug, Clone)]
pub struct RuleTreeBuilder {
    nodes: Vec<RuleNode>,
    schema: Schema,
}

impl Default for RuleTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTreeBuilder {
    pub fn new() -> Self {
        RuleTreeBuilder { nodes: vec![RuleNode::root()], schema: Schema::default() }
    }

    /// The root marker; top-level rules are added under it.
    pub fn root(&self) -> RuleId {
        RuleTree::ROOT
    }

    /// Register property declarations used for destination type inference.
    pub fn define_class(&mut self, class: ClassDef) -> &mut Self {
        self.schema.insert(class);
        self
    }

    /// Add a rule under `parent` and return its id.
    ///
    /// Every structural check happens here, so a tree that finishes building
    /// is valid.
    pub fn add_rule(&mut self, parent: RuleId, spec: RuleSpec) -> Result<RuleId, ConfigurationError> {
        let parent_node = self.nodes.get(parent).ok_or(ConfigurationError::UnknownParent(parent))?;
        let parent_label = parent_node.label();

        let mut source_names = Vec::with_capacity(spec.source_names.len());
        for name in spec.source_names {
            if !source_names.contains(&name) {
                source_names.push(name);
            }
        }
        let Some(first_name) = source_names.first() else {
            return Err(ConfigurationError::NoSourceNames { parent: parent_label });
        };
        let label = source_names.join("|");

        if parent != RuleTree::ROOT {
            if parent_node.kind == SourceKind::ATTRIBUTE {
                return Err(ConfigurationError::AttributeWithChildren { rule: parent_label });
            }
            if let Some(destination) = parent_node.destination.as_ref().filter(|ty| ty.is_atomic()) {
                return Err(ConfigurationError::AtomicWithChildren {
                    rule: parent_label,
                    destination: destination.clone(),
                });
            }
        }

        let key_path = if spec.key_path.is_empty() { first_name.clone() } else { spec.key_path };
        if !crate::regex!(r"^[^.\s]+(\.[^.\s]+)*$").is_match(&key_path) {
            return Err(ConfigurationError::InvalidKeyPath { rule: label, key_path });
        }

        if let Some(destination) = spec.destination.as_ref().filter(|ty| ty.is_collection()) {
            return Err(ConfigurationError::CollectionDestination { rule: label, destination: destination.clone() });
        }
        if spec.kind == SourceKind::ATTRIBUTE {
            if let Some(destination) = spec.destination.as_ref().filter(|ty| !ty.is_atomic()) {
                return Err(ConfigurationError::AttributeNotAtomic { rule: label, destination: destination.clone() });
            }
        }

        for &sibling_id in &parent_node.children {
            let sibling = &self.nodes[sibling_id];
            if !sibling.kind.intersects(spec.kind) || sibling.context != spec.context {
                continue;
            }
            if let Some(name) = source_names.iter().find(|n| sibling.matches_name(n)) {
                return Err(ConfigurationError::Ambiguous {
                    parent: parent_label,
                    name: name.clone(),
                    first: sibling.label(),
                    second: label,
                });
            }
        }

        let node = RuleNode {
            source_names,
            kind: spec.kind,
            action: spec.action,
            key_path,
            destination: spec.destination,
            context: spec.context,
            children: Vec::new(),
            index: Default::default(),
        };

        let id = self.nodes.len();
        self.nodes[parent].index_child(id, &node);
        self.nodes.push(node);
        tracing::trace!(rule = %label, id, parent, "rule added");
        Ok(id)
    }

    /// Freeze the tree.
    pub fn build(self) -> RuleTree {
        RuleTree { nodes: self.nodes, schema: self.schema }
    }
}

/// Immutable, shareable rule tree.
#[derive(Debug, Clone)]
pub struct RuleTree {
    nodes: Vec<RuleNode>,
    schema: Schema,
}

impl RuleTree {
    /// Id of the root marker node.
    pub const ROOT: RuleId = 0;

    pub fn builder() -> RuleTreeBuilder {
        RuleTreeBuilder::new()
    }

    /// The node behind `id`.
    ///
    /// # Panics
    ///
    /// If `id` was not returned by the builder of this tree.
    pub fn node(&self, id: RuleId) -> &RuleNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root marker exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Resolve the child of `parent` matching `name` from `origin` under `context`.
    ///
    /// `None` means unmatched; callers skip the group.
    pub fn resolve_child(
        &self,
        parent: RuleId,
        name: &str,
        origin: SourceKind,
        context: Option<&str>,
    ) -> Option<RuleId> {
        let candidates = self.nodes.get(parent)?.candidates(name, origin);
        select_by_context(candidates, context, |id| self.nodes[id].context.as_deref())
    }

    /// Children of `parent` with the `Require` action, in declared order.
    ///
    /// # Panics
    ///
    /// If `parent` was not returned by the builder of this tree.
    pub fn required_children(&self, parent: RuleId) -> impl Iterator<Item = &RuleNode> + '_ {
        self.nodes[parent].children.iter().map(|&id| &self.nodes[id]).filter(|n| n.action == Action::Require)
    }

    /// `Require` children of `parent` that resolution can reach under `context`.
    ///
    /// A rule scoped to another context never matches, and a context-free rule
    /// is shadowed by a sibling scoped to `context` for the same name.
    ///
    /// # Panics
    ///
    /// If `parent` was not returned by the builder of this tree.
    pub fn required_children_in(&self, parent: RuleId, context: Option<&str>) -> Vec<&RuleNode> {
        self.nodes[parent]
            .children
            .iter()
            .copied()
            .filter(|&id| self.nodes[id].action == Action::Require && self.reachable(parent, id, context))
            .map(|id| &self.nodes[id])
            .collect()
    }

    fn reachable(&self, parent: RuleId, id: RuleId, context: Option<&str>) -> bool {
        let node = &self.nodes[id];
        [SourceKind::ATTRIBUTE, SourceKind::VALUE].into_iter().filter(|&origin| node.kind.intersects(origin)).any(
            |origin| node.source_names.iter().any(|name| self.resolve_child(parent, name, origin, context) == Some(id)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_path_defaults_to_first_source_name() {
        let mut builder = RuleTree::builder();
        let id = builder.add_rule(RuleTree::ROOT, RuleSpec::value(["author", "writer"])).unwrap();
        let tree = builder.build();

        assert_eq!(tree.node(id).key_path(), "author");
        assert_eq!(tree.resolve_child(RuleTree::ROOT, "writer", SourceKind::VALUE, None), Some(id));
        assert_eq!(tree.resolve_child(RuleTree::ROOT, "writer", SourceKind::ATTRIBUTE, None), None);
    }

    #[test]
    fn same_name_different_context_is_not_ambiguous() {
        let mut builder = RuleTree::builder();
        let plain = builder.add_rule(RuleTree::ROOT, RuleSpec::value(["title"])).unwrap();
        let feed = builder.add_rule(RuleTree::ROOT, RuleSpec::value(["title"]).context("feed")).unwrap();
        let tree = builder.build();

        assert_eq!(tree.resolve_child(RuleTree::ROOT, "title", SourceKind::VALUE, Some("feed")), Some(feed));
        assert_eq!(tree.resolve_child(RuleTree::ROOT, "title", SourceKind::VALUE, Some("entry")), Some(plain));
        assert_eq!(tree.resolve_child(RuleTree::ROOT, "title", SourceKind::VALUE, None), Some(plain));
    }

    #[test]
    fn attribute_and_value_rules_for_one_name_coexist() {
        let mut builder = RuleTree::builder();
        builder.add_rule(RuleTree::ROOT, RuleSpec::attribute(["id"])).unwrap();
        builder.add_rule(RuleTree::ROOT, RuleSpec::value(["id"])).unwrap();
        assert_eq!(builder.build().len(), 3);
    }

    #[test]
    fn rejects_ambiguous_siblings() {
        let mut builder = RuleTree::builder();
        builder.add_rule(RuleTree::ROOT, RuleSpec::any(["id"])).unwrap();
        let err = builder.add_rule(RuleTree::ROOT, RuleSpec::attribute(["key", "id"])).unwrap_err();

        assert_eq!(
            err,
            ConfigurationError::Ambiguous {
                parent: "<root>".into(),
                name: "id".into(),
                first: "id".into(),
                second: "key|id".into(),
            }
        );
    }

    #[test]
    fn rejects_structural_defects() {
        let mut builder = RuleTree::builder();
        let attr = builder.add_rule(RuleTree::ROOT, RuleSpec::attribute(["lang"])).unwrap();
        let leaf = builder.add_rule(RuleTree::ROOT, RuleSpec::value(["year"]).destination(ValueType::Integer)).unwrap();

        assert!(matches!(
            builder.add_rule(attr, RuleSpec::value(["x"])),
            Err(ConfigurationError::AttributeWithChildren { .. })
        ));
        assert!(matches!(
            builder.add_rule(leaf, RuleSpec::value(["x"])),
            Err(ConfigurationError::AtomicWithChildren { .. })
        ));
        assert!(matches!(
            builder.add_rule(RuleTree::ROOT, RuleSpec::attribute(["meta"]).destination(ValueType::record("Meta"))),
            Err(ConfigurationError::AttributeNotAtomic { .. })
        ));
        assert!(matches!(
            builder.add_rule(RuleTree::ROOT, RuleSpec::value(["tags"]).destination(ValueType::list(ValueType::String))),
            Err(ConfigurationError::CollectionDestination { .. })
        ));
        assert!(matches!(
            builder.add_rule(RuleTree::ROOT, RuleSpec::value(Vec::<String>::new())),
            Err(ConfigurationError::NoSourceNames { .. })
        ));
        assert!(matches!(
            builder.add_rule(RuleTree::ROOT, RuleSpec::value(["a"]).key_path("a..b")),
            Err(ConfigurationError::InvalidKeyPath { .. })
        ));
        assert_eq!(builder.add_rule(42, RuleSpec::value(["a"])), Err(ConfigurationError::UnknownParent(42)));
    }

    #[test]
    fn required_children_in_declared_order() {
        let mut builder = RuleTree::builder();
        let book = builder.add_rule(RuleTree::ROOT, RuleSpec::value(["book"])).unwrap();
        builder.add_rule(book, RuleSpec::value(["title"]).require()).unwrap();
        builder.add_rule(book, RuleSpec::value(["note"])).unwrap();
        builder.add_rule(book, RuleSpec::attribute(["id"]).require()).unwrap();
        let tree = builder.build();

        let required: Vec<&str> = tree.required_children(book).map(|n| n.key_path()).collect();
        assert_eq!(required, ["title", "id"]);
        assert!(!tree.node(book).is_atomic());
    }

    #[test]
    fn required_children_follow_context_resolution() {
        let mut builder = RuleTree::builder();
        let entry = builder.add_rule(RuleTree::ROOT, RuleSpec::value(["entry"])).unwrap();
        builder.add_rule(entry, RuleSpec::value(["title"]).require()).unwrap();
        builder.add_rule(entry, RuleSpec::value(["title"]).require().context("feed").key_path("feedTitle")).unwrap();
        builder.add_rule(entry, RuleSpec::attribute(["id"]).require().context("feed")).unwrap();
        let tree = builder.build();

        fn key_paths<'t>(tree: &'t RuleTree, parent: RuleId, context: Option<&str>) -> Vec<&'t str> {
            tree.required_children_in(parent, context).into_iter().map(|n| n.key_path()).collect()
        }
        assert_eq!(key_paths(&tree, entry, None), ["title"]);
        assert_eq!(key_paths(&tree, entry, Some("other")), ["title"]);
        assert_eq!(key_paths(&tree, entry, Some("feed")), ["feedTitle", "id"]);
    }
}
