//! The static side of a translation: rule nodes, the tree that holds them,
//! and the class declarations used for type inference.
//!
//! - `node.rs`: [`RuleNode`], [`SourceKind`], [`Action`] and child resolution.
//! - `builder.rs`: [`RuleSpec`], [`RuleTreeBuilder`] and the frozen [`RuleTree`].
//! - `schema.rs`: [`ClassDef`] and [`Schema`].

#[path = "rules/builder.rs"]
mod builder;
#[path = "rules/node.rs"]
mod node;
#[path = "rules/schema.rs"]
mod schema;

pub use builder::{RuleSpec, RuleTree, RuleTreeBuilder};
pub use node::{Action, RuleId, RuleNode, SourceKind};
pub use schema::{ClassDef, Schema};
