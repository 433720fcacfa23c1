//! Translation engine.
//!
//! This module is the *run* side of the crate: everything that happens while
//! a document's group events stream through a [`Translator`].
//!
//! ## How the parts work together
//!
//! ```text
//! adapter (Document::emit)
//!   │ group_start / group_end
//!   v
//! Translator (translator.rs) ── RuleTree::resolve_child ──▶ matched rule | skip
//!   │  one Frame per open group (frame.rs)
//!   │
//!   ├─ leaf text ──▶ coerce (coerce.rs)
//!   ├─ finished value ──▶ assign / append at key path (assign.rs)
//!   └─ counters ──▶ RunMetrics (metrics.rs)
//!   v
//! Vec<Value> root objects | TranslateError
//! ```
//!
//! ## Responsibilities by module
//!
//! - `translator.rs`: the state machine, delegate consultation, required-rule
//!   bookkeeping, all-or-nothing error handling.
//! - `frame.rs`: per-group stack entries.
//! - `assign.rs`: key-path writes and lazy collection creation.
//! - `coerce.rs`: text to scalar conversion.
//! - `metrics.rs`: per-run counters.
//!
//! ## Debugging
//!
//! The engine emits `tracing` events: `debug` for run start, completion and
//! failure, `trace` for every match, skip and assignment. Install any
//! subscriber (e.g. `tracing_subscriber::fmt` with `RUST_LOG=rulebind=trace`)
//! to see them.

#[path = "engine/assign.rs"]
mod assign;
#[path = "engine/coerce.rs"]
mod coerce;
#[path = "engine/frame.rs"]
mod frame;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/translator.rs"]
mod translator;

pub use metrics::{RunMetrics, RunResult};
pub use translator::{Translator, TranslatorState};
