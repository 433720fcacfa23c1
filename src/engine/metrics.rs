//! Translation run metrics.
//!
//! Counters are cheap and always collected; `Translator::finish_with_metrics`
//! hands them out alongside the root objects. They are meant for debugging
//! rule trees ("why did nothing match?") rather than for profiling.

use crate::value::Value;
use std::time::Duration;

// --- Metrics -----------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunMetrics {
    /// Group start and end events received.
    pub events: usize,
    /// Groups that matched a rule and were translated.
    pub groups_matched: usize,
    /// Groups with no matching rule (skipped with their subtree).
    pub groups_unmatched: usize,
    /// Groups or attributes the delegate asked to skip.
    pub groups_skipped: usize,
    /// Values the delegate suppressed at `did_translate`.
    pub suppressed: usize,
    /// Deepest nesting seen, the document boundary being depth 0.
    pub max_depth: usize,
    /// Wall time between `begin_translation` and `finish`.
    pub elapsed: Duration,
}

/// Root objects bundled with the metrics of the run that produced them.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub objects: Vec<Value>,
    pub metrics: RunMetrics,
}
