//! The translation state machine.
//!
//! A [`Translator`] is driven by group events and keeps one [`Frame`] per
//! open group on a stack whose bottom is the document boundary (bound to the
//! rule tree's root marker).
//!
//! ```text
//! Idle ──begin_translation──▶ Running ──finish──▶ Completed
//!                               │  └── first fatal error ──▶ Failed
//!                               │
//!   group_start: resolve child ─┬─ unmatched / skipped ─▶ push skip frame
//!                               ├─ atomic   ─▶ push frame, object absent
//!                               └─ compound ─▶ instantiate, apply attributes, push
//!
//!   group_end:   pop ─┬─ skip frame ─▶ no-op
//!                     └─ check required children
//!                        value = coerce(text) | object
//!                        did_translate ─▶ suppress | assign/append/require on parent
//!                                                    (root frame: append to roots)
//! ```
//!
//! The run is all-or-nothing: after the first fatal error every further event
//! is ignored and `finish` reports only that error.

use super::assign::{append, assign};
use super::coerce::coerce;
use super::frame::Frame;
use super::metrics::{RunMetrics, RunResult};
use crate::api::{Options, default_date_format};
use crate::delegate::{AtomicRequest, Instance, InstanceRequest, NoDelegate, Translated, TranslatorDelegate};
use crate::document::{Document, EventSink};
use crate::error::TranslateError;
use crate::rules::{Action, RuleId, RuleNode, RuleTree, Schema, SourceKind};
use crate::value::{Record, Value, ValueType};
use crate::Attributes;
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::time::Instant;

/// Observable phase of a [`Translator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatorState {
    Idle,
    Running,
    Completed,
    Failed,
}

enum Phase {
    Idle,
    Running(Run),
    Completed,
    Failed,
}

/// Event-driven translator bound to one rule tree.
///
/// The tree is borrowed and never mutated, so one tree can back many
/// translators. The delegate is borrowed for the translator's lifetime.
pub struct Translator<'t, 'd> {
    tree: &'t RuleTree,
    delegate: Option<&'d mut dyn TranslatorDelegate>,
    options: Options,
    phase: Phase,
}

impl<'t, 'd> Translator<'t, 'd> {
    pub fn new(tree: &'t RuleTree) -> Self {
        Translator { tree, delegate: None, options: Options::default(), phase: Phase::Idle }
    }

    pub fn with_delegate(mut self, delegate: &'d mut dyn TranslatorDelegate) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> TranslatorState {
        match &self.phase {
            Phase::Idle => TranslatorState::Idle,
            Phase::Running(run) if run.error.is_some() => TranslatorState::Failed,
            Phase::Running(_) => TranslatorState::Running,
            Phase::Completed => TranslatorState::Completed,
            Phase::Failed => TranslatorState::Failed,
        }
    }

    /// Start a fresh run. Any unfinished run is discarded.
    pub fn begin_translation(&mut self) {
        let date_format = self.options.date_format.clone().unwrap_or_else(default_date_format);
        tracing::debug!(rules = self.tree.len(), %date_format, "translation started");
        self.phase = Phase::Running(Run::new(date_format));
    }

    pub fn group_start(&mut self, name: &str, attributes: &Attributes, context: Option<&str>) -> ControlFlow<()> {
        let mut fallback = NoDelegate;
        let delegate: &mut dyn TranslatorDelegate = match self.delegate.as_deref_mut() {
            Some(delegate) => delegate,
            None => &mut fallback,
        };
        let run = match &mut self.phase {
            Phase::Running(run) => run,
            Phase::Idle => {
                let mut run = Run::new(default_date_format());
                run.fail(TranslateError::structural(format!("group {name:?} started before begin_translation")));
                self.phase = Phase::Running(run);
                return ControlFlow::Break(());
            }
            Phase::Completed | Phase::Failed => return ControlFlow::Break(()),
        };
        if run.error.is_some() {
            return ControlFlow::Break(());
        }
        let result = run.start(self.tree, delegate, name, attributes, context);
        run.settle(result)
    }

    pub fn group_end(&mut self, name: &str, text: Option<&str>) -> ControlFlow<()> {
        let mut fallback = NoDelegate;
        let delegate: &mut dyn TranslatorDelegate = match self.delegate.as_deref_mut() {
            Some(delegate) => delegate,
            None => &mut fallback,
        };
        let run = match &mut self.phase {
            Phase::Running(run) if run.error.is_none() => run,
            _ => return ControlFlow::Break(()),
        };
        let result = run.end(self.tree, delegate, name, text);
        run.settle(result)
    }

    /// Close the run and hand out the root objects.
    pub fn finish(&mut self) -> Result<Vec<Value>, TranslateError> {
        self.finish_with_metrics().map(|result| result.objects)
    }

    /// Like [`finish`](Self::finish), with the run's counters.
    pub fn finish_with_metrics(&mut self) -> Result<RunResult, TranslateError> {
        let run = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Running(run) => run,
            other => {
                self.phase = other;
                return Err(TranslateError::structural("finish called without a running translation"));
            }
        };
        let result = run.complete(self.tree);
        self.phase = if result.is_ok() { Phase::Completed } else { Phase::Failed };
        result
    }

    /// Translate a whole document: begin, replay its events, finish.
    pub fn translate(&mut self, document: &dyn Document) -> Result<Vec<Value>, TranslateError> {
        self.begin_translation();
        let _ = document.emit(self);
        self.finish()
    }

    /// Like [`translate`](Self::translate), with the run's counters.
    pub fn translate_with_metrics(&mut self, document: &dyn Document) -> Result<RunResult, TranslateError> {
        self.begin_translation();
        let _ = document.emit(self);
        self.finish_with_metrics()
    }
}

impl EventSink for Translator<'_, '_> {
    fn group_start(&mut self, name: &str, attributes: &Attributes, context: Option<&str>) -> ControlFlow<()> {
        Translator::group_start(self, name, attributes, context)
    }

    fn group_end(&mut self, name: &str, text: Option<&str>) -> ControlFlow<()> {
        Translator::group_end(self, name, text)
    }
}

/// State of one run. Never outlives a `begin_translation` / `finish` pair.
struct Run {
    frames: Vec<Frame>,
    roots: Vec<Value>,
    error: Option<TranslateError>,
    date_format: String,
    metrics: RunMetrics,
    started: Instant,
}

impl Run {
    fn new(date_format: String) -> Self {
        Run {
            frames: vec![Frame::root()],
            roots: Vec::new(),
            error: None,
            date_format,
            metrics: RunMetrics::default(),
            started: Instant::now(),
        }
    }

    /// Record the first fatal error and drop everything built so far.
    fn fail(&mut self, error: TranslateError) {
        if self.error.is_none() {
            tracing::debug!(%error, depth = self.frames.len() - 1, "translation failed");
            self.roots.clear();
            self.error = Some(error);
        }
    }

    fn settle(&mut self, result: Result<(), TranslateError>) -> ControlFlow<()> {
        match result {
            Ok(()) => ControlFlow::Continue(()),
            Err(error) => {
                self.fail(error);
                ControlFlow::Break(())
            }
        }
    }

    fn push(&mut self, frame: Frame) {
        self.metrics.max_depth = self.metrics.max_depth.max(frame.depth);
        self.frames.push(frame);
    }

    fn start(
        &mut self,
        tree: &RuleTree,
        delegate: &mut dyn TranslatorDelegate,
        name: &str,
        attributes: &Attributes,
        context_override: Option<&str>,
    ) -> Result<(), TranslateError> {
        self.metrics.events += 1;
        let depth = self.frames.len();
        let parent = self.frames.last().ok_or_else(|| TranslateError::structural("frame stack is empty"))?;

        let Some(parent_rule) = parent.rule else {
            self.push(Frame::skip(name, depth));
            return Ok(());
        };

        let context = context_override.map(str::to_string).or_else(|| parent.context.clone());
        let Some(child_id) = tree.resolve_child(parent_rule, name, SourceKind::VALUE, context.as_deref()) else {
            tracing::trace!(name, depth, context = context.as_deref(), "unmatched group skipped");
            self.metrics.groups_unmatched += 1;
            self.push(Frame::skip(name, depth));
            return Ok(());
        };

        let child = tree.node(child_id);
        let key_path = (!parent.is_root()).then(|| child.key_path());
        let destination = destination_for(tree.schema(), child, parent.object.as_ref());
        let frame_context = context_override.map(str::to_string).or_else(|| child.context.clone()).or(context);

        let mut frame = Frame {
            source_name: name.to_string(),
            rule: Some(child_id),
            depth,
            object: None,
            destination,
            attributes: attributes.clone(),
            context: frame_context,
            satisfied: HashSet::new(),
        };

        if !child.is_atomic() {
            let request = InstanceRequest {
                destination: &frame.destination,
                source_name: name,
                attributes,
                key_path,
                context: frame.context.as_deref(),
            };
            let object = match delegate.object_instance(&request) {
                Instance::Skip => {
                    tracing::trace!(name, depth, "group skipped by delegate");
                    self.metrics.groups_skipped += 1;
                    self.push(Frame::skip(name, depth));
                    return Ok(());
                }
                Instance::Provided(object) => object,
                Instance::Default => instantiate(&frame.destination),
            };
            frame.object = Some(object);
            self.apply_attributes(tree, delegate, child_id, &mut frame)?;
        }

        tracing::trace!(name, depth, rule = %child.label(), atomic = child.is_atomic(), "group matched");
        self.metrics.groups_matched += 1;
        self.push(frame);
        Ok(())
    }

    /// Resolve attribute-kind children of `rule` against the frame's attributes.
    fn apply_attributes(
        &mut self,
        tree: &RuleTree,
        delegate: &mut dyn TranslatorDelegate,
        rule: RuleId,
        frame: &mut Frame,
    ) -> Result<(), TranslateError> {
        let required = tree.required_children_in(rule, frame.context.as_deref());
        for required in required.into_iter().filter(|n| n.kind() == SourceKind::ATTRIBUTE) {
            if !required.source_names().iter().any(|n| frame.attributes.contains_key(n)) {
                return Err(TranslateError::MissingRequiredAttribute {
                    element: frame.source_name.clone(),
                    attribute: required.label(),
                    key_path: required.key_path().to_string(),
                });
            }
        }

        let Frame { attributes, object, satisfied, context, .. } = frame;
        let Some(object) = object.as_mut() else {
            return Ok(());
        };

        for (key, text) in attributes.iter() {
            let Some(attribute_id) = tree.resolve_child(rule, key, SourceKind::ATTRIBUTE, context.as_deref()) else {
                continue;
            };
            let attribute = tree.node(attribute_id);
            let destination = destination_for(tree.schema(), attribute, Some(&*object));
            let request = AtomicRequest {
                destination: &destination,
                text,
                source_name: key,
                attributes: None,
                key_path: Some(attribute.key_path()),
                context: context.as_deref(),
            };
            let value = match delegate.atomic_instance(&request) {
                Instance::Skip => {
                    self.metrics.groups_skipped += 1;
                    continue;
                }
                Instance::Provided(value) => value,
                Instance::Default => coerce(text, &destination, &self.date_format).map_err(|error| {
                    TranslateError::Coercion {
                        source_name: key.clone(),
                        key_path: attribute.key_path().to_string(),
                        error,
                    }
                })?,
            };
            tracing::trace!(attribute = %key, key_path = attribute.key_path(), "attribute applied");
            apply_action(object, attribute, value, satisfied, tree.schema())?;
        }
        Ok(())
    }

    fn end(
        &mut self,
        tree: &RuleTree,
        delegate: &mut dyn TranslatorDelegate,
        name: &str,
        text: Option<&str>,
    ) -> Result<(), TranslateError> {
        self.metrics.events += 1;
        if self.frames.len() <= 1 {
            return Err(TranslateError::structural(format!("group {name:?} ended but no group is open")));
        }
        let Some(frame) = self.frames.pop() else {
            return Err(TranslateError::structural("frame stack is empty"));
        };
        if frame.source_name != name {
            return Err(TranslateError::structural(format!(
                "group {name:?} ended while {:?} is open",
                frame.source_name
            )));
        }
        let Some(rule_id) = frame.rule else {
            return Ok(());
        };

        check_required(tree, rule_id, &frame)?;

        let rule = tree.node(rule_id);
        let parent = self.frames.last_mut().ok_or_else(|| TranslateError::structural("frame stack is empty"))?;
        let key_path = (!parent.is_root()).then(|| rule.key_path());

        let value = match frame.object {
            Some(object) => object,
            None => {
                let text = text.unwrap_or("");
                let request = AtomicRequest {
                    destination: &frame.destination,
                    text,
                    source_name: name,
                    attributes: Some(&frame.attributes),
                    key_path,
                    context: frame.context.as_deref(),
                };
                match delegate.atomic_instance(&request) {
                    Instance::Skip => {
                        tracing::trace!(name, "atomic value skipped by delegate");
                        self.metrics.groups_skipped += 1;
                        return Ok(());
                    }
                    Instance::Provided(value) => value,
                    Instance::Default => coerce(text, &frame.destination, &self.date_format).map_err(|error| {
                        TranslateError::Coercion {
                            source_name: name.to_string(),
                            key_path: rule.key_path().to_string(),
                            error,
                        }
                    })?,
                }
            }
        };

        let translated = Translated {
            source_name: name,
            attributes: &frame.attributes,
            key_path,
            parent: parent.object.as_ref(),
            context: frame.context.as_deref(),
        };
        let Some(value) = delegate.did_translate(value, &translated) else {
            tracing::trace!(name, "value suppressed by delegate");
            self.metrics.suppressed += 1;
            return Ok(());
        };

        if parent.is_root() {
            if rule.action() == Action::Require {
                parent.satisfied.insert(rule.key_path().to_string());
            }
            tracing::trace!(name, roots = self.roots.len() + 1, "root object committed");
            self.roots.push(value);
            return Ok(());
        }

        let target = parent.object.as_mut().ok_or_else(|| TranslateError::InvalidTarget {
            action: "assign",
            key_path: rule.key_path().to_string(),
            found: "atomic value",
        })?;
        tracing::trace!(name, key_path = rule.key_path(), action = ?rule.action(), "value assigned");
        apply_action(target, rule, value, &mut parent.satisfied, tree.schema())
    }

    /// Close the document boundary.
    fn complete(mut self, tree: &RuleTree) -> Result<RunResult, TranslateError> {
        if self.error.is_none() {
            let open: Vec<&str> = self.frames.iter().skip(1).map(|f| f.source_name.as_str()).collect();
            let result = if !open.is_empty() {
                Err(TranslateError::structural(format!("document ended with open groups {open:?}")))
            } else {
                check_required(tree, RuleTree::ROOT, &self.frames[0])
            };
            if let Err(error) = result {
                self.fail(error);
            }
        }

        self.metrics.elapsed = self.started.elapsed();
        match self.error {
            Some(error) => Err(error),
            None => {
                tracing::debug!(
                    roots = self.roots.len(),
                    matched = self.metrics.groups_matched,
                    unmatched = self.metrics.groups_unmatched,
                    elapsed = ?self.metrics.elapsed,
                    "translation completed"
                );
                Ok(RunResult { objects: self.roots, metrics: self.metrics })
            }
        }
    }
}

/// Every `Require` child of `rule` reachable in the frame's context must have
/// fired while `frame` was open.
fn check_required(tree: &RuleTree, rule: RuleId, frame: &Frame) -> Result<(), TranslateError> {
    let required = tree.required_children_in(rule, frame.context.as_deref());
    match required.into_iter().find(|n| !frame.satisfied.contains(n.key_path())) {
        Some(missing) => Err(TranslateError::MissingRequired {
            parent: if frame.is_root() { "<document>".to_string() } else { frame.source_name.clone() },
            rule: missing.label(),
            key_path: missing.key_path().to_string(),
        }),
        None => Ok(()),
    }
}

fn apply_action(
    target: &mut Value,
    rule: &RuleNode,
    value: Value,
    satisfied: &mut HashSet<String>,
    schema: &Schema,
) -> Result<(), TranslateError> {
    match rule.action() {
        Action::Assign => assign(target, rule.key_path(), value, schema),
        Action::Append => append(target, rule.key_path(), value, schema),
        Action::Require => {
            assign(target, rule.key_path(), value, schema)?;
            satisfied.insert(rule.key_path().to_string());
            Ok(())
        }
    }
}

/// Destination type: explicit on the rule, else declared on the parent's
/// class, else a generic fallback.
fn destination_for(schema: &Schema, rule: &RuleNode, parent: Option<&Value>) -> ValueType {
    if let Some(explicit) = rule.destination() {
        return explicit.clone();
    }
    let declared = parent
        .and_then(Value::as_record)
        .and_then(Record::class)
        .and_then(|class| schema.property_type(class, rule.key_path()))
        .map(|ty| if rule.action() == Action::Append { ty.element() } else { ty });

    match declared {
        Some(ty) if rule.is_atomic() && ty.is_atomic() => ty.clone(),
        Some(ty @ ValueType::Record(_)) if !rule.is_atomic() => ty.clone(),
        _ if rule.is_atomic() => ValueType::String,
        _ => ValueType::Any,
    }
}

/// Default construction for a compound destination.
fn instantiate(destination: &ValueType) -> Value {
    match destination {
        ValueType::Record(class) => Value::Record(Record::new(class.clone())),
        _ => Value::Record(Record::generic()),
    }
}
