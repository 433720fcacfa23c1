use crate::delegate::TranslatorDelegate;
use crate::document::Document;
use crate::engine::{RunResult, Translator};
use crate::error::TranslateError;
use crate::rules::RuleTree;
use crate::value::Value;
use once_cell::sync::Lazy;
use std::sync::RwLock;

/// Date format used when neither [`Options`] nor [`set_default_date_format`] say otherwise.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static DEFAULT_DATE_FORMAT: Lazy<RwLock<String>> = Lazy::new(|| RwLock::new(ISO_DATE_FORMAT.to_string()));

/// Process-wide date format (chrono `strftime` syntax) used by runs whose
/// [`Options::date_format`] is unset.
pub fn default_date_format() -> String {
    match DEFAULT_DATE_FORMAT.read() {
        Ok(format) => format.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replace the process-wide date format.
///
/// Runs take a snapshot when they begin, so this never affects a run in
/// flight. Set it before starting concurrent runs: which runs observe a
/// change made while others start is unspecified. Prefer
/// [`Options::date_format`] where possible.
pub fn set_default_date_format(format: impl Into<String>) {
    let format = format.into();
    match DEFAULT_DATE_FORMAT.write() {
        Ok(mut slot) => *slot = format,
        Err(poisoned) => *poisoned.into_inner() = format,
    }
}

/// Per-run options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Date format for this run; falls back to [`default_date_format`].
    pub date_format: Option<String>,
}

impl Options {
    pub fn with_date_format(format: impl Into<String>) -> Self {
        Options { date_format: Some(format.into()) }
    }
}

/// Translate `document` with `tree`, no delegate and default [`Options`].
///
/// # Example
/// ```
/// use rulebind::{EventStream, RuleSpec, RuleTree, Value, attrs, translate};
///
/// let mut builder = RuleTree::builder();
/// let book = builder.add_rule(RuleTree::ROOT, RuleSpec::value(["book"])).unwrap();
/// builder.add_rule(book, RuleSpec::attribute(["isbn"])).unwrap();
/// let tree = builder.build();
///
/// let doc = EventStream::new().start("book", attrs! { "isbn" => "123" }).end("book");
/// let books = translate(&tree, &doc).unwrap();
/// assert_eq!(books[0].as_record().unwrap().get("isbn"), Some(&Value::from("123")));
/// ```
pub fn translate(tree: &RuleTree, document: &dyn Document) -> Result<Vec<Value>, TranslateError> {
    Translator::new(tree).translate(document)
}

/// Translate `document` with an optional delegate and explicit options.
pub fn translate_with(
    tree: &RuleTree,
    document: &dyn Document,
    delegate: Option<&mut dyn TranslatorDelegate>,
    options: &Options,
) -> Result<Vec<Value>, TranslateError> {
    translator(tree, delegate, options).translate(document)
}

/// Like [`translate_with`], returning the run's metrics too.
pub fn translate_verbose(
    tree: &RuleTree,
    document: &dyn Document,
    delegate: Option<&mut dyn TranslatorDelegate>,
    options: &Options,
) -> Result<RunResult, TranslateError> {
    translator(tree, delegate, options).translate_with_metrics(document)
}

fn translator<'t, 'd>(
    tree: &'t RuleTree,
    delegate: Option<&'d mut dyn TranslatorDelegate>,
    options: &Options,
) -> Translator<'t, 'd> {
    let translator = Translator::new(tree).with_options(options.clone());
    match delegate {
        Some(delegate) => translator.with_delegate(delegate),
        None => translator,
    }
}
