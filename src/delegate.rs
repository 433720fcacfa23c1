//! Optional hooks a caller can use to steer a translation.
//!
//! Every method has a default that declines, so a delegate implements only
//! what it needs. The translator borrows the delegate for the duration of a
//! run and never hands it a reference back to itself: hooks influence the
//! run only through their return values.
//!
//! ```text
//! group_start (compound) ──▶ object_instance   Provided | Skip | Default
//! group_end   (atomic)   ──▶ atomic_instance   Provided | Skip | Default -> coerce
//! attribute              ──▶ atomic_instance
//! group_end              ──▶ did_translate     Some(value) | None (suppress)
//! ```

use crate::Attributes;
use crate::value::{Value, ValueType};

/// Answer of an instantiation hook.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Instance {
    /// Let the translator construct or coerce the value.
    #[default]
    Default,
    /// Use this value.
    Provided(Value),
    /// Drop this group (and its subtree) or attribute.
    Skip,
}

/// Context for [`TranslatorDelegate::object_instance`].
#[derive(Debug, Clone, Copy)]
pub struct InstanceRequest<'a> {
    pub destination: &'a ValueType,
    pub source_name: &'a str,
    pub attributes: &'a Attributes,
    /// `None` for root objects.
    pub key_path: Option<&'a str>,
    pub context: Option<&'a str>,
}

/// Context for [`TranslatorDelegate::atomic_instance`].
#[derive(Debug, Clone, Copy)]
pub struct AtomicRequest<'a> {
    pub destination: &'a ValueType,
    pub text: &'a str,
    pub source_name: &'a str,
    /// `None` when the value comes from an attribute.
    pub attributes: Option<&'a Attributes>,
    pub key_path: Option<&'a str>,
    pub context: Option<&'a str>,
}

/// Context for [`TranslatorDelegate::did_translate`].
#[derive(Debug, Clone, Copy)]
pub struct Translated<'a> {
    pub source_name: &'a str,
    pub attributes: &'a Attributes,
    pub key_path: Option<&'a str>,
    /// Object the value is about to be written onto; `None` for root objects.
    pub parent: Option<&'a Value>,
    pub context: Option<&'a str>,
}

/// Hooks consulted by [`Translator`](crate::Translator).
pub trait TranslatorDelegate {
    /// Custom instantiation of a compound object.
    fn object_instance(&mut self, request: &InstanceRequest<'_>) -> Instance {
        let _ = request;
        Instance::Default
    }

    /// Called before a finished value is assigned. Return a replacement, the
    /// value itself, or `None` to suppress the assignment.
    fn did_translate(&mut self, value: Value, translated: &Translated<'_>) -> Option<Value> {
        let _ = translated;
        Some(value)
    }

    /// Custom conversion of leaf text, consulted before default coercion.
    fn atomic_instance(&mut self, request: &AtomicRequest<'_>) -> Instance {
        let _ = request;
        Instance::Default
    }
}

/// Declines everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelegate;

impl TranslatorDelegate for NoDelegate {}
