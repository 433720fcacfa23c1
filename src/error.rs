use crate::value::ValueType;
use thiserror::Error;

/// Coarse classification of a [`TranslateError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Configuration,
    MissingRequired,
    MissingRequiredAttribute,
    Coercion,
    Structural,
    InvalidTarget,
}

/// Rule tree defects, reported by [`RuleTreeBuilder`](crate::RuleTreeBuilder) before any run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("rule under {parent:?} has no source names")]
    NoSourceNames { parent: String },

    #[error("unknown parent rule id {0}")]
    UnknownParent(usize),

    #[error("invalid key path {key_path:?} on rule {rule:?}")]
    InvalidKeyPath { rule: String, key_path: String },

    #[error("rules {first:?} and {second:?} both match source name {name:?} under {parent:?}")]
    Ambiguous { parent: String, name: String, first: String, second: String },

    #[error("attribute rule {rule:?} cannot have child rules")]
    AttributeWithChildren { rule: String },

    #[error("attribute rule {rule:?} cannot target non-atomic type {destination}")]
    AttributeNotAtomic { rule: String, destination: ValueType },

    #[error("rule {rule:?} names collection type {destination}; name the element type and use Append")]
    CollectionDestination { rule: String, destination: ValueType },

    #[error("atomic rule {rule:?} ({destination}) cannot have child rules")]
    AtomicWithChildren { rule: String, destination: ValueType },
}

/// Leaf text that could not be converted to its declared type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoercionError {
    #[error("{text:?} is not a valid {target}")]
    Malformed { text: String, target: ValueType },

    #[error("{text:?} does not match date format {format:?}")]
    Date { text: String, format: String },

    #[error("cannot coerce text into non-atomic type {0}")]
    NotAtomic(ValueType),
}

/// The single fatal error of a translation run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslateError {
    #[error("invalid rule tree: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("required {rule:?} (key path {key_path:?}) never appeared inside {parent:?}")]
    MissingRequired { parent: String, rule: String, key_path: String },

    #[error("element {element:?} is missing required attribute {attribute:?}")]
    MissingRequiredAttribute { element: String, attribute: String, key_path: String },

    #[error("cannot translate {source_name:?} into {key_path:?}: {error}")]
    Coercion { source_name: String, key_path: String, error: CoercionError },

    #[error("malformed event stream: {0}")]
    Structural(String),

    #[error("cannot {action} {key_path:?} on a {found}")]
    InvalidTarget { action: &'static str, key_path: String, found: &'static str },
}

impl TranslateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslateError::Configuration(_) => ErrorKind::Configuration,
            TranslateError::MissingRequired { .. } => ErrorKind::MissingRequired,
            TranslateError::MissingRequiredAttribute { .. } => ErrorKind::MissingRequiredAttribute,
            TranslateError::Coercion { .. } => ErrorKind::Coercion,
            TranslateError::Structural(_) => ErrorKind::Structural,
            TranslateError::InvalidTarget { .. } => ErrorKind::InvalidTarget,
        }
    }

    pub(crate) fn structural(message: impl Into<String>) -> Self {
        TranslateError::Structural(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        let cases = [
            (TranslateError::from(ConfigurationError::UnknownParent(3)), ErrorKind::Configuration),
            (TranslateError::structural("unbalanced"), ErrorKind::Structural),
            (
                TranslateError::MissingRequiredAttribute {
                    element: "book".into(),
                    attribute: "id".into(),
                    key_path: "id".into(),
                },
                ErrorKind::MissingRequiredAttribute,
            ),
        ];
        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "{error}");
        }
    }

    #[test]
    fn messages_carry_context() {
        let err = TranslateError::Coercion {
            source_name: "year".into(),
            key_path: "published".into(),
            error: CoercionError::Malformed { text: "soon".into(), target: ValueType::Integer },
        };
        assert_eq!(err.to_string(), "cannot translate \"year\" into \"published\": \"soon\" is not a valid integer");
    }
}
