use std::panic::Location;

use proc_macro2::Span;
use thiserror::Error;

use crate::attrs::AttrKind;

/// A declaration the resolver refuses to plan. Fatal for that declaration only.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The macro was applied to a declaration of the wrong kind.
    #[error("expected {expected}, found {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
        span: Span,
    },

    /// A field without its own identifier (tuple or unit declarations).
    #[error("coded fields must be named; `{found}` has no wire key")]
    AnonymousField { found: String, span: Span },

    /// A coding attribute on a field that stores no value.
    #[error("`{field}` stores no value; #[coding(...)] is not allowed on it")]
    AttributeOnComputed { field: String, span: Span },

    /// The same attribute kind given twice on one field.
    #[error("duplicate #[coding({})] on `{field}`", attribute.keyword())]
    DuplicateAttribute {
        field: String,
        attribute: AttrKind,
        span: Span,
    },

    /// Two coded members mapped to the same wire key.
    #[error("wire key \"{key}\" is used by more than one member")]
    DuplicateWireKey { key: String, span: Span },

    /// A union variant that does not carry exactly one payload.
    #[error("variant `{variant}` must carry exactly one payload value, found {count}")]
    VariantPayload { variant: String, count: usize, span: Span },

    /// Unparseable `#[coding(...)]` contents.
    #[error("{0}")]
    Attribute(#[from] syn::Error),
}

impl ResolveError {
    /// Stable short name used to build diagnostic identifiers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WrongKind { .. } => "wrong-kind",
            Self::AnonymousField { .. } => "anonymous-field",
            Self::AttributeOnComputed { .. } => "attribute-on-computed",
            Self::DuplicateAttribute { .. } => "duplicate-attribute",
            Self::DuplicateWireKey { .. } => "duplicate-wire-key",
            Self::VariantPayload { .. } => "variant-payload",
            Self::Attribute(_) => "malformed-attribute",
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::WrongKind { span, .. }
            | Self::AnonymousField { span, .. }
            | Self::AttributeOnComputed { span, .. }
            | Self::DuplicateAttribute { span, .. }
            | Self::DuplicateWireKey { span, .. }
            | Self::VariantPayload { span, .. } => *span,
            Self::Attribute(err) => err.span(),
        }
    }
}

/// A broken engine invariant. Never a user mistake.
#[derive(Debug, Error)]
#[error("internal error in {stage} ({}:{}): {message}", location.file(), location.line())]
pub struct InternalError {
    pub stage: &'static str,
    pub message: String,
    pub location: &'static Location<'static>,
}

impl InternalError {
    #[track_caller]
    pub fn new(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            location: Location::caller(),
        }
    }
}

/// Failure of the formatter boundary.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("generated code does not parse: {0}")]
    Parse(#[from] syn::Error),
}

/// Anything that stops planning of one declaration.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

pub type PlanResult<T> = Result<T, PlanError>;
