//! Classification of planning outcomes into user-facing diagnostics.

use std::fmt;
use std::panic::Location;

use proc_macro2::Span;

use crate::conformance::{ConformanceOutcome, ConformancePlan};
use crate::context::PlanContext;
use crate::errors::PlanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Stable identifier of a diagnostic: `wirecode.<macro>.<kind>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId {
    pub macro_name: &'static str,
    pub kind: &'static str,
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wirecode.{}.{}", self.macro_name, self.kind)
    }
}

/// Who is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    /// An engine bug, with the source location that detected it.
    Internal {
        stage: &'static str,
        location: &'static Location<'static>,
    },
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub id: MessageId,
    pub span: Span,
    pub origin: Origin,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn to_syn_error(&self) -> syn::Error {
        syn::Error::new(self.span, &self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Receiver of diagnostics. Reporting never fails.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Sink that keeps everything for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// All errors folded into one `syn::Error`, if there are any.
    pub fn combined_error(&self) -> Option<syn::Error> {
        self.errors()
            .map(Diagnostic::to_syn_error)
            .reduce(|mut acc, err| {
                acc.combine(err);
                acc
            })
    }

    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Map a fatal planning failure to its diagnostic.
pub fn classify(error: &PlanError, ctx: &PlanContext, fallback_span: Span) -> Diagnostic {
    let macro_name = ctx.identity.name();
    match error {
        PlanError::Resolve(err) => Diagnostic {
            severity: Severity::Error,
            message: format!("#[{macro_name}]: {err}"),
            id: MessageId {
                macro_name,
                kind: err.kind(),
            },
            span: err.span(),
            origin: Origin::User,
        },
        PlanError::Internal(err) => Diagnostic {
            severity: Severity::Error,
            message: format!("#[{macro_name}]: {err}"),
            id: MessageId {
                macro_name,
                kind: "internal",
            },
            span: fallback_span,
            origin: Origin::Internal {
                stage: err.stage,
                location: err.location,
            },
        },
    }
}

/// Warnings for a conformance plan that drops part or all of the request.
pub fn conformance_warnings(plan: &ConformancePlan, ctx: &PlanContext, span: Span) -> Vec<Diagnostic> {
    let macro_name = ctx.identity.name();
    match plan.outcome {
        ConformanceOutcome::Full => Vec::new(),
        ConformanceOutcome::NoOp => vec![Diagnostic {
            severity: Severity::Warning,
            message: format!(
                "#[{macro_name}] has no effect, the type already implements {}",
                plan.existing
            ),
            id: MessageId {
                macro_name,
                kind: "no-effect",
            },
            span,
            origin: Origin::User,
        }],
        ConformanceOutcome::Partial { redundant } => redundant
            .iter()
            .map(|capability| {
                let remaining = plan
                    .to_generate
                    .iter()
                    .next()
                    .map(|other| ctx.identity.narrowed_to(other))
                    .unwrap_or_default();
                Diagnostic {
                    severity: Severity::Warning,
                    message: format!(
                        "the type already implements {capability}; use {remaining} instead of #[{macro_name}]"
                    ),
                    id: MessageId {
                        macro_name,
                        kind: "redundant-conformance",
                    },
                    span,
                    origin: Origin::User,
                }
            })
            .collect(),
    }
}
