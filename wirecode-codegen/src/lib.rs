//! Planning and code assembly behind the wirecode coding macros.
//!
//! A declaration flows through [`declaration`] (host syntax to raw metadata),
//! [`resolver`] (validation), [`conformance`] (what to generate), the record,
//! one-of and all-of planners, and finally [`template`] rendering. Problems
//! are turned into [`diagnostics`] along the way. [`Expander`] runs the whole
//! pipeline; the proc-macro crate and the `wirecode` CLI are both thin hosts
//! around it.

pub mod all_of;
pub mod attrs;
pub mod codec;
pub mod conformance;
pub mod context;
pub mod declaration;
pub mod diagnostics;
pub mod errors;
pub mod expand;
pub mod format;
pub mod keys;
pub mod one_of;
pub mod record;
mod render;
pub mod resolver;
pub mod template;
pub mod types;

pub use attrs::strip_coding_attrs;
pub use conformance::{Conformance, ConformanceOutcome, ConformancePlan, ConformanceSet};
pub use context::{MacroIdentity, MacroShape, PlanContext};
pub use declaration::{DeclKind, RawDeclaration, ReadDeclaration};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, MessageId, Origin, Severity};
pub use errors::{FormatError, InternalError, PlanError, PlanResult, ResolveError};
pub use expand::Expander;
pub use format::{CompactFormatter, Formatter, PrettyFormatter};
pub use template::Template;
