//! The expansion pipeline for one annotated declaration.

use proc_macro2::{Span, TokenStream};
use syn::spanned::Spanned;
use syn::{Attribute, Item, Path};

use crate::all_of::plan_all_of;
use crate::attrs::parse_container_attrs;
use crate::conformance::{ConformancePlan, ConformanceSet};
use crate::context::{MacroIdentity, MacroShape, PlanContext};
use crate::declaration::{RawDeclaration, ReadDeclaration};
use crate::diagnostics::{DiagnosticSink, classify, conformance_warnings};
use crate::errors::{InternalError, PlanError, PlanResult, ResolveError};
use crate::one_of::plan_one_of;
use crate::record::plan_record;
use crate::resolver::{Resolved, resolve};

/// Drives one macro over declarations.
///
/// Fatal problems are reported to the sink and yield `None`; warnings are
/// reported alongside a successful expansion.
#[derive(Debug, Clone)]
pub struct Expander {
    identity: MacroIdentity,
    existing: ConformanceSet,
    runtime: Option<Path>,
}

impl Expander {
    pub fn new(identity: MacroIdentity) -> Self {
        Self {
            identity,
            existing: ConformanceSet::EMPTY,
            runtime: None,
        }
    }

    /// Capabilities the declaration already has elsewhere.
    pub fn existing(mut self, existing: ConformanceSet) -> Self {
        self.existing = existing;
        self
    }

    /// Runtime path used when the declaration does not name one.
    pub fn runtime(mut self, runtime: Path) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn identity(&self) -> MacroIdentity {
        self.identity
    }

    /// Expand any item; items that declare no type are rejected.
    pub fn expand_item(&self, item: &Item, sink: &mut impl DiagnosticSink) -> Option<TokenStream> {
        match item.read_declaration() {
            Some(decl) => self.expand(&decl, sink),
            None => {
                let err = PlanError::from(ResolveError::WrongKind {
                    expected: self.expected_kind(),
                    found: describe_item(item),
                    span: item.span(),
                });
                sink.report(classify(&err, &self.fallback_context(), item.span()));
                None
            }
        }
    }

    pub fn expand(&self, decl: &RawDeclaration, sink: &mut impl DiagnosticSink) -> Option<TokenStream> {
        let span = decl.ident.span();
        let ctx = match self.context(&decl.attrs) {
            Ok(ctx) => ctx,
            Err(err) => {
                sink.report(classify(&err, &self.fallback_context(), span));
                return None;
            }
        };

        match self.plan(decl, &ctx, span, sink) {
            Ok(tokens) => Some(tokens),
            Err(err) => {
                log::debug!("#[{}] on `{}` failed: {err}", ctx.identity.name(), decl.ident);
                sink.report(classify(&err, &ctx, span));
                None
            }
        }
    }

    fn plan(
        &self,
        decl: &RawDeclaration,
        ctx: &PlanContext,
        span: Span,
        sink: &mut impl DiagnosticSink,
    ) -> PlanResult<TokenStream> {
        let resolved = resolve(decl, ctx)?;

        let conformance = ConformancePlan::new(ctx.identity.requested, self.existing);
        for warning in conformance_warnings(&conformance, ctx, span) {
            sink.report(warning);
        }

        let template = match (&resolved, ctx.identity.shape) {
            (Resolved::Record(record), MacroShape::AllOf) => plan_all_of(ctx, record, &conformance)?,
            (Resolved::Record(record), _) => plan_record(ctx, record, &conformance)?,
            (Resolved::Union(union), _) => plan_one_of(ctx, union, &conformance)?,
        };

        let tokens = template.render();
        syn::parse2::<syn::File>(tokens.clone())
            .map_err(|err| InternalError::new("assemble", format!("generated code does not parse: {err}")))?;
        Ok(tokens)
    }

    fn context(&self, attrs: &[Attribute]) -> PlanResult<PlanContext> {
        let container = parse_container_attrs(attrs)?;
        let runtime = container
            .runtime
            .or_else(|| self.runtime.clone())
            .unwrap_or_else(PlanContext::default_runtime);
        Ok(PlanContext::new(self.identity, runtime))
    }

    fn fallback_context(&self) -> PlanContext {
        PlanContext::new(self.identity, PlanContext::default_runtime())
    }

    fn expected_kind(&self) -> &'static str {
        match self.identity.shape {
            MacroShape::Record | MacroShape::AllOf => "a struct with named fields",
            MacroShape::OneOf => "an enum",
        }
    }
}

fn describe_item(item: &Item) -> &'static str {
    match item {
        Item::Fn(_) => "a function",
        Item::Impl(_) => "an impl block",
        Item::Trait(_) => "a trait",
        Item::Mod(_) => "a module",
        Item::Type(_) => "a type alias",
        Item::Const(_) | Item::Static(_) => "a constant",
        _ => "an item that declares no type",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, Severity};
    use syn::parse_quote;

    fn item(tokens: TokenStream) -> Item {
        syn::parse2(tokens).unwrap()
    }

    #[test]
    fn expands_record_with_default_runtime() {
        let mut sink = CollectingSink::new();
        let tokens = Expander::new(MacroIdentity::CODABLE)
            .expand_item(&item(quote::quote!(struct Point { x: i32, y: i32 })), &mut sink)
            .unwrap()
            .to_string();
        assert!(sink.diagnostics().is_empty());
        assert!(tokens.contains(":: wirecode :: Decode for Point"));
    }

    #[test]
    fn container_attribute_overrides_runtime() {
        let mut sink = CollectingSink::new();
        let tokens = Expander::new(MacroIdentity::CODABLE)
            .runtime(parse_quote!(crate::rt))
            .expand_item(
                &item(quote::quote! {
                    #[coding(crate = "my_wire")]
                    struct Point { x: i32 }
                }),
                &mut sink,
            )
            .unwrap()
            .to_string();
        assert!(tokens.contains("impl my_wire :: Decode for Point"));
    }

    #[test]
    fn builder_runtime_applies_without_attribute() {
        let mut sink = CollectingSink::new();
        let tokens = Expander::new(MacroIdentity::ENCODABLE)
            .runtime(parse_quote!(crate::rt))
            .expand_item(&item(quote::quote!(struct Point { x: i32 })), &mut sink)
            .unwrap()
            .to_string();
        assert!(tokens.contains("impl crate :: rt :: Encode for Point"));
    }

    #[test]
    fn non_declarations_are_rejected() {
        let mut sink = CollectingSink::new();
        let out = Expander::new(MacroIdentity::CODABLE).expand_item(&item(quote::quote!(fn run() {})), &mut sink);
        assert!(out.is_none());
        let error = sink.errors().next().unwrap();
        assert_eq!(error.message, "#[codable]: expected a struct with named fields, found a function");
        assert_eq!(error.id.to_string(), "wirecode.codable.wrong-kind");
    }

    #[test]
    fn resolver_failure_stops_expansion() {
        let mut sink = CollectingSink::new();
        let out = Expander::new(MacroIdentity::CODABLE)
            .expand_item(&item(quote::quote!(struct Pair(u8, u8);)), &mut sink);
        assert!(out.is_none());
        assert_eq!(sink.errors().count(), 1);
    }

    #[test]
    fn fully_covered_declaration_warns_and_emits_nothing() {
        let mut sink = CollectingSink::new();
        let tokens = Expander::new(MacroIdentity::CODABLE)
            .existing(ConformanceSet::BOTH)
            .expand_item(&item(quote::quote!(struct Point { x: i32 })), &mut sink)
            .unwrap();
        assert!(tokens.is_empty());
        assert_eq!(sink.diagnostics().len(), 1);
        assert_eq!(sink.diagnostics()[0].severity, Severity::Warning);
    }

    #[test]
    fn one_of_on_struct_is_wrong_kind() {
        let identity = MacroIdentity::from_attribute("one_of", TokenStream::new()).unwrap().unwrap();
        let mut sink = CollectingSink::new();
        let out = Expander::new(identity).expand_item(&item(quote::quote!(struct Point { x: i32 })), &mut sink);
        assert!(out.is_none());
        assert_eq!(
            sink.errors().next().unwrap().message,
            "#[one_of]: expected an enum, found a struct"
        );
    }

    #[test]
    fn malformed_container_attribute_is_reported() {
        let mut sink = CollectingSink::new();
        let out = Expander::new(MacroIdentity::CODABLE).expand_item(
            &item(quote::quote! {
                #[coding(flatten)]
                struct Point { x: i32 }
            }),
            &mut sink,
        );
        assert!(out.is_none());
        assert_eq!(sink.errors().next().unwrap().id.kind, "malformed-attribute");
    }
}
