//! Read-only state shared by every planning step of one declaration.

use proc_macro2::{Span, TokenStream};
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Ident, Path, Token};

use crate::conformance::{Conformance, ConformanceSet};

/// The declaration shape a macro plans for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroShape {
    /// Keyed struct coding.
    Record,
    /// Tagged union coding.
    OneOf,
    /// Flattened composition of nested values.
    AllOf,
}

/// Which macro drives an expansion: its shape and the capabilities it asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroIdentity {
    pub shape: MacroShape,
    pub requested: ConformanceSet,
}

impl MacroIdentity {
    pub const CODABLE: Self = Self::new(MacroShape::Record, ConformanceSet::BOTH);
    pub const DECODABLE: Self = Self::new(MacroShape::Record, ConformanceSet::DECODE);
    pub const ENCODABLE: Self = Self::new(MacroShape::Record, ConformanceSet::ENCODE);

    pub const fn new(shape: MacroShape, requested: ConformanceSet) -> Self {
        Self { shape, requested }
    }

    /// Recognise a coding macro by the last segment of its attribute path.
    ///
    /// `args` are the tokens inside the attribute's parentheses, if any.
    pub fn from_attribute(name: &str, args: TokenStream) -> Option<syn::Result<Self>> {
        let shape = match name {
            "codable" => return Some(no_args(name, args).map(|()| Self::CODABLE)),
            "decodable" => return Some(no_args(name, args).map(|()| Self::DECODABLE)),
            "encodable" => return Some(no_args(name, args).map(|()| Self::ENCODABLE)),
            "one_of" => MacroShape::OneOf,
            "all_of" => MacroShape::AllOf,
            _ => return None,
        };
        Some(parse_capabilities(args).map(|requested| Self::new(shape, requested)))
    }

    /// Attribute name the macro is invoked by.
    pub fn name(&self) -> &'static str {
        match (self.shape, self.requested) {
            (MacroShape::Record, ConformanceSet::DECODE) => "decodable",
            (MacroShape::Record, ConformanceSet::ENCODE) => "encodable",
            (MacroShape::Record, _) => "codable",
            (MacroShape::OneOf, _) => "one_of",
            (MacroShape::AllOf, _) => "all_of",
        }
    }

    /// The invocation that asks for `capability` alone.
    pub fn narrowed_to(&self, capability: Conformance) -> String {
        match (self.shape, capability) {
            (MacroShape::Record, Conformance::Decode) => "#[decodable]".to_string(),
            (MacroShape::Record, Conformance::Encode) => "#[encodable]".to_string(),
            (_, Conformance::Decode) => format!("#[{}(decode)]", self.name()),
            (_, Conformance::Encode) => format!("#[{}(encode)]", self.name()),
        }
    }
}

fn no_args(name: &str, args: TokenStream) -> syn::Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(args, format!("#[{name}] takes no arguments")))
    }
}

/// `decode`, `encode`, both, or nothing (= both).
fn parse_capabilities(args: TokenStream) -> syn::Result<ConformanceSet> {
    let idents = Punctuated::<Ident, Token![,]>::parse_terminated.parse2(args)?;
    if idents.is_empty() {
        return Ok(ConformanceSet::BOTH);
    }
    let mut requested = ConformanceSet::EMPTY;
    for ident in idents {
        if ident == "decode" {
            requested.insert(Conformance::Decode);
        } else if ident == "encode" {
            requested.insert(Conformance::Encode);
        } else {
            return Err(syn::Error::new(
                ident.span(),
                format!("unknown capability `{ident}`, expected `decode` or `encode`"),
            ));
        }
    }
    Ok(requested)
}

/// Immutable per-declaration context, passed by reference to every planner.
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub identity: MacroIdentity,
    /// Path of the runtime crate in generated code.
    pub runtime: Path,
}

impl PlanContext {
    pub fn new(identity: MacroIdentity, runtime: Path) -> Self {
        Self { identity, runtime }
    }

    pub fn default_runtime() -> Path {
        syn::parse_quote!(::wirecode)
    }

    /// Name of the generated wire-key enumeration.
    pub fn keys_ident(&self) -> Ident {
        let family = match self.identity.shape {
            MacroShape::Record => "Codable",
            MacroShape::OneOf => "OneOf",
            MacroShape::AllOf => "AllOf",
        };
        Ident::new(&format!("__{family}Keys"), Span::call_site())
    }
}
