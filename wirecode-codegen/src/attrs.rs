//! The five `#[coding(...)]` annotations and their parsed payloads.

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, Ident, Item, LitStr, Path, Type};

use crate::errors::ResolveError;

/// Discriminant of [`CodingAttr`], used for duplicate detection and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Omit,
    KeyOverride,
    DefaultProvider,
    Strategy,
    Custom,
}

impl AttrKind {
    /// Keyword as written inside `#[coding(...)]`.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Omit => "skip",
            Self::KeyOverride => "rename",
            Self::DefaultProvider => "default",
            Self::Strategy => "strategy",
            Self::Custom => "custom",
        }
    }
}

/// One recognised annotation.
#[derive(Debug, Clone)]
pub enum CodingAttr {
    /// `skip`: excluded from both directions.
    Omit,
    /// `rename = "key"`: wire key differs from the identifier.
    KeyOverride(String),
    /// `default = Provider`: fallback value when decode fails or the key is absent.
    DefaultProvider(Type),
    /// `strategy = Strategy`: route decode/encode through a strategy type.
    Strategy(Type),
    /// `custom = Name`: route through `decode_<name>` / `encode_<name>`.
    Custom(Ident),
}

impl CodingAttr {
    pub fn kind(&self) -> AttrKind {
        match self {
            Self::Omit => AttrKind::Omit,
            Self::KeyOverride(_) => AttrKind::KeyOverride,
            Self::DefaultProvider(_) => AttrKind::DefaultProvider,
            Self::Strategy(_) => AttrKind::Strategy,
            Self::Custom(_) => AttrKind::Custom,
        }
    }
}

/// An annotation together with where it was written.
#[derive(Debug, Clone)]
pub struct RawAttribute {
    pub attr: CodingAttr,
    pub span: Span,
}

/// Collect every annotation from the `#[coding(...)]` attributes in `attrs`.
///
/// Other attributes are ignored. Order is preserved so that a duplicate is
/// reported at its second occurrence.
pub fn parse_coding_attrs(attrs: &[Attribute]) -> Result<Vec<RawAttribute>, ResolveError> {
    let mut parsed = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("coding") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let span = meta.path.span();
            let coding = if meta.path.is_ident("skip") {
                CodingAttr::Omit
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                CodingAttr::KeyOverride(value.value())
            } else if meta.path.is_ident("default") {
                CodingAttr::DefaultProvider(meta.value()?.parse()?)
            } else if meta.path.is_ident("strategy") {
                CodingAttr::Strategy(meta.value()?.parse()?)
            } else if meta.path.is_ident("custom") {
                CodingAttr::Custom(meta.value()?.parse()?)
            } else if meta.path.is_ident("crate") {
                return Err(meta.error("`crate` is a container option, not a field option"));
            } else {
                return Err(meta.error(
                    "unknown coding option, expected one of `skip`, `rename`, `default`, `strategy`, `custom`",
                ));
            };
            parsed.push(RawAttribute { attr: coding, span });
            Ok(())
        })?;
    }
    Ok(parsed)
}

/// Container-level options from `#[coding(...)]` on the type itself.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttrs {
    /// Path of the runtime crate named in generated code.
    pub runtime: Option<Path>,
}

pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttrs, ResolveError> {
    let mut container = ContainerAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("coding") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                if container.runtime.is_some() {
                    return Err(meta.error("duplicate #[coding(crate)]"));
                }
                let value: LitStr = meta.value()?.parse()?;
                container.runtime = Some(value.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown container option, expected `crate = \"...\"`"))
            }
        })?;
    }
    Ok(container)
}

/// The validated annotation set of one field: each kind at most once.
#[derive(Debug, Clone, Default)]
pub struct CodingAttrs {
    pub omit: bool,
    pub key: Option<String>,
    pub default: Option<Type>,
    pub strategy: Option<Type>,
    pub custom: Option<Ident>,
}

impl CodingAttrs {
    /// Fold raw annotations, rejecting any kind that repeats.
    pub fn from_raw(field: &str, raw: Vec<RawAttribute>) -> Result<Self, ResolveError> {
        let mut attrs = Self::default();
        let mut seen: Vec<AttrKind> = Vec::with_capacity(raw.len());
        for RawAttribute { attr, span } in raw {
            let kind = attr.kind();
            if seen.contains(&kind) {
                return Err(ResolveError::DuplicateAttribute {
                    field: field.to_string(),
                    attribute: kind,
                    span,
                });
            }
            seen.push(kind);
            match attr {
                CodingAttr::Omit => attrs.omit = true,
                CodingAttr::KeyOverride(key) => attrs.key = Some(key),
                CodingAttr::DefaultProvider(ty) => attrs.default = Some(ty),
                CodingAttr::Strategy(ty) => attrs.strategy = Some(ty),
                CodingAttr::Custom(name) => attrs.custom = Some(name),
            }
        }
        Ok(attrs)
    }

    pub fn is_empty(&self) -> bool {
        !self.omit && self.key.is_none() && self.default.is_none() && self.strategy.is_none() && self.custom.is_none()
    }
}

/// Remove every `#[coding(...)]` from a declaration and its members.
///
/// Attribute macros cannot register helper attributes, so the item they
/// re-emit must not carry them.
pub fn strip_coding_attrs(item: &mut Item) {
    let keep = |attr: &Attribute| !attr.path().is_ident("coding");
    match item {
        Item::Struct(item) => {
            item.attrs.retain(keep);
            for field in item.fields.iter_mut() {
                field.attrs.retain(keep);
            }
        }
        Item::Enum(item) => {
            item.attrs.retain(keep);
            for variant in item.variants.iter_mut() {
                variant.attrs.retain(keep);
                for field in variant.fields.iter_mut() {
                    field.attrs.retain(keep);
                }
            }
        }
        Item::Union(item) => {
            item.attrs.retain(keep);
            for field in item.fields.named.iter_mut() {
                field.attrs.retain(keep);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::ToTokens;
    use syn::parse_quote;

    fn field_attrs(field: syn::Field) -> Result<CodingAttrs, ResolveError> {
        let raw = parse_coding_attrs(&field.attrs)?;
        CodingAttrs::from_raw("value", raw)
    }

    #[test]
    fn parses_all_five_kinds() {
        let field: syn::Field = parse_quote! {
            #[coding(rename = "v", default = Zero, strategy = LossySequence<u8>)]
            #[coding(custom = UnixTime)]
            value: u32
        };
        let attrs = field_attrs(field).unwrap();
        assert!(!attrs.omit);
        assert_eq!(attrs.key.as_deref(), Some("v"));
        assert_eq!(attrs.default.unwrap().to_token_stream().to_string(), "Zero");
        assert_eq!(attrs.strategy.unwrap().to_token_stream().to_string(), "LossySequence < u8 >");
        assert_eq!(attrs.custom.unwrap().to_string(), "UnixTime");
    }

    #[test]
    fn ignores_foreign_attributes() {
        let field: syn::Field = parse_quote! {
            /// docs
            #[serde(rename = "x")]
            value: u32
        };
        assert!(field_attrs(field).unwrap().is_empty());
    }

    #[test]
    fn rejects_repeat_across_attributes() {
        let field: syn::Field = parse_quote! {
            #[coding(skip)]
            #[coding(skip)]
            value: u32
        };
        let err = field_attrs(field).unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateAttribute { attribute: AttrKind::Omit, .. }));
    }

    #[test]
    fn rejects_unknown_option() {
        let field: syn::Field = parse_quote! {
            #[coding(flatten)]
            value: u32
        };
        let err = field_attrs(field).unwrap_err();
        assert_eq!(err.kind(), "malformed-attribute");
    }

    #[test]
    fn container_crate_path() {
        let input: syn::DeriveInput = parse_quote! {
            #[coding(crate = "my::wire")]
            struct S { a: u8 }
        };
        let container = parse_container_attrs(&input.attrs).unwrap();
        assert_eq!(container.runtime.unwrap().to_token_stream().to_string(), "my :: wire");
    }

    #[test]
    fn strips_only_coding_attributes() {
        let mut item: Item = parse_quote! {
            #[coding(crate = "wire")]
            #[derive(Debug)]
            enum E {
                #[coding(rename = "a")]
                A(#[coding(strategy = Lossy)] Vec<u8>),
                #[doc = "b"]
                B { #[coding(skip)] b: u8 },
            }
        };
        strip_coding_attrs(&mut item);
        let rendered = item.into_token_stream().to_string();
        assert!(!rendered.contains("coding"));
        assert!(rendered.contains("# [derive (Debug)]"));
        assert!(rendered.contains("# [doc = \"b\"]"));
    }
}
