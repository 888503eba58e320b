//! Boundary with the host syntax: turns a parsed type declaration into raw
//! field/variant metadata for the resolver.

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Fields, Generics, Ident, Item, Visibility};

use crate::types::{TypeRef, is_phantom};

/// What kind of type a declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Record,
    Union,
    /// Anything else; the payload names it for diagnostics.
    Other(&'static str),
}

impl DeclKind {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Record => "a struct",
            Self::Union => "an enum",
            Self::Other(found) => found,
        }
    }
}

/// One stored property as the host wrote it.
#[derive(Debug, Clone)]
pub struct RawField {
    /// `None` for tuple fields.
    pub ident: Option<Ident>,
    pub ty: TypeRef,
    pub is_stored: bool,
    pub is_static: bool,
    pub attrs: Vec<Attribute>,
    pub span: Span,
}

impl RawField {
    pub fn is_optional(&self) -> bool {
        self.ty.is_optional()
    }
}

/// One enum case as the host wrote it.
#[derive(Debug, Clone)]
pub struct RawVariant {
    pub ident: Ident,
    pub payload: Vec<RawField>,
    /// Whether the payload is written `V { x: T }` rather than `V(T)`.
    pub named: bool,
    pub attrs: Vec<Attribute>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct RawDeclaration {
    pub ident: Ident,
    pub generics: Generics,
    pub kind: DeclKind,
    pub is_public: bool,
    pub attrs: Vec<Attribute>,
    pub fields: Vec<RawField>,
    pub variants: Vec<RawVariant>,
}

/// Host syntax nodes that may describe a codable declaration.
pub trait ReadDeclaration {
    /// `None` when the node is not a type declaration at all.
    fn read_declaration(&self) -> Option<RawDeclaration>;
}

impl ReadDeclaration for DeriveInput {
    fn read_declaration(&self) -> Option<RawDeclaration> {
        let mut decl = RawDeclaration::empty(&self.ident, &self.generics, &self.vis, &self.attrs);
        match &self.data {
            Data::Struct(data) => {
                decl.kind = DeclKind::Record;
                decl.fields = read_fields(&data.fields);
            }
            Data::Enum(data) => {
                decl.kind = DeclKind::Union;
                decl.variants = data
                    .variants
                    .iter()
                    .map(|variant| RawVariant {
                        ident: variant.ident.clone(),
                        payload: read_fields(&variant.fields),
                        named: matches!(variant.fields, Fields::Named(_)),
                        attrs: variant.attrs.clone(),
                        span: variant.span(),
                    })
                    .collect();
            }
            Data::Union(_) => decl.kind = DeclKind::Other("a union"),
        }
        Some(decl)
    }
}

impl ReadDeclaration for Item {
    fn read_declaration(&self) -> Option<RawDeclaration> {
        let input: DeriveInput = match self {
            Item::Struct(item) => item.clone().into(),
            Item::Enum(item) => item.clone().into(),
            Item::Union(item) => item.clone().into(),
            _ => return None,
        };
        input.read_declaration()
    }
}

impl RawDeclaration {
    fn empty(ident: &Ident, generics: &Generics, vis: &Visibility, attrs: &[Attribute]) -> Self {
        Self {
            ident: ident.clone(),
            generics: generics.clone(),
            kind: DeclKind::Record,
            is_public: matches!(vis, Visibility::Public(_)),
            attrs: attrs.to_vec(),
            fields: Vec::new(),
            variants: Vec::new(),
        }
    }
}

fn read_fields(fields: &Fields) -> Vec<RawField> {
    fields
        .iter()
        .map(|field| RawField {
            ident: field.ident.clone(),
            ty: TypeRef::new(&field.ty),
            is_stored: !is_phantom(&field.ty),
            is_static: false,
            attrs: field.attrs.clone(),
            span: field.span(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn reads_struct_fields() {
        let input: DeriveInput = parse_quote! {
            pub struct User {
                id: u64,
                nick: Option<String>,
                marker: PhantomData<u8>,
            }
        };
        let decl = input.read_declaration().unwrap();
        assert_eq!(decl.kind, DeclKind::Record);
        assert!(decl.is_public);
        assert_eq!(decl.fields.len(), 3);
        assert!(!decl.fields[0].is_optional());
        assert!(decl.fields[1].is_optional());
        assert!(!decl.fields[2].is_stored);
    }

    #[test]
    fn reads_enum_variants() {
        let input: DeriveInput = parse_quote! {
            enum Value {
                Int(i64),
                Named { flag: bool },
                Empty,
            }
        };
        let decl = input.read_declaration().unwrap();
        assert_eq!(decl.kind, DeclKind::Union);
        assert_eq!(decl.variants.len(), 3);
        assert!(!decl.variants[0].named);
        assert!(decl.variants[0].payload[0].ident.is_none());
        assert!(decl.variants[1].named);
        assert!(decl.variants[2].payload.is_empty());
    }

    #[test]
    fn non_type_items_are_not_applicable() {
        let item: Item = parse_quote!(
            fn helper() {}
        );
        assert!(item.read_declaration().is_none());
        let item: Item = parse_quote!(
            union Bits {
                a: u32,
                b: f32,
            }
        );
        assert_eq!(item.read_declaration().unwrap().kind, DeclKind::Other("a union"));
    }
}
