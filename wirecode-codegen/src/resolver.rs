//! Validates raw declaration metadata and normalises it into plannable members.

use std::collections::HashSet;

use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::{Generics, Ident};

use crate::attrs::{CodingAttrs, parse_coding_attrs};
use crate::context::{MacroShape, PlanContext};
use crate::declaration::{DeclKind, RawDeclaration, RawField, RawVariant};
use crate::errors::ResolveError;
use crate::types::TypeRef;

/// A coded member: a struct field, or the payload of a union variant.
#[derive(Debug, Clone)]
pub struct Field {
    /// Identifier that names the member in generated code and, by default, on the wire.
    pub ident: Ident,
    pub ty: TypeRef,
    pub attrs: CodingAttrs,
    pub span: Span,
}

impl Field {
    pub fn is_omitted(&self) -> bool {
        self.attrs.omit
    }

    /// Identifier without any `r#` prefix.
    pub fn name(&self) -> String {
        self.ident.unraw().to_string()
    }

    /// The key this member is read from and written to.
    pub fn wire_key(&self) -> String {
        self.attrs.key.clone().unwrap_or_else(|| self.name())
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedRecord {
    pub ident: Ident,
    pub generics: Generics,
    /// Stored fields in declaration order, omitted ones included.
    pub fields: Vec<Field>,
    /// Fields that hold no value; decoded as `Default::default()`.
    pub passive: Vec<Ident>,
}

impl ResolvedRecord {
    pub fn coded(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| !field.is_omitted())
    }
}

/// A union case and its single payload.
#[derive(Debug, Clone)]
pub struct Variant {
    /// Payload planned as a member named after the case.
    pub field: Field,
    /// Field name for `V { name: T }` payloads; `None` for `V(T)`.
    pub binding: Option<Ident>,
}

impl Variant {
    pub fn ident(&self) -> &Ident {
        &self.field.ident
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedUnion {
    pub ident: Ident,
    pub generics: Generics,
    pub variants: Vec<Variant>,
}

impl ResolvedUnion {
    pub fn coded(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter().filter(|variant| !variant.field.is_omitted())
    }

    pub fn has_omitted(&self) -> bool {
        self.variants.iter().any(|variant| variant.field.is_omitted())
    }
}

#[derive(Debug, Clone)]
pub enum Resolved {
    Record(ResolvedRecord),
    Union(ResolvedUnion),
}

/// Resolve a declaration for the macro in `ctx`, gating on declaration kind.
pub fn resolve(decl: &RawDeclaration, ctx: &PlanContext) -> Result<Resolved, ResolveError> {
    match ctx.identity.shape {
        MacroShape::Record | MacroShape::AllOf => resolve_record(decl).map(Resolved::Record),
        MacroShape::OneOf => resolve_union(decl).map(Resolved::Union),
    }
}

pub fn resolve_record(decl: &RawDeclaration) -> Result<ResolvedRecord, ResolveError> {
    if decl.kind != DeclKind::Record {
        return Err(wrong_kind("a struct with named fields", decl));
    }

    let mut fields = Vec::with_capacity(decl.fields.len());
    let mut passive = Vec::new();
    for (index, raw) in decl.fields.iter().enumerate() {
        if raw.is_static {
            continue;
        }
        let ident = raw.ident.clone().ok_or_else(|| ResolveError::AnonymousField {
            found: format!("field {index}"),
            span: raw.span,
        })?;
        let attrs = resolve_attrs(&ident, raw, &[])?;
        if !raw.is_stored {
            passive.push(ident);
            continue;
        }
        fields.push(Field {
            ident,
            ty: raw.ty.clone(),
            attrs,
            span: raw.span,
        });
    }

    ensure_unique_keys(fields.iter())?;
    Ok(ResolvedRecord {
        ident: decl.ident.clone(),
        generics: decl.generics.clone(),
        fields,
        passive,
    })
}

pub fn resolve_union(decl: &RawDeclaration) -> Result<ResolvedUnion, ResolveError> {
    if decl.kind != DeclKind::Union {
        return Err(wrong_kind("an enum", decl));
    }

    let variants = decl
        .variants
        .iter()
        .map(resolve_variant)
        .collect::<Result<Vec<_>, _>>()?;

    ensure_unique_keys(variants.iter().map(|variant| &variant.field))?;
    Ok(ResolvedUnion {
        ident: decl.ident.clone(),
        generics: decl.generics.clone(),
        variants,
    })
}

fn resolve_variant(raw: &RawVariant) -> Result<Variant, ResolveError> {
    let [payload] = raw.payload.as_slice() else {
        return Err(ResolveError::VariantPayload {
            variant: raw.ident.to_string(),
            count: raw.payload.len(),
            span: raw.span,
        });
    };
    // Variant-level and payload-level annotations form one list.
    let attrs = resolve_attrs(&raw.ident, payload, &raw.attrs)?;
    Ok(Variant {
        field: Field {
            ident: raw.ident.clone(),
            ty: payload.ty.clone(),
            attrs,
            span: raw.span,
        },
        binding: if raw.named { payload.ident.clone() } else { None },
    })
}

fn resolve_attrs(ident: &Ident, raw: &RawField, leading: &[syn::Attribute]) -> Result<CodingAttrs, ResolveError> {
    let mut parsed = parse_coding_attrs(leading)?;
    parsed.extend(parse_coding_attrs(&raw.attrs)?);
    let name = ident.unraw().to_string();
    if !raw.is_stored && !parsed.is_empty() {
        return Err(ResolveError::AttributeOnComputed {
            field: name,
            span: raw.span,
        });
    }
    CodingAttrs::from_raw(&name, parsed)
}

fn ensure_unique_keys<'a>(fields: impl Iterator<Item = &'a Field>) -> Result<(), ResolveError> {
    let mut seen = HashSet::new();
    for field in fields.filter(|field| !field.is_omitted()) {
        let key = field.wire_key();
        if !seen.insert(key.clone()) {
            return Err(ResolveError::DuplicateWireKey { key, span: field.span });
        }
    }
    Ok(())
}

fn wrong_kind(expected: &'static str, decl: &RawDeclaration) -> ResolveError {
    ResolveError::WrongKind {
        expected,
        found: decl.kind.describe(),
        span: decl.ident.span(),
    }
}
