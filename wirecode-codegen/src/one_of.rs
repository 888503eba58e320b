//! Tagged union planning: one wire key per variant, exactly one present.

use proc_macro2::TokenStream;
use quote::quote;

use crate::codec::{Access, FieldCodec};
use crate::conformance::{Conformance, ConformancePlan};
use crate::context::PlanContext;
use crate::errors::PlanResult;
use crate::keys::WireKeyPlan;
use crate::render::{aggregate, decode_impl, encode_impl};
use crate::resolver::{ResolvedUnion, Variant};
use crate::template::Template;

pub fn plan_one_of(ctx: &PlanContext, union: &ResolvedUnion, conformance: &ConformancePlan) -> PlanResult<Template> {
    if conformance.to_generate.is_empty() {
        return Ok(Template::Empty);
    }
    log::debug!(
        "planning one-of `{}` ({} variants) for {}",
        union.ident,
        union.variants.len(),
        conformance.to_generate
    );

    let keys = WireKeyPlan::build(ctx, union.variants.iter().map(|variant| &variant.field));
    let codec = FieldCodec::new(ctx, Access::Keyed(&keys));

    let mut members = vec![keys.template(ctx)];
    if conformance.generates(Conformance::Decode) {
        let body = decode_body(ctx, union, &keys, &codec)?;
        members.push(decode_impl(ctx, &union.ident, &union.generics, body));
    }
    if conformance.generates(Conformance::Encode) {
        let body = encode_body(ctx, union, &keys, &codec)?;
        members.push(encode_impl(ctx, &union.ident, &union.generics, body));
    }
    Ok(aggregate(members))
}

/// The first recognised key picks the variant; anything else present is ignored.
fn decode_body(
    ctx: &PlanContext,
    union: &ResolvedUnion,
    keys: &WireKeyPlan,
    codec: &FieldCodec<'_>,
) -> PlanResult<Template> {
    let rt = &ctx.runtime;
    let type_name = union.ident.to_string();
    let no_key = quote!(#rt::DecodeError::no_key_present(decoder.coding_path(), #type_name));

    if keys.is_empty() {
        return Ok(Template::tokens(quote!(::core::result::Result::Err(#no_key))));
    }

    let keys_ident = &keys.enum_ident;
    let mut arms = Vec::new();
    for variant in union.coded() {
        let key = keys.key_path(variant.ident());
        let value = codec.decode(&variant.field)?.rendered;
        let construct = construct(variant, value);
        arms.push(quote!(#key => ::core::result::Result::Ok(#construct),));
    }

    Ok(Template::tokens(quote! {
        let container = decoder.keyed_container::<#keys_ident>()?;
        let ::core::option::Option::Some(key) = container.all_keys().into_iter().next() else {
            return ::core::result::Result::Err(#no_key);
        };
        match key {
            #(#arms)*
        }
    }))
}

/// Writes the active variant under its key; omitted variants fail.
fn encode_body(
    ctx: &PlanContext,
    union: &ResolvedUnion,
    keys: &WireKeyPlan,
    codec: &FieldCodec<'_>,
) -> PlanResult<Template> {
    if union.variants.is_empty() {
        return Ok(Template::tokens(quote!(match *self {})));
    }

    let rt = &ctx.runtime;
    let keys_ident = &keys.enum_ident;
    let mut arms = Vec::new();
    for variant in union.coded() {
        let pattern = construct(variant, quote!(__value));
        let statement = codec.encode(&variant.field, quote!(__value))?.rendered;
        arms.push(quote! {
            #pattern => {
                #statement
                ::core::result::Result::Ok(())
            }
        });
    }
    if union.has_omitted() {
        let type_name = union.ident.to_string();
        arms.push(quote! {
            _ => ::core::result::Result::Err(#rt::EncodeError::unencodable_variant(#type_name)),
        });
    }

    let open = if keys.is_empty() {
        quote!(let _ = encoder;)
    } else {
        quote!(let mut container = encoder.keyed_container::<#keys_ident>();)
    };
    Ok(Template::tokens(quote! {
        #open
        match self {
            #(#arms)*
        }
    }))
}

/// `Self::V(inner)` or `Self::V { binding: inner }`; used as expression and pattern.
fn construct(variant: &Variant, inner: TokenStream) -> TokenStream {
    let ident = variant.ident();
    match &variant.binding {
        Some(binding) => quote!(Self::#ident { #binding: #inner }),
        None => quote!(Self::#ident(#inner)),
    }
}
