//! Keyed struct planning.

use proc_macro2::TokenStream;
use quote::quote;

use crate::codec::{Access, FieldCodec};
use crate::conformance::{Conformance, ConformancePlan};
use crate::context::PlanContext;
use crate::errors::PlanResult;
use crate::keys::WireKeyPlan;
use crate::render::{aggregate, decode_impl, encode_impl};
use crate::resolver::{Field, ResolvedRecord};
use crate::template::Template;

pub fn plan_record(ctx: &PlanContext, record: &ResolvedRecord, conformance: &ConformancePlan) -> PlanResult<Template> {
    if conformance.to_generate.is_empty() {
        return Ok(Template::Empty);
    }
    log::debug!("planning keyed record `{}` for {}", record.ident, conformance.to_generate);

    let keys = WireKeyPlan::build(ctx, &record.fields);
    let codec = FieldCodec::new(ctx, Access::Keyed(&keys));
    let keys_ident = &keys.enum_ident;

    let mut members = vec![keys.template(ctx)];
    if conformance.generates(Conformance::Decode) {
        let open = if keys.is_empty() {
            quote!(let _ = decoder;)
        } else {
            quote!(let container = decoder.keyed_container::<#keys_ident>()?;)
        };
        let body = struct_decode_body(ctx, record, &codec, open)?;
        members.push(decode_impl(ctx, &record.ident, &record.generics, body));
    }
    if conformance.generates(Conformance::Encode) {
        let open = if keys.is_empty() {
            quote!(let _ = encoder;)
        } else {
            quote!(let mut container = encoder.keyed_container::<#keys_ident>();)
        };
        let body = struct_encode_body(record, &codec, open)?;
        members.push(encode_impl(ctx, &record.ident, &record.generics, body));
    }
    Ok(aggregate(members))
}

/// `open` then `Ok(Self { .. })` with every coded field read in declaration order.
pub(crate) fn struct_decode_body(
    ctx: &PlanContext,
    record: &ResolvedRecord,
    codec: &FieldCodec<'_>,
    open: TokenStream,
) -> PlanResult<Template> {
    let mut inits = Vec::with_capacity(record.fields.len() + record.passive.len());
    for field in &record.fields {
        let ident = &field.ident;
        let value = if field.is_omitted() {
            omitted_value(ctx, field)
        } else {
            codec.decode(field)?.rendered
        };
        inits.push(quote!(#ident: #value));
    }
    for ident in &record.passive {
        inits.push(quote!(#ident: ::core::default::Default::default()));
    }

    Ok(Template::seq([
        Template::tokens(open),
        Template::tokens(quote!(::core::result::Result::Ok(Self { #(#inits),* }))),
    ]))
}

/// `open`, one statement per coded field, then `Ok(())`.
pub(crate) fn struct_encode_body(
    record: &ResolvedRecord,
    codec: &FieldCodec<'_>,
    open: TokenStream,
) -> PlanResult<Template> {
    let mut statements = vec![Template::tokens(open)];
    for field in record.coded() {
        let ident = &field.ident;
        statements.push(Template::tokens(codec.encode(field, quote!(&self.#ident))?.rendered));
    }
    statements.push(Template::tokens(quote!(::core::result::Result::Ok(()))));
    Ok(Template::seq(statements))
}

/// Omitted fields never touch the wire; they come from their provider or `Default`.
fn omitted_value(ctx: &PlanContext, field: &Field) -> TokenStream {
    let rt = &ctx.runtime;
    match &field.attrs.default {
        Some(provider) => quote!(<#provider as #rt::ValueProvider>::provide()),
        None => quote!(::core::default::Default::default()),
    }
}
