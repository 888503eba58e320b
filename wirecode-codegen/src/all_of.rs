//! Composition planning: every member is coded from the same value.
//!
//! Members share one single-value container, so on the wire their keyed
//! contents merge into a single object. There is no key enumeration.

use quote::quote;

use crate::codec::{Access, FieldCodec};
use crate::conformance::{Conformance, ConformancePlan};
use crate::context::PlanContext;
use crate::errors::PlanResult;
use crate::record::{struct_decode_body, struct_encode_body};
use crate::render::{aggregate, decode_impl, encode_impl};
use crate::resolver::ResolvedRecord;
use crate::template::Template;

pub fn plan_all_of(ctx: &PlanContext, record: &ResolvedRecord, conformance: &ConformancePlan) -> PlanResult<Template> {
    if conformance.to_generate.is_empty() {
        return Ok(Template::Empty);
    }
    log::debug!("planning all-of `{}` for {}", record.ident, conformance.to_generate);

    let codec = FieldCodec::new(ctx, Access::SingleValue);
    let has_coded = record.coded().next().is_some();

    let mut members = Vec::new();
    if conformance.generates(Conformance::Decode) {
        let open = if has_coded {
            quote!(let container = decoder.single_value_container();)
        } else {
            quote!(let _ = decoder;)
        };
        let body = struct_decode_body(ctx, record, &codec, open)?;
        members.push(decode_impl(ctx, &record.ident, &record.generics, body));
    }
    if conformance.generates(Conformance::Encode) {
        let open = if has_coded {
            quote!(let mut container = encoder.single_value_container();)
        } else {
            quote!(let _ = encoder;)
        };
        let body = struct_encode_body(record, &codec, open)?;
        members.push(encode_impl(ctx, &record.ident, &record.generics, body));
    }
    Ok(aggregate(members))
}
