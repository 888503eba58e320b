//! Impl headers and the aggregating block shared by all planners.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericParam, Generics, Ident};

use crate::conformance::Conformance;
use crate::context::PlanContext;
use crate::template::Template;

/// `impl Decode for T { fn decode(decoder) -> Result<Self, DecodeError> { body } }`
pub(crate) fn decode_impl(ctx: &PlanContext, ident: &Ident, generics: &Generics, body: Template) -> Template {
    let rt = &ctx.runtime;
    let header = impl_header(ctx, ident, generics, Conformance::Decode);
    Template::required_block(
        header,
        Template::required_block(
            quote!(fn decode(decoder: &#rt::Decoder<'_>) -> ::core::result::Result<Self, #rt::DecodeError>),
            body,
        ),
    )
}

/// `impl Encode for T { fn encode(&self, encoder) -> Result<(), EncodeError> { body } }`
pub(crate) fn encode_impl(ctx: &PlanContext, ident: &Ident, generics: &Generics, body: Template) -> Template {
    let rt = &ctx.runtime;
    let header = impl_header(ctx, ident, generics, Conformance::Encode);
    Template::required_block(
        header,
        Template::required_block(
            quote!(fn encode(&self, encoder: &mut #rt::Encoder) -> ::core::result::Result<(), #rt::EncodeError>),
            body,
        ),
    )
}

/// Everything generated for one declaration, inside `const _: () = { .. };`.
pub(crate) fn aggregate(members: Vec<Template>) -> Template {
    Template::block(quote!(const _: () =), Template::seq(members)).terminated()
}

fn impl_header(ctx: &PlanContext, ident: &Ident, generics: &Generics, conformance: Conformance) -> TokenStream {
    let rt = &ctx.runtime;
    let trait_ident = Ident::new(conformance.trait_name(), ident.span());
    let bounded = with_bounds(generics, quote!(#rt::#trait_ident));
    let (impl_generics, ty_generics, where_clause) = bounded.split_for_impl();
    quote! {
        #[automatically_derived]
        impl #impl_generics #rt::#trait_ident for #ident #ty_generics #where_clause
    }
}

/// Add `bound` to every type parameter.
fn with_bounds(generics: &Generics, bound: TokenStream) -> Generics {
    let mut generics = generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(param) = param {
            param.bounds.push(syn::parse_quote!(#bound));
        }
    }
    generics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MacroIdentity;
    use syn::parse_quote;

    #[test]
    fn bounds_type_parameters_only() {
        let ctx = PlanContext::new(MacroIdentity::CODABLE, PlanContext::default_runtime());
        let generics: Generics = parse_quote!(<'a, T: Clone, const N: usize>);
        let header = impl_header(&ctx, &parse_quote!(Wrapper), &generics, Conformance::Decode).to_string();
        assert!(header.contains("impl < 'a , T : Clone + :: wirecode :: Decode , const N : usize >"));
        assert!(header.contains("for Wrapper < 'a , T , N >"));
    }

    #[test]
    fn aggregate_of_nothing_is_nothing() {
        assert!(aggregate(vec![Template::Empty]).render().is_empty());
    }
}
