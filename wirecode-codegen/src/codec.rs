//! Per-member decode/encode expression selection.
//!
//! Precedence, highest first:
//!
//! 1. `custom = Name` calls `decode_<name>` / `encode_<name>` with a type
//!    witness, the accessor and (keyed only) the wire key.
//! 2. `strategy` and/or `default` go through the runtime's generic
//!    `decode_coded` / `encode_coded` pair. Encoding ignores `default`.
//! 3. Otherwise the accessor is called directly.
//!
//! Optional members use the `_if_present` variant of whichever call is picked
//! (custom functions see the declared `Option<T>` and decide for themselves).

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Ident, Type};

use crate::context::PlanContext;
use crate::errors::{InternalError, PlanResult};
use crate::keys::WireKeyPlan;
use crate::resolver::Field;

/// How the generated code reaches member values.
#[derive(Debug, Clone, Copy)]
pub enum Access<'a> {
    /// A keyed container addressed through the wire-key enumeration.
    Keyed(&'a WireKeyPlan),
    /// One single-value container shared by every member, in order.
    SingleValue,
}

/// The rendered decode expression or encode statement of one member.
#[derive(Debug, Clone)]
pub struct CodecPlanItem {
    pub ident: Ident,
    pub rendered: TokenStream,
}

pub struct FieldCodec<'a> {
    ctx: &'a PlanContext,
    access: Access<'a>,
}

impl<'a> FieldCodec<'a> {
    pub fn new(ctx: &'a PlanContext, access: Access<'a>) -> Self {
        Self { ctx, access }
    }

    /// Expression producing the member's value (errors already propagated with `?`).
    pub fn decode(&self, field: &Field) -> PlanResult<CodecPlanItem> {
        let key = self.key_arg(field)?;
        let rt = &self.ctx.runtime;
        let optional = field.ty.is_optional();

        let rendered = if let Some(name) = &field.attrs.custom {
            let function = custom_fn("decode", name);
            let ty = &field.ty.ty;
            let args = with_key(vec![quote!(::core::marker::PhantomData::<#ty>), quote!(&container)], key);
            quote!(#function(#(#args),*)?)
        } else if field.attrs.strategy.is_some() || field.attrs.default.is_some() {
            let strategy = self.strategy_type(field);
            let fallback = match &field.attrs.default {
                Some(provider) => quote!(::core::option::Option::Some(<#provider as #rt::ValueProvider>::provide)),
                None => quote!(::core::option::Option::None),
            };
            let method = if optional {
                quote!(decode_coded_if_present)
            } else {
                quote!(decode_coded)
            };
            let mut args = with_key(Vec::new(), key);
            args.push(fallback);
            quote!(container.#method::<#strategy>(#(#args),*)?)
        } else {
            let method = if optional {
                quote!(decode_if_present)
            } else {
                quote!(decode)
            };
            let ty = field.ty.unwrapped();
            let args = with_key(Vec::new(), key);
            quote!(container.#method::<#ty>(#(#args),*)?)
        };

        Ok(CodecPlanItem {
            ident: field.ident.clone(),
            rendered,
        })
    }

    /// Statement writing the member; `value` is an expression of type `&T`.
    pub fn encode(&self, field: &Field, value: TokenStream) -> PlanResult<CodecPlanItem> {
        let key = self.key_arg(field)?;
        let optional = field.ty.is_optional();

        let rendered = if let Some(name) = &field.attrs.custom {
            let function = custom_fn("encode", name);
            let ty = &field.ty.ty;
            let args = with_key(
                vec![quote!(::core::marker::PhantomData::<#ty>), value, quote!(&mut container)],
                key,
            );
            quote!(#function(#(#args),*)?;)
        } else if field.attrs.strategy.is_some() {
            let strategy = self.strategy_type(field);
            let method = if optional {
                quote!(encode_coded_if_present)
            } else {
                quote!(encode_coded)
            };
            let args = with_key(vec![value], key);
            quote!(container.#method::<#strategy>(#(#args),*)?;)
        } else {
            let method = if optional {
                quote!(encode_if_present)
            } else {
                quote!(encode)
            };
            let args = with_key(vec![value], key);
            quote!(container.#method(#(#args),*)?;)
        };

        Ok(CodecPlanItem {
            ident: field.ident.clone(),
            rendered,
        })
    }

    /// `Keys::member` under keyed access, `None` under single-value access.
    fn key_arg(&self, field: &Field) -> PlanResult<Option<TokenStream>> {
        match self.access {
            Access::SingleValue => Ok(None),
            Access::Keyed(keys) => {
                if !keys.contains(&field.ident) {
                    return Err(InternalError::new(
                        "codec",
                        format!("no wire key planned for `{}`", field.name()),
                    )
                    .into());
                }
                Ok(Some(keys.key_path(&field.ident)))
            }
        }
    }

    fn strategy_type(&self, field: &Field) -> Type {
        let rt = &self.ctx.runtime;
        match &field.attrs.strategy {
            Some(strategy) => strategy.clone(),
            None => {
                let ty = field.ty.unwrapped();
                syn::parse_quote!(#rt::Direct<#ty>)
            }
        }
    }
}

fn with_key(mut args: Vec<TokenStream>, key: Option<TokenStream>) -> Vec<TokenStream> {
    args.extend(key);
    args
}

/// `decode_<snake name>` / `encode_<snake name>`.
pub(crate) fn custom_fn(direction: &str, name: &Ident) -> Ident {
    Ident::new(&format!("{direction}_{}", to_snake_case(&name.to_string())), Span::call_site())
}

/// Convert PascalCase to snake_case, keeping acronyms together.
pub(crate) fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let after_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let ends_acronym =
                i > 0 && chars[i - 1].is_uppercase() && chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if after_lower || ends_acronym {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MacroIdentity;
    use crate::declaration::ReadDeclaration;
    use crate::resolver::resolve_record;
    use syn::{DeriveInput, parse_quote};

    struct Fixture {
        ctx: PlanContext,
        keys: WireKeyPlan,
        fields: Vec<Field>,
    }

    fn fixture(input: DeriveInput) -> Fixture {
        let ctx = PlanContext::new(MacroIdentity::CODABLE, PlanContext::default_runtime());
        let record = resolve_record(&input.read_declaration().unwrap()).unwrap();
        let keys = WireKeyPlan::build(&ctx, &record.fields);
        Fixture {
            ctx,
            keys,
            fields: record.fields,
        }
    }

    fn decode_keyed(fx: &Fixture, index: usize) -> String {
        let codec = FieldCodec::new(&fx.ctx, Access::Keyed(&fx.keys));
        codec.decode(&fx.fields[index]).unwrap().rendered.to_string()
    }

    fn encode_keyed(fx: &Fixture, index: usize) -> String {
        let codec = FieldCodec::new(&fx.ctx, Access::Keyed(&fx.keys));
        let ident = &fx.fields[index].ident;
        codec.encode(&fx.fields[index], quote!(&self.#ident)).unwrap().rendered.to_string()
    }

    fn sample() -> Fixture {
        fixture(parse_quote! {
            struct Sample {
                plain: u32,
                maybe: Option<String>,
                #[coding(default = Zero)]
                defaulted: u32,
                #[coding(strategy = Coerced<u32>)]
                coerced: u32,
                #[coding(strategy = Coerced<u32>, default = Zero)]
                both: u32,
                #[coding(custom = UnixTime, strategy = Ignored, default = Ignored)]
                stamp: Stamp,
                #[coding(default = NoneYet)]
                later: Option<u8>,
            }
        })
    }

    #[test]
    fn plain_fields_call_accessor_directly() {
        let fx = sample();
        assert_eq!(
            decode_keyed(&fx, 0),
            "container . decode :: < u32 > (__CodableKeys :: plain) ?"
        );
        assert_eq!(
            encode_keyed(&fx, 0),
            "container . encode (& self . plain , __CodableKeys :: plain) ? ;"
        );
    }

    #[test]
    fn optional_fields_use_if_present() {
        let fx = sample();
        assert_eq!(
            decode_keyed(&fx, 1),
            "container . decode_if_present :: < String > (__CodableKeys :: maybe) ?"
        );
        assert_eq!(
            encode_keyed(&fx, 1),
            "container . encode_if_present (& self . maybe , __CodableKeys :: maybe) ? ;"
        );
    }

    #[test]
    fn default_provider_routes_decode_through_direct_strategy() {
        let fx = sample();
        assert_eq!(
            decode_keyed(&fx, 2),
            "container . decode_coded :: < :: wirecode :: Direct < u32 > > (__CodableKeys :: defaulted , \
             :: core :: option :: Option :: Some (< Zero as :: wirecode :: ValueProvider > :: provide)) ?"
        );
        // Providers have no effect on encode.
        assert_eq!(
            encode_keyed(&fx, 2),
            "container . encode (& self . defaulted , __CodableKeys :: defaulted) ? ;"
        );
    }

    #[test]
    fn strategy_without_provider_passes_none() {
        let fx = sample();
        assert_eq!(
            decode_keyed(&fx, 3),
            "container . decode_coded :: < Coerced < u32 > > (__CodableKeys :: coerced , \
             :: core :: option :: Option :: None) ?"
        );
        assert_eq!(
            encode_keyed(&fx, 3),
            "container . encode_coded :: < Coerced < u32 > > (& self . coerced , __CodableKeys :: coerced) ? ;"
        );
    }

    #[test]
    fn strategy_and_provider_compose() {
        let fx = sample();
        let decode = decode_keyed(&fx, 4);
        assert!(decode.starts_with("container . decode_coded :: < Coerced < u32 > >"));
        assert!(decode.contains("Some (< Zero as :: wirecode :: ValueProvider > :: provide)"));
    }

    #[test]
    fn custom_coding_takes_precedence() {
        let fx = sample();
        assert_eq!(
            decode_keyed(&fx, 5),
            "decode_unix_time (:: core :: marker :: PhantomData :: < Stamp > , & container , __CodableKeys :: stamp) ?"
        );
        assert_eq!(
            encode_keyed(&fx, 5),
            "encode_unix_time (:: core :: marker :: PhantomData :: < Stamp > , & self . stamp , & mut container , \
             __CodableKeys :: stamp) ? ;"
        );
    }

    #[test]
    fn optional_with_provider() {
        let fx = sample();
        let decode = decode_keyed(&fx, 6);
        assert!(decode.starts_with("container . decode_coded_if_present :: < :: wirecode :: Direct < u8 > >"));
    }

    #[test]
    fn single_value_access_has_no_key() {
        let fx = sample();
        let codec = FieldCodec::new(&fx.ctx, Access::SingleValue);
        assert_eq!(
            codec.decode(&fx.fields[1]).unwrap().rendered.to_string(),
            "container . decode_if_present :: < String > () ?"
        );
        assert_eq!(
            codec.decode(&fx.fields[3]).unwrap().rendered.to_string(),
            "container . decode_coded :: < Coerced < u32 > > (:: core :: option :: Option :: None) ?"
        );
        assert_eq!(
            codec.decode(&fx.fields[5]).unwrap().rendered.to_string(),
            "decode_unix_time (:: core :: marker :: PhantomData :: < Stamp > , & container) ?"
        );
        assert_eq!(
            codec.encode(&fx.fields[0], quote!(&self.plain)).unwrap().rendered.to_string(),
            "container . encode (& self . plain) ? ;"
        );
    }

    #[test]
    fn missing_key_is_an_internal_error() {
        let fx = fixture(parse_quote! {
            struct S {
                #[coding(skip)]
                gone: u8,
            }
        });
        let codec = FieldCodec::new(&fx.ctx, Access::Keyed(&fx.keys));
        let err = codec.decode(&fx.fields[0]).unwrap_err();
        assert!(err.to_string().contains("no wire key planned for `gone`"));
    }

    #[test]
    fn snake_case_names() {
        assert_eq!(to_snake_case("UnixTime"), "unix_time");
        assert_eq!(to_snake_case("unixTime"), "unix_time");
        assert_eq!(to_snake_case("ISO8601Date"), "iso8601_date");
        assert_eq!(to_snake_case("HTTPRequest"), "http_request");
        assert_eq!(to_snake_case("lossy"), "lossy");
    }
}
