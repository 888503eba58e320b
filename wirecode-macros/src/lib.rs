//! Attribute macros that generate `wirecode::Decode` / `wirecode::Encode`.
//!
//! Each macro hands the annotated item to `wirecode-codegen` and re-emits the
//! item, stripped of its `#[coding(...)]` helpers, followed by the generated
//! impls. Errors become `compile_error!` at the offending span.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Item, parse_macro_input};
use wirecode_codegen::{CollectingSink, Expander, MacroIdentity, strip_coding_attrs};

/// Keyed `Decode` and `Encode` for a struct with named fields.
///
/// Field options, all under `#[coding(...)]`: `skip`, `rename = "key"`,
/// `default = Provider`, `strategy = Strategy`, `custom = Name`.
/// `#[coding(crate = "path")]` on the struct overrides the runtime path.
#[proc_macro_attribute]
pub fn codable(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as Item);
    expand("codable", args.into(), item).into()
}

/// Keyed `Decode` only.
#[proc_macro_attribute]
pub fn decodable(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as Item);
    expand("decodable", args.into(), item).into()
}

/// Keyed `Encode` only.
#[proc_macro_attribute]
pub fn encodable(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as Item);
    expand("encodable", args.into(), item).into()
}

/// An enum coded as an object with exactly one key per value: the key names
/// the variant, its value is the variant's single payload.
///
/// `#[one_of(decode)]` or `#[one_of(encode)]` restricts the direction.
#[proc_macro_attribute]
pub fn one_of(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as Item);
    expand("one_of", args.into(), item).into()
}

/// A struct whose fields are all coded from the same value, so their keyed
/// contents share one object on the wire.
///
/// `#[all_of(decode)]` or `#[all_of(encode)]` restricts the direction.
#[proc_macro_attribute]
pub fn all_of(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as Item);
    expand("all_of", args.into(), item).into()
}

fn expand(name: &str, args: TokenStream2, mut item: Item) -> TokenStream2 {
    let identity = match MacroIdentity::from_attribute(name, args) {
        Some(Ok(identity)) => identity,
        Some(Err(err)) => return err.to_compile_error(),
        None => {
            return syn::Error::new(Span::call_site(), format!("`{name}` is not a coding macro")).to_compile_error();
        }
    };

    let mut sink = CollectingSink::new();
    let generated = Expander::new(identity).expand_item(&item, &mut sink);
    strip_coding_attrs(&mut item);

    let errors = sink.combined_error().map(|err| err.to_compile_error());
    quote! {
        #item
        #generated
        #errors
    }
}
