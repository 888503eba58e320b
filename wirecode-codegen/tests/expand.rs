use quote::quote;
use wirecode_codegen::{
    CollectingSink, ConformanceSet, Expander, Formatter, MacroIdentity, PrettyFormatter, Severity,
};

fn expand(identity: MacroIdentity, existing: ConformanceSet, tokens: proc_macro2::TokenStream) -> (String, CollectingSink) {
    let item: syn::Item = syn::parse2(tokens).unwrap();
    let mut sink = CollectingSink::new();
    let expanded = Expander::new(identity)
        .existing(existing)
        .expand_item(&item, &mut sink)
        .expect("expansion failed");
    (PrettyFormatter.format(expanded).unwrap(), sink)
}

#[test]
fn codable_record_round_trips_through_formatter() {
    let (source, sink) = expand(
        MacroIdentity::CODABLE,
        ConformanceSet::EMPTY,
        quote! {
            pub struct Article<T> {
                #[coding(rename = "articleId")]
                id: u64,
                title: Option<String>,
                #[coding(strategy = wirecode::LossySequence<T>)]
                tags: Vec<T>,
                #[coding(skip)]
                dirty: bool,
                marker: PhantomData<T>,
            }
        },
    );
    assert!(sink.diagnostics().is_empty());
    assert!(source.starts_with("const _: () = {"));
    assert!(source.contains("enum __CodableKeys {"));
    assert!(source.contains("Self::id => \"articleId\""));
    assert!(source.contains("impl<T: ::wirecode::Decode> ::wirecode::Decode for Article<T>"));
    assert!(source.contains("impl<T: ::wirecode::Encode> ::wirecode::Encode for Article<T>"));
    assert!(source.contains("container.decode_if_present::<String>(__CodableKeys::title)?"));
    assert!(source.contains("decode_coded::<wirecode::LossySequence<T>>"));
    assert!(source.contains("dirty: ::core::default::Default::default()"));
    assert!(source.contains("marker: ::core::default::Default::default()"));
    assert!(!source.contains("self.dirty"));
}

#[test]
fn one_of_decode_only() {
    let identity = MacroIdentity::from_attribute("one_of", quote!(decode)).unwrap().unwrap();
    let (source, _) = expand(
        identity,
        ConformanceSet::EMPTY,
        quote! {
            enum Payment {
                Card(Card),
                #[coding(rename = "iban")]
                Transfer { account: String },
            }
        },
    );
    assert!(source.contains("enum __OneOfKeys {"));
    assert!(source.contains("::wirecode::Decode for Payment"));
    assert!(!source.contains("::wirecode::Encode for Payment"));
}

#[test]
fn partial_overlap_warns_and_generates_the_rest() {
    let (source, sink) = expand(
        MacroIdentity::CODABLE,
        ConformanceSet::DECODE,
        quote!(struct Point { x: i32, y: i32 }),
    );
    assert!(!source.contains("::wirecode::Decode for Point"));
    assert!(source.contains("::wirecode::Encode for Point"));
    let warning = &sink.diagnostics()[0];
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.id.to_string(), "wirecode.codable.redundant-conformance");
    assert_eq!(
        warning.message,
        "the type already implements Decode; use #[encodable] instead of #[codable]"
    );
}

#[test]
fn all_of_has_no_key_enum() {
    let identity = MacroIdentity::from_attribute("all_of", proc_macro2::TokenStream::new()).unwrap().unwrap();
    let (source, _) = expand(
        identity,
        ConformanceSet::EMPTY,
        quote! {
            struct Employee {
                person: Person,
                job: Job,
            }
        },
    );
    assert!(!source.contains("enum "));
    assert!(source.contains("decoder.single_value_container()"));
    assert!(source.contains("container.encode(&self.person)?;"));
}

#[test]
fn duplicate_attribute_is_a_user_error() {
    let item: syn::Item = syn::parse2(quote! {
        struct S {
            #[coding(rename = "a")]
            #[coding(rename = "b")]
            value: u8,
        }
    })
    .unwrap();
    let mut sink = CollectingSink::new();
    assert!(Expander::new(MacroIdentity::CODABLE).expand_item(&item, &mut sink).is_none());
    let error = sink.combined_error().unwrap();
    assert_eq!(error.to_string(), "#[codable]: duplicate #[coding(rename)] on `value`");
}
