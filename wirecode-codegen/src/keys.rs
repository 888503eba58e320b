//! Ordered identifier → wire key pairs and the enumeration rendered from them.

use proc_macro2::TokenStream;
use quote::quote;
use syn::Ident;
use syn::ext::IdentExt;

use crate::context::PlanContext;
use crate::resolver::Field;
use crate::template::Template;

#[derive(Debug, Clone)]
pub struct WireKeyItem {
    pub ident: Ident,
    /// `None` means the identifier is used verbatim.
    pub wire_key: Option<String>,
}

impl WireKeyItem {
    pub fn key(&self) -> String {
        self.wire_key.clone().unwrap_or_else(|| self.ident.unraw().to_string())
    }
}

/// Built once per declaration and shared by its decode and encode planners.
#[derive(Debug, Clone)]
pub struct WireKeyPlan {
    pub enum_ident: Ident,
    pub items: Vec<WireKeyItem>,
}

impl WireKeyPlan {
    /// Pair every non-omitted member with its override, in declaration order.
    pub fn build<'a>(ctx: &PlanContext, fields: impl IntoIterator<Item = &'a Field>) -> Self {
        let items = fields
            .into_iter()
            .filter(|field| !field.is_omitted())
            .map(|field| WireKeyItem {
                ident: field.ident.clone(),
                wire_key: field.attrs.key.clone(),
            })
            .collect();
        Self {
            enum_ident: ctx.keys_ident(),
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, ident: &Ident) -> bool {
        self.items.iter().any(|item| &item.ident == ident)
    }

    /// `Keys::ident`
    pub fn key_path(&self, ident: &Ident) -> TokenStream {
        let enum_ident = &self.enum_ident;
        quote!(#enum_ident::#ident)
    }

    /// The enumeration and its `CodingKey` impl; empty when no member needs a key.
    pub fn template(&self, ctx: &PlanContext) -> Template {
        let variants: Template = self
            .items
            .iter()
            .map(|item| {
                let ident = &item.ident;
                Template::tokens(quote!(#ident,))
            })
            .collect();
        if variants.is_empty() {
            return Template::Empty;
        }

        let rt = &ctx.runtime;
        let enum_ident = &self.enum_ident;
        let idents: Vec<&Ident> = self.items.iter().map(|item| &item.ident).collect();
        let keys: Vec<String> = self.items.iter().map(WireKeyItem::key).collect();

        Template::seq([
            Template::block(
                quote! {
                    #[allow(non_camel_case_types)]
                    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
                    enum #enum_ident
                },
                variants,
            ),
            Template::block(
                quote!(impl #rt::CodingKey for #enum_ident),
                Template::tokens(quote! {
                    fn as_str(&self) -> &'static str {
                        match self {
                            #(Self::#idents => #keys,)*
                        }
                    }

                    fn from_key(key: &str) -> ::core::option::Option<Self> {
                        match key {
                            #(#keys => ::core::option::Option::Some(Self::#idents),)*
                            _ => ::core::option::Option::None,
                        }
                    }
                }),
            ),
        ])
    }
}
