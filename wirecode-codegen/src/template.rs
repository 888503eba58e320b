//! A small composable builder for the generated declarations.
//!
//! Templates render to tokens. A [`Template::block`] whose body renders to
//! nothing is dropped from its parent, which is how "no coded members"
//! collapses to no output; [`Template::required_block`] always renders.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

#[derive(Debug, Clone, Default)]
pub enum Template {
    /// Renders nothing.
    #[default]
    Empty,
    /// Literal tokens.
    Tokens(TokenStream),
    /// Members rendered one after another.
    Seq(Vec<Template>),
    /// `header { body } suffix`.
    Block {
        header: TokenStream,
        body: Box<Template>,
        suffix: TokenStream,
        keep_empty: bool,
    },
}

impl Template {
    pub fn tokens(tokens: impl ToTokens) -> Self {
        let tokens = tokens.into_token_stream();
        if tokens.is_empty() {
            Self::Empty
        } else {
            Self::Tokens(tokens)
        }
    }

    pub fn seq(members: impl IntoIterator<Item = Template>) -> Self {
        Self::Seq(members.into_iter().collect())
    }

    /// A declaration containing `body`, omitted when `body` is empty.
    pub fn block(header: impl ToTokens, body: Template) -> Self {
        Self::Block {
            header: header.into_token_stream(),
            body: Box::new(body),
            suffix: TokenStream::new(),
            keep_empty: false,
        }
    }

    /// A declaration that renders even with an empty body.
    pub fn required_block(header: impl ToTokens, body: Template) -> Self {
        Self::Block {
            header: header.into_token_stream(),
            body: Box::new(body),
            suffix: TokenStream::new(),
            keep_empty: true,
        }
    }

    /// Append `;` after a block (`const _: () = { .. };`).
    pub fn terminated(self) -> Self {
        match self {
            Self::Block {
                header,
                body,
                keep_empty,
                ..
            } => Self::Block {
                header,
                body,
                suffix: quote!(;),
                keep_empty,
            },
            other => other,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Tokens(tokens) => tokens.is_empty(),
            Self::Seq(members) => members.iter().all(Template::is_empty),
            Self::Block { body, keep_empty, .. } => !keep_empty && body.is_empty(),
        }
    }

    pub fn render(&self) -> TokenStream {
        let mut out = TokenStream::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut TokenStream) {
        match self {
            Self::Empty => {}
            Self::Tokens(tokens) => out.extend(tokens.clone()),
            Self::Seq(members) => {
                for member in members {
                    member.render_into(out);
                }
            }
            Self::Block {
                header,
                body,
                suffix,
                keep_empty,
            } => {
                if !keep_empty && body.is_empty() {
                    return;
                }
                let body = body.render();
                out.extend(quote! { #header { #body } #suffix });
            }
        }
    }
}

impl FromIterator<Template> for Template {
    fn from_iter<I: IntoIterator<Item = Template>>(iter: I) -> Self {
        Self::seq(iter)
    }
}

impl ToTokens for Template {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.render_into(tokens);
    }
}
