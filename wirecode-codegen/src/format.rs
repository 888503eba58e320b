//! Rendering boundary from token streams to source text.

use proc_macro2::TokenStream;

use crate::errors::FormatError;

/// Turns generated tokens into text. Parse failures surface as errors.
pub trait Formatter {
    fn format(&self, tokens: TokenStream) -> Result<String, FormatError>;
}

/// rustfmt-like layout through `prettyplease`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyFormatter;

impl Formatter for PrettyFormatter {
    fn format(&self, tokens: TokenStream) -> Result<String, FormatError> {
        let file = syn::parse2::<syn::File>(tokens)?;
        Ok(prettyplease::unparse(&file))
    }
}

/// The token stream's own spacing, still validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactFormatter;

impl Formatter for CompactFormatter {
    fn format(&self, tokens: TokenStream) -> Result<String, FormatError> {
        syn::parse2::<syn::File>(tokens.clone())?;
        Ok(tokens.to_string())
    }
}
