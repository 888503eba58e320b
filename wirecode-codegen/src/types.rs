use syn::{GenericArgument, PathArguments, Type, TypePath};

/// A field's declared type, plus its `Option` payload when it is optional.
#[derive(Debug, Clone)]
pub struct TypeRef {
    pub ty: Type,
    pub option_inner: Option<Type>,
}

impl TypeRef {
    pub fn new(ty: &Type) -> Self {
        Self {
            ty: ty.clone(),
            option_inner: unwrap_option(ty).cloned(),
        }
    }

    pub fn is_optional(&self) -> bool {
        self.option_inner.is_some()
    }

    /// The `T` of `Option<T>`, or the declared type itself.
    pub fn unwrapped(&self) -> &Type {
        self.option_inner.as_ref().unwrap_or(&self.ty)
    }
}

pub(crate) fn unwrap_option(ty: &Type) -> Option<&Type> {
    single_generic(ty, "Option")
}

/// `PhantomData<..>` fields hold no value of their own.
pub(crate) fn is_phantom(ty: &Type) -> bool {
    matches!(ty, Type::Path(path) if last_ident_str(path).as_deref() == Some("PhantomData"))
}

fn single_generic<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() || last_ident_str(path).as_deref() != Some(name) {
        return None;
    }
    match &path.path.segments.last()?.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn last_ident_str(path: &TypePath) -> Option<String> {
    path.path.segments.last().map(|segment| segment.ident.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::ToTokens;
    use syn::parse_quote;

    #[test]
    fn detects_option_forms() {
        for ty in [
            parse_quote!(Option<u8>),
            parse_quote!(std::option::Option<u8>),
            parse_quote!(::core::option::Option<u8>),
        ] {
            let type_ref = TypeRef::new(&ty);
            assert!(type_ref.is_optional());
            assert_eq!(type_ref.unwrapped().to_token_stream().to_string(), "u8");
        }
    }

    #[test]
    fn plain_types_are_not_optional() {
        let type_ref = TypeRef::new(&parse_quote!(Vec<Option<u8>>));
        assert!(!type_ref.is_optional());
        assert_eq!(type_ref.unwrapped().to_token_stream().to_string(), "Vec < Option < u8 > >");
    }

    #[test]
    fn phantom_fields() {
        assert!(is_phantom(&parse_quote!(PhantomData<T>)));
        assert!(is_phantom(&parse_quote!(core::marker::PhantomData<fn() -> T>)));
        assert!(!is_phantom(&parse_quote!(Data<T>)));
    }
}
