use syn::{Generics, spanned::Spanned};

/// Commands cache their schema in a `static`, which can't depend on generic
/// parameters, so none are allowed.
pub fn reject_generics(generics: &Generics, derived: &str) -> syn::Result<()> {
    match generics.params.first() {
        None => Ok(()),
        Some(param) => Err(syn::Error::new(
            param.span(),
            format!("`{derived}` can't be derived on a generic type"),
        )),
    }
}
