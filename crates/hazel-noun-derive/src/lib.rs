use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Derive macro for implementing the `NounEncode` trait.
///
/// Struct fields are folded into right-nested cells, so a struct encodes
/// exactly like the tuple of its fields.
///
/// # Example
///
/// ```ignore
/// #[derive(NounEncode)]
/// struct Draft {
///     version: u64,
///     memo: String,
/// }
/// ```
///
/// Expands to:
///
/// ```ignore
/// impl hazel_noun::NounEncode for Draft {
///     fn to_noun(&self) -> hazel_noun::Noun {
///         hazel_noun::NounEncode::to_noun(&(&self.version, &self.memo))
///     }
/// }
/// ```
#[proc_macro_derive(NounEncode)]
pub fn derive_noun_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let impl_body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => {
                let field_names: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();

                if field_names.is_empty() {
                    quote! { hazel_noun::NounEncode::to_noun(&0u64) }
                } else if field_names.len() == 1 {
                    let field = &field_names[0];
                    quote! { hazel_noun::NounEncode::to_noun(&self.#field) }
                } else {
                    let tuple_expr = build_nested_tuple_refs(&field_names);
                    quote! { hazel_noun::NounEncode::to_noun(&#tuple_expr) }
                }
            }
            Fields::Unnamed(fields) => {
                let field_count = fields.unnamed.len();

                if field_count == 0 {
                    quote! { hazel_noun::NounEncode::to_noun(&0u64) }
                } else if field_count == 1 {
                    quote! { hazel_noun::NounEncode::to_noun(&self.0) }
                } else {
                    let indices: Vec<_> = (0..field_count).map(syn::Index::from).collect();
                    let tuple_expr = build_nested_tuple_refs_indexed(&indices);
                    quote! { hazel_noun::NounEncode::to_noun(&#tuple_expr) }
                }
            }
            Fields::Unit => quote! { hazel_noun::NounEncode::to_noun(&0u64) },
        },
        Data::Enum(_) => {
            return syn::Error::new_spanned(
                &input,
                "NounEncode derive macro does not support enums yet",
            )
            .to_compile_error()
            .into();
        }
        Data::Union(_) => {
            return syn::Error::new_spanned(
                &input,
                "NounEncode derive macro does not support unions",
            )
            .to_compile_error()
            .into();
        }
    };

    TokenStream::from(quote! {
        impl hazel_noun::NounEncode for #name {
            fn to_noun(&self) -> hazel_noun::Noun {
                #impl_body
            }
        }
    })
}

/// Derive macro for implementing the `NounDecode` trait.
///
/// The inverse of `#[derive(NounEncode)]`: the noun is decoded as the tuple
/// of the struct's fields and the struct is rebuilt from it.
#[proc_macro_derive(NounDecode)]
pub fn derive_noun_decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let impl_body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => {
                let field_names: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();

                if field_names.is_empty() {
                    quote! {
                        if *noun == hazel_noun::atom(0) {
                            Some(Self {})
                        } else {
                            None
                        }
                    }
                } else if field_names.len() == 1 {
                    let field = &field_names[0];
                    quote! {
                        Some(Self {
                            #field: hazel_noun::NounDecode::from_noun(noun)?,
                        })
                    }
                } else {
                    quote! {
                        let (#( #field_names ),*) = hazel_noun::NounDecode::from_noun(noun)?;
                        Some(Self {
                            #( #field_names ),*
                        })
                    }
                }
            }
            Fields::Unnamed(fields) => {
                let field_count = fields.unnamed.len();

                if field_count == 0 {
                    quote! {
                        if *noun == hazel_noun::atom(0) {
                            Some(Self())
                        } else {
                            None
                        }
                    }
                } else if field_count == 1 {
                    quote! { Some(Self(hazel_noun::NounDecode::from_noun(noun)?)) }
                } else {
                    let bindings: Vec<_> = (0..field_count)
                        .map(|i| quote::format_ident!("field_{}", i))
                        .collect();
                    quote! {
                        let (#( #bindings ),*) = hazel_noun::NounDecode::from_noun(noun)?;
                        Some(Self(#( #bindings ),*))
                    }
                }
            }
            Fields::Unit => quote! {
                if *noun == hazel_noun::atom(0) {
                    Some(Self)
                } else {
                    None
                }
            },
        },
        Data::Enum(_) => {
            return syn::Error::new_spanned(
                &input,
                "NounDecode derive macro does not support enums yet",
            )
            .to_compile_error()
            .into();
        }
        Data::Union(_) => {
            return syn::Error::new_spanned(
                &input,
                "NounDecode derive macro does not support unions",
            )
            .to_compile_error()
            .into();
        }
    };

    TokenStream::from(quote! {
        impl hazel_noun::NounDecode for #name {
            fn from_noun(noun: &hazel_noun::Noun) -> Option<Self> {
                #impl_body
            }
        }
    })
}

/// Build nested tuple references for named fields: (&self.x, (&self.y, &self.z))
fn build_nested_tuple_refs(field_names: &[&Option<syn::Ident>]) -> proc_macro2::TokenStream {
    let mut iter = field_names.iter().rev();
    let last = iter.next().unwrap();

    let mut result = quote! { &self.#last };

    for field in iter {
        result = quote! { (&self.#field, #result) };
    }

    result
}

/// Build nested tuple references for tuple struct fields: (&self.0, (&self.1, &self.2))
fn build_nested_tuple_refs_indexed(indices: &[syn::Index]) -> proc_macro2::TokenStream {
    let mut iter = indices.iter().rev();
    let last = iter.next().unwrap();

    let mut result = quote! { &self.#last };

    for index in iter {
        result = quote! { (&self.#index, #result) };
    }

    result
}
