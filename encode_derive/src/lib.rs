extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};

/// Derives `Encode` for a struct, as a PER `SEQUENCE` of its fields
///
/// Fields of type `Option<T>` are `OPTIONAL` components. The attribute
/// `#[per(extensible)]` adds an extension marker, whose bit is always written
/// as zero.
#[proc_macro_derive(Encode, attributes(per))]
pub fn encode_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_encode(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn is_extensible(attrs: &[syn::Attribute]) -> syn::Result<bool> {
    let mut ext = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("per")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("extensible") {
                ext = true;
                Ok(())
            } else {
                Err(meta.error("unsupported `per` attribute"))
            }
        })?;
    }
    Ok(ext)
}

/// Returns `T` for a field of type `Option<T>`.
fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(syn::TypePath { qself: None, path }) = ty else {
        return None;
    };
    let last = path.segments.last()?;
    if last.ident != "Option" {
        return None;
    }
    match &last.arguments {
        syn::PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first() {
            Some(syn::GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn impl_encode(ast: &syn::DeriveInput) -> syn::Result<TokenStream2> {
    let encode_trait = quote! { asn1_per::conv::Encode };
    let target_trait = quote! { asn1_per::conv::target::Target };
    let encode_result = quote! { asn1_per::error::EncodeResult };
    let resolve_zero_fn = quote! { asn1_per::resolve_zero! };

    let name = &ast.ident;
    let fields = match &ast.data {
        syn::Data::Struct(syn::DataStruct { fields, .. }) => fields,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "derive(Encode) only supports structs; use `choice!` or `enumerated!` for enums",
            ))
        }
    };
    let extensible = is_extensible(&ast.attrs)?;

    let members: Vec<(syn::Member, &syn::Type)> = fields
        .iter()
        .enumerate()
        .map(|(ix, field)| {
            let member = match &field.ident {
                Some(ident) => syn::Member::Named(ident.clone()),
                None => syn::Member::Unnamed(syn::Index::from(ix)),
            };
            (member, &field.ty)
        })
        .collect();

    let presence = members
        .iter()
        .filter(|(_, ty)| option_inner(ty).is_some())
        .map(|(member, _)| quote! { self.#member.is_some() });

    let writes = members.iter().map(|(member, ty)| {
        if option_inner(ty).is_some() {
            let val = format_ident!("__val");
            quote! {
                if let ::std::option::Option::Some(#val) = &self.#member {
                    n += #encode_trait::write_to(#val, buf)?;
                }
            }
        } else {
            quote! { n += #encode_trait::write_to(&self.#member, buf)?; }
        }
    });

    let mut generics = ast.generics.clone();
    if !generics.params.is_empty() {
        let where_clause = generics.make_where_clause();
        for (_, ty) in members.iter() {
            let bound = option_inner(ty).unwrap_or(ty);
            where_clause.predicates.push(syn::parse_quote! { #bound: #encode_trait });
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #encode_trait for #name #ty_generics #where_clause {
            fn write_to<U: #target_trait>(&self, buf: &mut U) -> #encode_result<usize> {
                #[allow(unused_mut)]
                let mut n = asn1_per::schema::pack_preamble(buf, #extensible, &[ #( #presence ),* ]);
                #( #writes )*
                Ok(n + #resolve_zero_fn(buf))
            }
        }
    })
}
