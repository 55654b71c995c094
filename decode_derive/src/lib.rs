extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};

/// Derives `Decode` for a struct, as a PER `SEQUENCE` of its fields
///
/// Fields of type `Option<T>` are `OPTIONAL` components. With the attribute
/// `#[per(extensible)]`, any extension additions that follow the root
/// components are skipped.
#[proc_macro_derive(Decode, attributes(per))]
pub fn decode_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_decode(&ast)
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

fn impl_decode(ast: &syn::DeriveInput) -> syn::Result<TokenStream2> {
    let decode_trait = quote! { asn1_per::conv::Decode };
    let parser_trait = quote! { asn1_per::parse::Parser };
    let parse_result_type = quote! { asn1_per::parse::ParseResult };

    let name = &ast.ident;
    let fields = match &ast.data {
        syn::Data::Struct(syn::DataStruct { fields, .. }) => fields,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "derive(Decode) only supports structs; use `choice!` or `enumerated!` for enums",
            ))
        }
    };
    let extensible = is_extensible(&ast.attrs)?;

    let locals: Vec<syn::Ident> = (0..fields.len()).map(|ix| format_ident!("__field{}", ix)).collect();
    let n_optional = fields.iter().filter(|f| option_inner(&f.ty).is_some()).count();

    let mut opt_ix = 0usize;
    let reads = fields.iter().zip(locals.iter()).map(|(field, local)| match option_inner(&field.ty) {
        Some(inner) => {
            let k = opt_ix;
            opt_ix += 1;
            quote! {
                let #local = if preamble.is_present(#k) {
                    ::std::option::Option::Some(<#inner as #decode_trait>::parse(p)?)
                } else {
                    ::std::option::Option::None
                };
            }
        }
        None => {
            let ty = &field.ty;
            quote! { let #local = <#ty as #decode_trait>::parse(p)?; }
        }
    });
    let reads: Vec<TokenStream2> = reads.collect();

    let construct = match fields {
        syn::Fields::Unit => quote! { Self },
        syn::Fields::Unnamed(_) => quote! { Self( #( #locals ),* ) },
        syn::Fields::Named(named) => {
            let fname = named.named.iter().map(|f| &f.ident);
            quote! { Self { #( #fname: #locals ),* } }
        }
    };

    let mut generics = ast.generics.clone();
    if !generics.params.is_empty() {
        let where_clause = generics.make_where_clause();
        for field in fields.iter() {
            let bound = option_inner(&field.ty).unwrap_or(&field.ty);
            where_clause.predicates.push(syn::parse_quote! { #bound: #decode_trait });
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #decode_trait for #name #ty_generics #where_clause {
            fn parse<P: #parser_trait>(p: &mut P) -> #parse_result_type<Self> {
                let preamble = asn1_per::schema::unpack_preamble(p, #extensible, #n_optional)?;
                #( #reads )*
                asn1_per::schema::finish_sequence(p, &preamble)?;
                Ok(#construct)
            }
        }
    })
}
