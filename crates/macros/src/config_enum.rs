//! ConfigEnum derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{parse_config_enum, ConfigEnumArgs};

/// Generate the ConfigEnum implementation
pub fn derive_config_enum(input: DeriveInput) -> TokenStream {
    match parse_config_enum(&input) {
        Ok(args) => generate_impl(args),
        Err(e) => e.write_errors(),
    }
}

fn generate_impl(args: ConfigEnumArgs) -> TokenStream {
    let enum_name = &args.ident;
    let (impl_generics, ty_generics, where_clause) = args.generics.split_for_impl();

    let variants = match args.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(
                &args.ident,
                "ConfigEnum can only be derived for enums",
            )
            .to_compile_error()
        }
    };

    // Two variants with the same spelling could never both round-trip
    let mut seen: Vec<(String, &syn::Ident)> = Vec::new();
    for variant in &variants {
        for name in variant.accepted_names() {
            if let Some((_, first)) = seen.iter().find(|(existing, _)| *existing == name) {
                return syn::Error::new_spanned(
                    &variant.ident,
                    format!("config name '{}' is already used by `{}`", name, first),
                )
                .to_compile_error();
            }
            seen.push((name, &variant.ident));
        }
    }

    let variant_idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
    let config_names: Vec<String> = variants.iter().map(|v| v.config_name()).collect();

    let parse_arms = variants.iter().map(|variant| {
        let ident = &variant.ident;
        let names = variant.accepted_names();
        quote! {
            if [#(#names),*].iter().any(|name| word.eq_ignore_ascii_case(name)) {
                return ::core::result::Result::Ok(Self::#ident);
            }
        }
    });

    quote! {
        impl #impl_generics ::core::fmt::Display for #enum_name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(match *self {
                    #(Self::#variant_idents => #config_names,)*
                })
            }
        }

        impl #impl_generics ::core::str::FromStr for #enum_name #ty_generics #where_clause {
            type Err = ::knobs_core::variables::UnknownVariant;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                let word = s.trim();
                #(#parse_arms)*
                ::core::result::Result::Err(::knobs_core::variables::UnknownVariant::new(
                    word,
                    <Self as ::knobs_core::variables::ConfigEnumValues>::VARIANTS,
                ))
            }
        }

        impl #impl_generics ::knobs_core::variables::ConfigEnumValues for #enum_name #ty_generics #where_clause {
            const VARIANTS: &'static [&'static str] = &[#(#config_names),*];
        }
    }
}
