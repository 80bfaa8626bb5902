//! Attribute parsing for the ConfigEnum derive macro

use darling::{FromDeriveInput, FromVariant};
use syn::{DeriveInput, Generics, Ident};

/// Parsed #[config(...)] attributes on the enum
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(config), supports(enum_unit))]
pub struct ConfigEnumArgs {
    /// Enum identifier
    pub ident: Ident,

    /// Enum generics
    pub generics: Generics,

    /// Enum variants
    pub data: darling::ast::Data<ConfigVariantArgs, ()>,
}

/// Parsed #[config(...)] attributes on a variant
#[derive(Debug, FromVariant)]
#[darling(attributes(config))]
pub struct ConfigVariantArgs {
    /// Variant identifier
    pub ident: Ident,

    /// Config spelling; defaults to the kebab-case variant name
    pub rename: Option<String>,

    /// Extra spellings accepted when parsing
    #[darling(multiple)]
    pub alias: Vec<String>,
}

impl ConfigVariantArgs {
    /// Spelling used for formatting and the primary parse match
    pub fn config_name(&self) -> String {
        self.rename
            .clone()
            .unwrap_or_else(|| kebab_case(&self.ident.to_string()))
    }

    /// Every spelling accepted when parsing, lowercased
    pub fn accepted_names(&self) -> Vec<String> {
        std::iter::once(self.config_name())
            .chain(self.alias.iter().cloned())
            .map(|name| name.to_ascii_lowercase())
            .collect()
    }
}

/// Convert `UpperCamelCase` to `kebab-case`
///
/// Runs of capitals stay together, so `RGBA8` becomes `rgba8` and
/// `MipmapRGB` becomes `mipmap-rgb`.
pub fn kebab_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '_' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if ch.is_uppercase() && i > 0 && !out.ends_with('-') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('-');
            }
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// Parse a DeriveInput into ConfigEnumArgs
pub fn parse_config_enum(input: &DeriveInput) -> darling::Result<ConfigEnumArgs> {
    ConfigEnumArgs::from_derive_input(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("None"), "none");
        assert_eq!(kebab_case("LinearMipmapLinear"), "linear-mipmap-linear");
        assert_eq!(kebab_case("RGBA8"), "rgba8");
        assert_eq!(kebab_case("MipmapRGB"), "mipmap-rgb");
        assert_eq!(kebab_case("HTTPServer"), "http-server");
        assert_eq!(kebab_case("snake_case_name"), "snake-case-name");
    }

    #[test]
    fn test_parse_variants() {
        let input: DeriveInput = syn::parse_quote! {
            enum Scale {
                None,
                #[config(rename = "shrink", alias = "down", alias = "smaller")]
                Down,
            }
        };
        let args = parse_config_enum(&input).unwrap();
        let variants = match args.data {
            darling::ast::Data::Enum(variants) => variants,
            _ => panic!("expected enum"),
        };
        assert_eq!(variants[0].config_name(), "none");
        assert_eq!(variants[1].config_name(), "shrink");
        assert_eq!(variants[1].accepted_names(), vec!["shrink", "down", "smaller"]);
    }

    #[test]
    fn test_rejects_struct() {
        let input: DeriveInput = syn::parse_quote! {
            struct NotAnEnum { value: i32 }
        };
        assert!(parse_config_enum(&input).is_err());
    }
}
