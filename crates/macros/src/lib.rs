//! Knobs Proc Macros
//!
//! This crate provides `#[derive(ConfigEnum)]`, which makes a fieldless
//! enum usable as the value type of a `ConfigEnum<T>` variable.
//!
//! # Example
//!
//! ```ignore
//! use knobs_core::ConfigEnum;
//!
//! #[derive(Clone, Copy, Default, ConfigEnum)]
//! pub enum AutoTextureScale {
//!     #[default]
//!     None,
//!     Down,
//!     Up,
//!     #[config(rename = "pad", alias = "padded")]
//!     PadToPower2,
//! }
//!
//! // Generated:
//! // - Display writing "none", "down", "up", "pad"
//! // - FromStr accepting any case of those names plus "padded"
//! // - ConfigEnumValues::VARIANTS == ["none", "down", "up", "pad"]
//! ```
//!
//! # Attributes
//!
//! ## Variant Attributes
//!
//! - `#[config(rename = "name")]` - Spelling used in config words. Defaults to
//!   the kebab-case variant name (`PadToPower2` becomes `pad-to-power2`).
//! - `#[config(alias = "name")]` - Extra spelling accepted when parsing. May
//!   be repeated.

mod config_enum;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for enum-valued config variables
///
/// Generates `Display`, a case-insensitive `FromStr` whose error lists the
/// accepted names, and `ConfigEnumValues`. Only fieldless enums are
/// supported.
#[proc_macro_derive(ConfigEnum, attributes(config))]
pub fn derive_config_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    config_enum::derive_config_enum(input).into()
}
