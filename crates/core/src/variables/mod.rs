//! Config variables - named, typed, runtime-overridable settings
//!
//! This module provides:
//!
//! 1. **Cores** - one shared record per variable name, holding the default,
//!    the runtime override, flags, description and a modification counter
//! 2. **Typed wrappers** - `ConfigBool`, `ConfigInt`, `ConfigDouble`,
//!    `ConfigString`, `ConfigEnum<T>` and friends, each with a private cache
//!    that is only reparsed after the core changes
//!
//! # Example
//!
//! ```ignore
//! use std::sync::LazyLock;
//! use knobs_core::variables::{ConfigBool, ConfigEnum};
//! use knobs_core::ConfigEnum;
//!
//! #[derive(Clone, Copy, Default, ConfigEnum)]
//! pub enum AutoScale {
//!     #[default]
//!     None,
//!     Down,
//!     Up,
//! }
//!
//! static KEEP_RAM: LazyLock<ConfigBool> =
//!     LazyLock::new(|| ConfigBool::new("keep-texture-ram", false, "Retain images"));
//!
//! static POWER_2: LazyLock<ConfigEnum<AutoScale>> =
//!     LazyLock::new(|| ConfigEnum::new("textures-power-2", AutoScale::Down, ""));
//!
//! if KEEP_RAM.get_value() {
//!     // ...
//! }
//! ```

mod cache;
mod codec;
mod flags;
mod registry;
mod variable_core;
mod wrapper;

pub use self::cache::{PlainReloadLock, ReentrantReloadLock, ReloadLock, VariableCache};
pub use self::codec::{
    parse_bool, parse_double, parse_int, BoolCodec, DoubleCodec, EnumCodec, FilenameCodec,
    Int64Codec, IntCodec, ListCodec, StringCodec, ValueCodec,
};
pub use self::flags::VariableFlags;
pub use self::registry::{
    declare, find_variable, get_or_create, list_variables, set_strict_defaults, strict_defaults,
    variable_count, variable_names,
};
pub use self::variable_core::{DeclareOutcome, VariableCore, MAX_WORD_GROWTH};
pub use self::wrapper::{
    ConfigBool, ConfigDouble, ConfigEnum, ConfigFilename, ConfigInt, ConfigInt64, ConfigList,
    ConfigString, ConfigVariable,
};

pub(crate) use self::registry::CONFIG;

/// Member names of an enum usable with [`ConfigEnum`]
///
/// Implemented by `#[derive(ConfigEnum)]`.
pub trait ConfigEnumValues {
    /// Config spelling of every member, in declaration order
    const VARIANTS: &'static [&'static str];
}

/// Error returned by derived `FromStr` impls for unknown member names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown value '{value}' (expected one of: {})", .expected.join(", "))]
pub struct UnknownVariant {
    /// The rejected word
    pub value: String,
    /// Accepted spellings
    pub expected: &'static [&'static str],
}

impl UnknownVariant {
    pub fn new(value: &str, expected: &'static [&'static str]) -> Self {
        Self {
            value: value.to_string(),
            expected,
        }
    }
}
