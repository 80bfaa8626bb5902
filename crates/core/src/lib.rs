//! Knobs - configuration variables and notify categories
//!
//! This crate provides two process-wide registries that are safe to use
//! from any thread and from inside other lazy initializers:
//! - [`variables`] - named, typed, runtime-overridable settings
//! - [`notify`] - hierarchical diagnostic categories with severity thresholds
//!
//! # Re-exports
//!
//! - [`types`] - `Severity`, `VariableType` and raw flag constants
//! - [`ConfigEnum`](derive@ConfigEnum) - derive for enum-valued variables

// Allow the crate to refer to itself as `knobs_core` for proc macro compatibility
extern crate self as knobs_core;

pub use knobs_types as types;

pub mod config;
pub mod error;
pub mod logging;
pub mod macros;
pub mod notify;
pub mod variables;

#[doc(hidden)]
pub use paste;

// Re-export common types
pub use knobs_types::{Severity, VariableType};

pub use error::{ParseError, ParseResult};

// Re-export variable types
pub use variables::{
    ConfigBool, ConfigDouble, ConfigEnum, ConfigEnumValues, ConfigFilename, ConfigInt,
    ConfigInt64, ConfigList, ConfigString, ConfigVariable, VariableCore, VariableFlags,
};

// Re-export notify types
pub use notify::{get_category, Category, CategoryParent, CategoryProxy, CategoryStream};

// Re-export config types
pub use config::{ConfigError, ConfigResult, Settings};

// Re-export macros
pub use knobs_macros::ConfigEnum;
