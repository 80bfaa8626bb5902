//! Variable type definitions
//!
//! This module provides the `VariableType` enum recorded on each variable
//! core, and the raw flag bit constants.

use std::fmt;

/// Type a variable was declared with
///
/// A core starts out `Undefined` and takes the type of the first typed
/// wrapper that declares a default for it.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VariableType {
    #[default]
    Undefined = 0,
    List = 1,
    String = 2,
    Filename = 3,
    Bool = 4,
    Int = 5,
    Int64 = 6,
    Double = 7,
    Enum = 8,
}

impl VariableType {
    /// Lowercase name for reports
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::List => "list",
            Self::String => "string",
            Self::Filename => "filename",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int64 => "int64",
            Self::Double => "double",
            Self::Enum => "enum",
        }
    }

    /// Check if values of this type are numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Int64 | Self::Double)
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Variable flag constants
pub mod flags {
    /// No flags
    pub const NONE: u32 = 0;
    /// Low bits hold the trust level required to modify the variable
    pub const TRUST_LEVEL_MASK: u32 = 0x0000_0fff;
    /// Any source may modify the variable regardless of trust level
    pub const OPEN: u32 = 0x0000_1000;
    /// No config source may modify the variable
    pub const CLOSED: u32 = 0x0000_2000;
    /// Value is expected to change at runtime
    pub const DYNAMIC: u32 = 0x0000_4000;
    /// Declared by legacy dconfig-style code
    pub const DCONFIG: u32 = 0x0000_8000;
}
