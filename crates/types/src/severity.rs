//! Notify severity levels
//!
//! Severities are ordered from least to most important. A category with
//! threshold `Warning` reports `Warning`, `Error` and `Fatal` messages.

use std::fmt;
use std::str::FromStr;

/// Severity of a notify message, or threshold of a category
///
/// `Unspecified` is only meaningful as a threshold: it means "inherit
/// from the parent category".
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Unspecified = 0,
    Spam = 1,
    Debug = 2,
    Info = 3,
    Warning = 4,
    Error = 5,
    Fatal = 6,
}

impl Severity {
    /// All concrete severities, least important first
    pub const ALL: [Severity; 6] = [
        Severity::Spam,
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
    ];

    /// Lowercase name used in config words and log output
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Spam => "spam",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }

    /// Recover a severity from its `repr(u8)` discriminant
    ///
    /// Out-of-range values map to `Unspecified`.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Spam,
            2 => Self::Debug,
            3 => Self::Info,
            4 => Self::Warning,
            5 => Self::Error,
            6 => Self::Fatal,
            _ => Self::Unspecified,
        }
    }

    /// Check if this is `Unspecified`
    pub const fn is_unspecified(&self) -> bool {
        matches!(self, Self::Unspecified)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity name is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSeverity(pub String);

impl fmt::Display for UnknownSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown severity '{}'", self.0)
    }
}

impl std::error::Error for UnknownSeverity {}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spam" => Ok(Self::Spam),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "" | "unspecified" => Ok(Self::Unspecified),
            other => Err(UnknownSeverity(other.to_string())),
        }
    }
}
