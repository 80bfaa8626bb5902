//! Typed variable wrappers
//!
//! A `ConfigVariable<C>` binds a name to its shared core and keeps a private
//! cache of the parsed value. Any number of wrappers may name the same
//! variable; a write through one is seen by all of them.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::LazyLock;
//! use knobs_core::variables::{ConfigBool, ConfigInt};
//!
//! static RETRIES: LazyLock<ConfigInt> =
//!     LazyLock::new(|| ConfigInt::new("net-retries", 3, "Connection attempts"));
//!
//! fn connect() {
//!     for _ in 0..RETRIES.get_value() {
//!         // ...
//!     }
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

use super::cache::VariableCache;
use super::codec::{
    BoolCodec, DoubleCodec, EnumCodec, FilenameCodec, Int64Codec, IntCodec, ListCodec,
    StringCodec, ValueCodec,
};
use super::flags::VariableFlags;
use super::registry;
use super::variable_core::VariableCore;
use crate::error::ParseResult;

/// Boolean variable
pub type ConfigBool = ConfigVariable<BoolCodec>;
/// 32-bit integer variable
pub type ConfigInt = ConfigVariable<IntCodec>;
/// 64-bit integer variable
pub type ConfigInt64 = ConfigVariable<Int64Codec>;
/// Floating-point variable
pub type ConfigDouble = ConfigVariable<DoubleCodec>;
/// String variable
pub type ConfigString = ConfigVariable<StringCodec>;
/// Filename variable
pub type ConfigFilename = ConfigVariable<FilenameCodec>;
/// Multi-word list variable
pub type ConfigList = ConfigVariable<ListCodec>;
/// Enum variable over any `FromStr + Display` type
pub type ConfigEnum<T> = ConfigVariable<EnumCodec<T>>;

/// Typed handle to a named configuration variable
pub struct ConfigVariable<C: ValueCodec> {
    cache: VariableCache<C>,
}

impl<C: ValueCodec> ConfigVariable<C> {
    /// Bind to the variable `name` without declaring a default
    ///
    /// Creates the core if needed but does no parsing, so this is safe to
    /// run from any lazy initializer.
    pub fn bind(name: &str) -> Self {
        let core = registry::get_or_create(name);
        core.mark_used();
        Self {
            cache: VariableCache::new(core),
        }
    }

    /// Bind to `name` and declare its default and description
    ///
    /// Repeating the declaration elsewhere is harmless; the first default
    /// declared for a name wins.
    pub fn new(name: &str, default: impl Into<C::Value>, description: &str) -> Self {
        Self::with_flags(name, default, description, VariableFlags::empty())
    }

    /// Bind to `name` and declare its default, description and flags
    pub fn with_flags(
        name: &str,
        default: impl Into<C::Value>,
        description: &str,
        flags: VariableFlags,
    ) -> Self {
        let words = C::format_words(&default.into());
        let core = registry::declare(name, C::TYPE, words, description, flags);
        core.mark_used();
        Self {
            cache: VariableCache::new(core),
        }
    }

    /// Variable name
    pub fn name(&self) -> &str {
        self.cache.core().name()
    }

    /// The shared core
    pub fn core(&self) -> &'static VariableCore {
        self.cache.core()
    }

    /// Current value
    ///
    /// Cheap when nothing was written since the last read. Malformed words
    /// are logged and the previous value (or the zero value) is returned.
    pub fn get_value(&self) -> C::Value {
        self.cache.get()
    }

    /// Parse the current value, reporting malformed words
    pub fn try_get_value(&self) -> ParseResult<C::Value> {
        self.cache.try_get()
    }

    /// Write a new value through to the core
    pub fn set_value(&self, value: impl Into<C::Value>) {
        self.core().set_value(C::format_words(&value.into()));
    }

    /// Declared default, or the zero value if none or malformed
    pub fn get_default_value(&self) -> C::Value {
        C::parse_words(&self.core().default_words()).unwrap_or_else(|err| {
            tracing::warn!(variable = self.name(), error = %err, "Invalid default value");
            C::zero()
        })
    }

    /// Number of words in the effective value
    pub fn size(&self) -> usize {
        self.core().size()
    }

    /// Word `index` parsed as this variable's type
    ///
    /// Out-of-range and malformed words yield the zero value.
    pub fn get_word(&self, index: usize) -> C::Value {
        let Some(word) = self.core().word(index) else {
            return C::zero();
        };
        C::parse(&word).unwrap_or_else(|err| {
            tracing::warn!(variable = self.name(), index, error = %err, "Invalid word");
            C::zero()
        })
    }

    /// Replace word `index`, extending the list if needed
    ///
    /// Returns `false` if `index` is too far past the end to extend to.
    pub fn set_word(&self, index: usize, value: impl Into<C::Value>) -> bool {
        self.core().set_word(index, C::format(&value.into()))
    }

    /// Check if a runtime override is present
    pub fn has_local_value(&self) -> bool {
        self.core().has_local_value()
    }

    /// Remove the runtime override so the default applies again
    pub fn clear_local_value(&self) {
        self.core().clear_local_value();
    }

    /// Description text
    pub fn description(&self) -> String {
        self.core().description()
    }

    /// Declared flags
    pub fn flags(&self) -> VariableFlags {
        self.core().flags()
    }

    /// Number of times this wrapper has parsed its value
    pub fn reload_count(&self) -> u64 {
        self.cache.reload_count()
    }
}

impl ConfigList {
    /// All values in the list
    pub fn values(&self) -> Vec<String> {
        self.get_value()
    }

    /// Number of values in the list
    pub fn num_values(&self) -> usize {
        self.size()
    }

    /// Value `index`, empty if out of range
    pub fn value(&self, index: usize) -> String {
        self.core().word(index).unwrap_or_default()
    }

    /// Append a value to the list
    pub fn push_value(&self, value: impl Into<String>) {
        self.core().push_word(value);
    }
}

impl ConfigFilename {
    /// Current value as a path
    pub fn path(&self) -> PathBuf {
        self.get_value()
    }

    /// Check if the variable names no path
    pub fn is_empty(&self) -> bool {
        self.get_value().as_os_str().is_empty()
    }
}

impl<C: ValueCodec> fmt::Debug for ConfigVariable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigVariable")
            .field("name", &self.name())
            .field("type", &C::TYPE)
            .field("words", &self.core().words())
            .field("cache", &self.cache)
            .finish()
    }
}

impl<C: ValueCodec> fmt::Display for ConfigVariable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.core().string_value())
    }
}
