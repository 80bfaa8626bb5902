//! Variable flags

use bitflags::bitflags;
use knobs_types::flags;

bitflags! {
    /// Flags recorded on a variable core at declaration time
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VariableFlags: u32 {
        /// Trust level required to modify the variable from a config source
        const TRUST_LEVEL_MASK = flags::TRUST_LEVEL_MASK;
        /// Any config source may modify the variable
        const OPEN = flags::OPEN;
        /// No config source may modify the variable
        const CLOSED = flags::CLOSED;
        /// Value is expected to change while the process runs
        const DYNAMIC = flags::DYNAMIC;
        /// Declared through legacy dconfig-style code
        const DCONFIG = flags::DCONFIG;
    }
}

impl VariableFlags {
    /// Build flags carrying the given trust level
    ///
    /// Levels above the mask are truncated.
    pub fn with_trust_level(level: u32) -> Self {
        Self::from_bits_retain(level & flags::TRUST_LEVEL_MASK)
    }

    /// Trust level stored in the low bits
    pub fn trust_level(&self) -> u32 {
        self.bits() & flags::TRUST_LEVEL_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_level() {
        let flags = VariableFlags::with_trust_level(42) | VariableFlags::DYNAMIC;
        assert_eq!(flags.trust_level(), 42);
        assert!(flags.contains(VariableFlags::DYNAMIC));
        assert!(!flags.contains(VariableFlags::CLOSED));
    }

    #[test]
    fn test_trust_level_truncated() {
        let flags = VariableFlags::with_trust_level(0x1_0005);
        assert_eq!(flags.trust_level(), 5);
    }
}
