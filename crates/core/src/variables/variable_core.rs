//! Variable core - the shared, name-keyed backing record
//!
//! Every typed wrapper bound to the same name shares one `VariableCore`.
//! Cores are created by the registry on first lookup and are never freed.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;

use knobs_types::VariableType;

use super::flags::VariableFlags;
use super::registry::CONFIG;
use crate::knobs_warning;

/// How far past the current end `set_word` may extend a word list
pub const MAX_WORD_GROWTH: usize = 1024;

/// Outcome of a default declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclareOutcome {
    /// This call supplied the first default
    Declared,
    /// A default already existed and matches this one
    Matched,
    /// A default already existed with different words; the first one is kept
    Mismatched { existing: Vec<String> },
}

/// Mutable part of a core, guarded by one lock
#[derive(Debug, Default)]
struct CoreState {
    /// Declared default, `None` until some wrapper declares one
    default: Option<Vec<String>>,
    /// Runtime override, takes precedence over the default
    local: Option<Vec<String>>,
    description: String,
    flags: VariableFlags,
    var_type: VariableType,
}

impl CoreState {
    fn effective(&self) -> &[String] {
        self.local
            .as_deref()
            .or(self.default.as_deref())
            .unwrap_or(&[])
    }
}

/// Shared backing record for a configuration variable
///
/// The modification counter is bumped while the state lock is held, so a
/// [`snapshot`](Self::snapshot) always pairs a word list with the counter
/// value that produced it.
#[derive(Debug)]
pub struct VariableCore {
    name: String,
    state: RwLock<CoreState>,
    modified: AtomicU64,
    used: AtomicBool,
}

impl VariableCore {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: RwLock::new(CoreState::default()),
            modified: AtomicU64::new(0),
            used: AtomicBool::new(false),
        }
    }

    /// Variable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current modification counter
    pub fn modified(&self) -> u64 {
        self.modified.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.modified.fetch_add(1, Ordering::AcqRel);
    }

    /// Declare the default value, description, type and flags
    ///
    /// The first declaration wins. Later declarations never change the
    /// default; a differing one is reported as `Mismatched` for the caller
    /// to log. An empty description is filled in by a later declaration.
    pub fn declare_default(
        &self,
        var_type: VariableType,
        words: Vec<String>,
        description: &str,
        flags: VariableFlags,
    ) -> DeclareOutcome {
        let mut state = self.state.write();

        if state.description.is_empty() && !description.is_empty() {
            state.description = description.to_string();
        }
        if state.var_type == VariableType::Undefined {
            state.var_type = var_type;
        }

        if let Some(existing) = state.default.as_ref() {
            return if *existing == words {
                DeclareOutcome::Matched
            } else {
                DeclareOutcome::Mismatched {
                    existing: existing.clone(),
                }
            };
        }

        state.default = Some(words);
        state.flags = flags;
        // Caches built before the declaration read an empty list
        self.bump();
        DeclareOutcome::Declared
    }

    /// Replace the override with a new word list
    pub fn set_value(&self, words: Vec<String>) {
        let mut state = self.state.write();
        state.local = Some(words);
        self.bump();
    }

    /// Replace the override with the whitespace-separated words of `value`
    pub fn set_string_value(&self, value: &str) {
        self.set_value(value.split_whitespace().map(str::to_string).collect());
    }

    /// Replace one word of the effective list, extending it with empty words
    /// if `index` is past the end
    ///
    /// An index more than [`MAX_WORD_GROWTH`] words past the end is logged
    /// and ignored; returns whether the override was written.
    pub fn set_word(&self, index: usize, word: impl Into<String>) -> bool {
        let mut state = self.state.write();
        let mut words = state.effective().to_vec();
        let len = match index.checked_add(1) {
            Some(len) if len <= words.len().saturating_add(MAX_WORD_GROWTH) => len,
            _ => {
                drop(state);
                knobs_warning!(
                    CONFIG,
                    "{}: word index {} is out of range, ignoring",
                    self.name,
                    index
                );
                return false;
            }
        };
        if words.len() < len {
            words.resize(len, String::new());
        }
        words[index] = word.into();
        state.local = Some(words);
        self.bump();
        true
    }

    /// Append one word to the effective list
    ///
    /// The length is read and the override written under one lock, so
    /// concurrent appends are never lost.
    pub fn push_word(&self, word: impl Into<String>) {
        let mut state = self.state.write();
        let mut words = state.effective().to_vec();
        words.push(word.into());
        state.local = Some(words);
        self.bump();
    }

    /// Remove the override so the default applies again
    pub fn clear_local_value(&self) {
        let mut state = self.state.write();
        if state.local.take().is_some() {
            self.bump();
        }
    }

    /// Check if an override is present
    pub fn has_local_value(&self) -> bool {
        self.state.read().local.is_some()
    }

    /// Check if a default has been declared
    pub fn has_default(&self) -> bool {
        self.state.read().default.is_some()
    }

    /// Effective word list (override if present, else default)
    pub fn words(&self) -> Vec<String> {
        self.state.read().effective().to_vec()
    }

    /// Effective word list together with the counter that produced it
    pub fn snapshot(&self) -> (Vec<String>, u64) {
        let state = self.state.read();
        (state.effective().to_vec(), self.modified())
    }

    /// Declared default words (empty if none declared)
    pub fn default_words(&self) -> Vec<String> {
        self.state.read().default.clone().unwrap_or_default()
    }

    /// Number of effective words
    pub fn size(&self) -> usize {
        self.state.read().effective().len()
    }

    /// Effective word at `index`, `None` if out of range
    pub fn word(&self, index: usize) -> Option<String> {
        self.state.read().effective().get(index).cloned()
    }

    /// Effective words joined by single spaces
    pub fn string_value(&self) -> String {
        self.state.read().effective().join(" ")
    }

    /// Description text
    pub fn description(&self) -> String {
        self.state.read().description.clone()
    }

    /// Flags recorded by the first declaration
    pub fn flags(&self) -> VariableFlags {
        self.state.read().flags
    }

    /// Type recorded by the first typed declaration
    pub fn var_type(&self) -> VariableType {
        self.state.read().var_type
    }

    /// Check if a typed wrapper has bound to this core
    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_used(&self) {
        self.used.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_empty_core() {
        let core = VariableCore::new("empty");
        assert_eq!(core.name(), "empty");
        assert_eq!(core.size(), 0);
        assert_eq!(core.word(0), None);
        assert_eq!(core.string_value(), "");
        assert!(!core.has_default());
        assert!(!core.has_local_value());
        assert_eq!(core.var_type(), VariableType::Undefined);
    }

    #[test]
    fn test_first_default_wins() {
        let core = VariableCore::new("first");
        let outcome =
            core.declare_default(VariableType::Int, words(&["3"]), "", VariableFlags::empty());
        assert_eq!(outcome, DeclareOutcome::Declared);

        let outcome = core.declare_default(
            VariableType::Int,
            words(&["3"]),
            "retries",
            VariableFlags::DYNAMIC,
        );
        assert_eq!(outcome, DeclareOutcome::Matched);

        let outcome =
            core.declare_default(VariableType::Int, words(&["9"]), "", VariableFlags::empty());
        assert_eq!(
            outcome,
            DeclareOutcome::Mismatched {
                existing: words(&["3"])
            }
        );

        assert_eq!(core.words(), words(&["3"]));
        assert_eq!(core.description(), "retries");
        assert_eq!(core.flags(), VariableFlags::empty());
    }

    #[test]
    fn test_every_write_bumps_counter() {
        let core = VariableCore::new("bump");
        let start = core.modified();

        core.set_value(words(&["a"]));
        assert_eq!(core.modified(), start + 1);

        core.set_value(words(&["a"]));
        assert_eq!(core.modified(), start + 2);

        core.set_word(0, "b");
        assert_eq!(core.modified(), start + 3);

        core.clear_local_value();
        assert_eq!(core.modified(), start + 4);

        // Nothing to clear
        core.clear_local_value();
        assert_eq!(core.modified(), start + 4);
    }

    #[test]
    fn test_override_and_clear() {
        let core = VariableCore::new("override");
        core.declare_default(VariableType::String, words(&["x"]), "", VariableFlags::empty());

        core.set_value(words(&["y", "z"]));
        assert!(core.has_local_value());
        assert_eq!(core.words(), words(&["y", "z"]));
        assert_eq!(core.default_words(), words(&["x"]));

        core.clear_local_value();
        assert_eq!(core.words(), words(&["x"]));
    }

    #[test]
    fn test_set_word_extends_from_default() {
        let core = VariableCore::new("extend");
        core.declare_default(VariableType::Int, words(&["1"]), "", VariableFlags::empty());

        core.set_word(2, "7");
        assert_eq!(core.words(), words(&["1", "", "7"]));
        assert_eq!(core.size(), 3);
        assert_eq!(core.default_words(), words(&["1"]));
    }

    #[test]
    fn test_set_word_rejects_far_index() {
        let core = VariableCore::new("far-index");
        core.set_value(words(&["a", "b"]));
        let counter = core.modified();

        assert!(!core.set_word(usize::MAX, "x"));
        assert!(!core.set_word(1 << 40, "x"));
        assert!(!core.set_word(2 + MAX_WORD_GROWTH, "x"));
        assert_eq!(core.words(), words(&["a", "b"]));
        assert_eq!(core.modified(), counter);

        assert!(core.set_word(1 + MAX_WORD_GROWTH, "x"));
        assert_eq!(core.size(), 2 + MAX_WORD_GROWTH);
        assert_eq!(core.modified(), counter + 1);
    }

    #[test]
    fn test_push_word_appends() {
        let core = VariableCore::new("push");
        core.declare_default(VariableType::List, words(&["a"]), "", VariableFlags::empty());
        let counter = core.modified();

        core.push_word("b");
        assert_eq!(core.words(), words(&["a", "b"]));
        assert_eq!(core.default_words(), words(&["a"]));
        assert_eq!(core.modified(), counter + 1);
    }

    #[test]
    fn test_set_string_value_splits_words() {
        let core = VariableCore::new("split");
        core.set_string_value("  one two\tthree ");
        assert_eq!(core.words(), words(&["one", "two", "three"]));
        assert_eq!(core.string_value(), "one two three");
    }

    #[test]
    fn test_snapshot_pairs_words_with_counter() {
        let core = VariableCore::new("snapshot");
        core.set_value(words(&["5"]));
        let (list, counter) = core.snapshot();
        assert_eq!(list, words(&["5"]));
        assert_eq!(counter, core.modified());
    }
}
