//! Variable registry - process-wide name → core map
//!
//! Cores are leaked on creation so every wrapper can hold a `&'static`
//! reference without reference counting on the read path.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;

use dashmap::DashMap;

use knobs_types::VariableType;

use super::flags::VariableFlags;
use super::variable_core::{DeclareOutcome, VariableCore};
use crate::{declare_category, knobs_debug, knobs_warning};

/// Global variable registry keyed by variable name
static REGISTRY: LazyLock<DashMap<String, &'static VariableCore>> = LazyLock::new(DashMap::new);

/// Whether mismatched repeated defaults are reported as warnings
static STRICT_DEFAULTS: AtomicBool = AtomicBool::new(false);

declare_category!(pub(crate) CONFIG, "config");

// ============================================================================
// Lookup APIs
// ============================================================================

/// Get the core for `name`, creating an empty one if absent
///
/// Safe to call from any thread, including from inside other lazy
/// initializers. Concurrent callers for the same name receive the same core.
pub fn get_or_create(name: &str) -> &'static VariableCore {
    if let Some(core) = REGISTRY.get(name) {
        return *core;
    }

    let core = *REGISTRY.entry(name.to_string()).or_insert_with(|| {
        tracing::trace!(variable = name, "Created variable core");
        let core: &'static VariableCore = Box::leak(Box::new(VariableCore::new(name)));
        core
    });
    core
}

/// Find an existing core without creating one
pub fn find_variable(name: &str) -> Option<&'static VariableCore> {
    REGISTRY.get(name).map(|core| *core)
}

/// Declare a default on the named core, logging a mismatch if one is found
///
/// Returns the core. Never fails: a mismatched default is reported on the
/// `config` category and the first default stays in effect.
pub fn declare(
    name: &str,
    var_type: VariableType,
    words: Vec<String>,
    description: &str,
    flags: VariableFlags,
) -> &'static VariableCore {
    let core = get_or_create(name);
    let requested = words.join(" ");

    if let DeclareOutcome::Mismatched { existing } =
        core.declare_default(var_type, words, description, flags)
    {
        let existing = existing.join(" ");
        if strict_defaults() {
            knobs_warning!(
                CONFIG,
                "variable {} redeclared with default '{}', keeping '{}'",
                name,
                requested,
                existing
            );
        } else {
            knobs_debug!(
                CONFIG,
                "variable {} redeclared with default '{}', keeping '{}'",
                name,
                requested,
                existing
            );
        }
    }

    core
}

// ============================================================================
// Settings
// ============================================================================

/// Report mismatched repeated defaults at warning level instead of debug
pub fn set_strict_defaults(strict: bool) {
    STRICT_DEFAULTS.store(strict, Ordering::Relaxed);
}

/// Check if strict default checking is enabled
pub fn strict_defaults() -> bool {
    STRICT_DEFAULTS.load(Ordering::Relaxed)
}

// ============================================================================
// Utility APIs
// ============================================================================

/// Number of known variables
pub fn variable_count() -> usize {
    REGISTRY.len()
}

/// All known variable names, sorted
pub fn variable_names() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY.iter().map(|entry| entry.key().clone()).collect();
    names.sort();
    names
}

/// Human-readable `name value` report of every declared variable
///
/// Cores that were only looked up and never given a default or value are
/// skipped.
pub fn list_variables() -> String {
    let mut report = String::new();
    for name in variable_names() {
        let Some(core) = find_variable(&name) else {
            continue;
        };
        if !core.has_default() && !core.has_local_value() {
            continue;
        }
        let marker = if core.has_local_value() { " (set)" } else { "" };
        let _ = writeln!(
            report,
            "{} {} [{}]{}",
            name,
            core.string_value(),
            core.var_type(),
            marker
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    // Generate unique names for each test to avoid parallel test interference
    static TEST_NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_name(prefix: &str) -> String {
        format!(
            "{}-registry-{}",
            prefix,
            TEST_NAME_COUNTER.fetch_add(1, Ordering::Relaxed)
        )
    }

    #[test]
    fn test_get_or_create_returns_same_core() {
        let name = unique_name("same");
        let a = get_or_create(&name);
        let b = get_or_create(&name);
        assert!(std::ptr::eq(a, b));
        assert!(find_variable(&name).is_some());
    }

    #[test]
    fn test_find_does_not_create() {
        let name = unique_name("missing");
        assert!(find_variable(&name).is_none());
        assert!(!variable_names().contains(&name));
    }

    #[test]
    fn test_concurrent_get_or_create() {
        let name = unique_name("race");
        let cores: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| get_or_create(&name) as *const VariableCore as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(cores.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_declare_mismatch_keeps_first() {
        let name = unique_name("mismatch");
        declare(
            &name,
            VariableType::Int,
            vec!["3".to_string()],
            "first",
            VariableFlags::empty(),
        );
        let core = declare(
            &name,
            VariableType::Int,
            vec!["4".to_string()],
            "second",
            VariableFlags::empty(),
        );
        assert_eq!(core.words(), vec!["3".to_string()]);
        assert_eq!(core.description(), "first");
    }

    #[test]
    fn test_list_variables_reports_declared() {
        let declared = unique_name("listed");
        let bare = unique_name("bare");
        declare(
            &declared,
            VariableType::Bool,
            vec!["1".to_string()],
            "",
            VariableFlags::empty(),
        );
        get_or_create(&bare);

        let report = list_variables();
        assert!(report.contains(&format!("{} 1 [bool]", declared)));
        assert!(!report.contains(&bare));
        assert!(variable_count() >= 2);
    }
}
